//! # Coupons
//!
//! Coupon wire shape, promo-code gating, and the deterministic coupon order.
//!
//! ## Selection Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. cashback category   before  discount category                       │
//! │  2. percentage type     before  fixed type                              │
//! │  3. higher value        before  lower value                             │
//! │  4. earlier _created_at before  later (unparseable = epoch 0)           │
//! │                                                                         │
//! │  Line item: first discount in this order wins, every cashback applies.  │
//! │  Composite level: discounts are disregarded, cashbacks apply.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::amounts::catalog_amount;
use crate::error::PricingResult;
use crate::money::{parse_decimal, Money};
use crate::types::lenient;
use crate::DISPLAY_PRECISION;

/// Cashback period of an immediate payout.
pub const IMMEDIATE_CASHBACK_PERIOD: &str = "0";

// =============================================================================
// Coupon Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponType {
    Fixed,
    Percentage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponCategory {
    #[default]
    Discount,
    Cashback,
}

/// A discount or cashback coupon attached to a line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub coupon_type: CouponType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CouponCategory>,

    /// Legacy integer amount in cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_value: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_value_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_value_currency: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::decimal_string_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub percentage_value: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::decimal_string_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub cashback_period: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_promo_code: Option<bool>,

    #[serde(rename = "_created_at", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Coupon {
    pub fn category(&self) -> CouponCategory {
        self.category.unwrap_or_default()
    }

    pub fn is_cashback(&self) -> bool {
        self.category() == CouponCategory::Cashback
    }

    pub fn is_discount(&self) -> bool {
        self.category() == CouponCategory::Discount
    }

    pub fn is_percentage(&self) -> bool {
        self.coupon_type == CouponType::Percentage
    }

    /// Percentage value clamped to `[0, 100]`; unparseable values count as 0.
    ///
    /// ## Example
    /// ```rust
    /// use pricing_core::coupon::Coupon;
    /// use rust_decimal::Decimal;
    ///
    /// let coupon: Coupon = serde_json::from_value(serde_json::json!({
    ///     "type": "percentage", "percentage_value": "150"
    /// })).unwrap();
    /// assert_eq!(coupon.percentage(), Decimal::ONE_HUNDRED);
    /// ```
    pub fn percentage(&self) -> Decimal {
        self.percentage_value
            .as_deref()
            .and_then(|v| parse_decimal(v).ok())
            .unwrap_or_default()
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
    }

    /// The fixed amount at internal precision.
    ///
    /// Prefers `fixed_value_decimal`; falls back to the legacy cents value.
    pub fn fixed_amount(&self, currency: &str) -> PricingResult<Money> {
        let currency = self.fixed_value_currency.as_deref().unwrap_or(currency);
        let amount = catalog_amount(self.fixed_value_decimal.as_deref(), self.fixed_value, currency)?;
        Ok(amount.unwrap_or_else(|| Money::zero(currency)))
    }

    /// Cashback period, `"0"` (immediate) when absent.
    pub fn cashback_period(&self) -> &str {
        self.cashback_period
            .as_deref()
            .unwrap_or(IMMEDIATE_CASHBACK_PERIOD)
    }

    /// Creation time in epoch millis; missing or unparseable = 0.
    pub fn created_at_millis(&self) -> i64 {
        self.created_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.timestamp_millis())
            .unwrap_or(0)
    }

    /// The value compared within a coupon type (percentage or fixed decimal).
    fn sort_value(&self) -> Decimal {
        match self.coupon_type {
            CouponType::Percentage => self.percentage(),
            CouponType::Fixed => match (&self.fixed_value_decimal, self.fixed_value) {
                (Some(decimal), _) => parse_decimal(decimal).unwrap_or_default(),
                (None, Some(cents)) => Decimal::new(cents, DISPLAY_PRECISION),
                (None, None) => Decimal::ZERO,
            },
        }
    }
}

/// A promo code the customer redeemed, with the coupons it unlocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedeemedPromo {
    pub code: String,

    #[serde(default)]
    pub coupons: Vec<Coupon>,
}

// =============================================================================
// Ordering & Selection
// =============================================================================

/// Total order over coupons; `Less` means higher priority.
pub fn compare_coupons(a: &Coupon, b: &Coupon) -> Ordering {
    let by_category = match (a.is_cashback(), b.is_cashback()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    };

    let by_type = match (a.is_percentage(), b.is_percentage()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    };

    by_category
        .then(by_type)
        .then_with(|| b.sort_value().cmp(&a.sort_value()))
        .then_with(|| a.created_at_millis().cmp(&b.created_at_millis()))
}

/// Drops promo-gated coupons whose promo was not redeemed, then sorts.
pub fn applicable_coupons(coupons: &[Coupon], redeemed_promos: &[RedeemedPromo]) -> Vec<Coupon> {
    let mut applicable: Vec<Coupon> = coupons
        .iter()
        .filter(|coupon| {
            if coupon.requires_promo_code != Some(true) {
                return true;
            }
            let redeemed = redeemed_promos.iter().any(|promo| {
                promo
                    .coupons
                    .iter()
                    .any(|c| c.id.is_some() && c.id == coupon.id)
            });
            if !redeemed {
                debug!(coupon_id = ?coupon.id, "Skipping coupon without redeemed promo code");
            }
            redeemed
        })
        .cloned()
        .collect();

    applicable.sort_by(compare_coupons);
    applicable
}

/// The coupons that take effect on one line item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedCoupons {
    /// The winning discount coupon, if any.
    pub discount: Option<Coupon>,
    /// Every applicable cashback coupon, highest priority first.
    pub cashbacks: Vec<Coupon>,
}

/// Splits the applicable coupons of an item into its discount and cashbacks.
pub fn select_coupons(
    coupons: Option<&[Coupon]>,
    redeemed_promos: &[RedeemedPromo],
) -> SelectedCoupons {
    let applicable = applicable_coupons(coupons.unwrap_or_default(), redeemed_promos);
    let discount = applicable.iter().find(|c| c.is_discount()).cloned();
    let cashbacks = applicable.into_iter().filter(|c| c.is_cashback()).collect();

    SelectedCoupons {
        discount,
        cashbacks,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coupon(value: serde_json::Value) -> Coupon {
        serde_json::from_value(value).unwrap()
    }

    fn fixture() -> Vec<Coupon> {
        vec![
            coupon(json!({ "_id": "fixed-500", "type": "fixed", "category": "discount", "fixed_value": 500 })),
            coupon(json!({ "_id": "pct-10", "type": "percentage", "category": "discount", "percentage_value": "10" })),
            coupon(json!({ "_id": "cashback", "type": "fixed", "category": "cashback", "fixed_value": 1000, "cashback_period": "12" })),
            coupon(json!({ "_id": "fixed-1000", "type": "fixed", "category": "discount", "fixed_value": 1000 })),
            coupon(json!({ "_id": "pct-25", "type": "percentage", "category": "discount", "percentage_value": "25" })),
        ]
    }

    fn ids(coupons: &[Coupon]) -> Vec<&str> {
        coupons.iter().filter_map(|c| c.id.as_deref()).collect()
    }

    #[test]
    fn test_coupon_ordering() {
        let mut coupons = fixture();
        coupons.sort_by(compare_coupons);
        assert_eq!(
            ids(&coupons),
            vec!["cashback", "pct-25", "pct-10", "fixed-1000", "fixed-500"]
        );
    }

    #[test]
    fn test_ordering_tie_breaks_on_creation_time() {
        let older = coupon(json!({ "_id": "older", "type": "percentage", "percentage_value": 10, "_created_at": "2024-01-01T00:00:00Z" }));
        let newer = coupon(json!({ "_id": "newer", "type": "percentage", "percentage_value": 10, "_created_at": "2024-06-01T00:00:00Z" }));
        let undated = coupon(json!({ "_id": "undated", "type": "percentage", "percentage_value": 10, "_created_at": "not a date" }));

        let mut coupons = vec![newer, older, undated];
        coupons.sort_by(compare_coupons);
        assert_eq!(ids(&coupons), vec!["undated", "older", "newer"]);
    }

    #[test]
    fn test_percentage_clamp() {
        let over = coupon(json!({ "type": "percentage", "percentage_value": "150" }));
        let under = coupon(json!({ "type": "percentage", "percentage_value": "-35" }));
        let garbage = coupon(json!({ "type": "percentage", "percentage_value": "ten" }));
        assert_eq!(over.percentage(), Decimal::ONE_HUNDRED);
        assert_eq!(under.percentage(), Decimal::ZERO);
        assert_eq!(garbage.percentage(), Decimal::ZERO);
    }

    #[test]
    fn test_fixed_amount_sources() {
        let decimal = coupon(json!({ "type": "fixed", "fixed_value": 999, "fixed_value_decimal": "5.50" }));
        let cents = coupon(json!({ "type": "fixed", "fixed_value": 550 }));
        assert_eq!(decimal.fixed_amount("EUR").unwrap().to_decimal_string(), "5.500000000000");
        assert_eq!(cents.fixed_amount("EUR").unwrap().to_decimal_string(), "5.500000000000");
    }

    #[test]
    fn test_promo_code_gating() {
        let gated = coupon(json!({ "_id": "promo", "type": "percentage", "percentage_value": 50, "requires_promo_code": true }));
        let open = coupon(json!({ "_id": "open", "type": "percentage", "percentage_value": 5 }));
        let coupons = vec![gated.clone(), open];

        let without = select_coupons(Some(&coupons), &[]);
        assert_eq!(without.discount.unwrap().id.as_deref(), Some("open"));

        let promos = vec![RedeemedPromo {
            code: "SUMMER".to_string(),
            coupons: vec![gated],
        }];
        let with = select_coupons(Some(&coupons), &promos);
        assert_eq!(with.discount.unwrap().id.as_deref(), Some("promo"));
    }

    #[test]
    fn test_select_coupons_splits_categories() {
        let coupons = fixture();
        let selected = select_coupons(Some(&coupons), &[]);
        assert_eq!(selected.discount.unwrap().id.as_deref(), Some("pct-25"));
        assert_eq!(ids(&selected.cashbacks), vec!["cashback"]);
        assert_eq!(selected.cashbacks[0].cashback_period(), "12");
    }

    #[test]
    fn test_numeric_cashback_period_is_accepted() {
        let c = coupon(json!({ "type": "fixed", "category": "cashback", "cashback_period": 12 }));
        assert_eq!(c.cashback_period(), "12");
        assert_eq!(coupon(json!({ "type": "fixed" })).cashback_period(), "0");
    }
}
