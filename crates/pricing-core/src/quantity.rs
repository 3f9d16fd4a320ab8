//! # Quantities
//!
//! Resolves the quantities a pricing model needs from the raw line item.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  item.quantity ──► safe_quantity (NaN / missing → 1)                    │
//! │                                                                         │
//! │  price_mappings[price_id].value                                         │
//! │        │ normalize frequency_unit → price.billing_period                │
//! │        ▼                                                                │
//! │  normalized value ──┬─► quantity_to_select_tier                         │
//! │                     └─► unit_amount_multiplier = qty × value            │
//! │                                                                         │
//! │  no mapping: tier selection and multiplier both use safe_quantity       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{PricingError, PricingResult};
use crate::types::{BillingPeriod, Price, PriceMapping};

/// Converts a JSON number to an exact decimal of its shortest textual form.
///
/// `10.999_f64` becomes exactly `10.999`, not the nearest binary fraction.
///
/// ## Errors
/// `InvalidAmount` for NaN, infinities and magnitudes beyond the decimal
/// range (about 7.9e28).
pub fn decimal_from_f64(value: f64) -> PricingResult<Decimal> {
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64_retain(value))
        .ok_or_else(|| PricingError::InvalidAmount {
            value: value.to_string(),
            reason: "not representable as a decimal".to_string(),
        })
}

/// Quantity used for pricing: missing or non-finite quantities count as 1.
///
/// A finite quantity outside the decimal range is an error, never zero.
pub fn safe_quantity(quantity: Option<f64>) -> PricingResult<Decimal> {
    match quantity {
        Some(q) if q.is_finite() => decimal_from_f64(q),
        _ => Ok(Decimal::ONE),
    }
}

/// Multiplies two quantities, failing instead of overflowing.
pub fn checked_product(lhs: Decimal, rhs: Decimal) -> PricingResult<Decimal> {
    lhs.checked_mul(rhs).ok_or(PricingError::Overflow {
        operation: "quantity multiply",
    })
}

/// Converts a value expressed per `from` period into the `to` period.
///
/// ## Example
/// ```rust
/// use pricing_core::quantity::normalize_value_to_frequency_unit;
/// use pricing_core::types::BillingPeriod;
/// use rust_decimal::Decimal;
///
/// let yearly = Decimal::from(1200);
/// let monthly = normalize_value_to_frequency_unit(
///     yearly,
///     Some(BillingPeriod::Yearly),
///     Some(BillingPeriod::Monthly),
/// )
/// .unwrap();
/// assert_eq!(monthly, Decimal::from(100));
/// ```
pub fn normalize_value_to_frequency_unit(
    value: Decimal,
    from: Option<BillingPeriod>,
    to: Option<BillingPeriod>,
) -> PricingResult<Decimal> {
    match (from, to) {
        (Some(from), Some(to)) if from != to => {
            let yearly = checked_product(value, Decimal::from(from.yearly_factor()))?;
            yearly
                .checked_div(Decimal::from(to.yearly_factor()))
                .ok_or(PricingError::Overflow {
                    operation: "frequency normalization",
                })
        }
        _ => Ok(value),
    }
}

/// Finds the entry of a per-call mapping list that targets `price`.
///
/// Mappings without a `price_id` apply to any price.
pub fn find_for_price<'a, T>(
    entries: Option<&'a [T]>,
    price: &Price,
    price_id_of: impl Fn(&T) -> Option<&str>,
) -> Option<&'a T> {
    let entries = entries?;
    entries.iter().find(|entry| match price_id_of(entry) {
        Some(id) => price.id.as_deref() == Some(id),
        None => true,
    })
}

// =============================================================================
// Quantities
// =============================================================================

/// All quantities derived from one line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantities {
    /// The item quantity (defaulted to 1 when invalid).
    pub safe_quantity: Decimal,
    /// Quantity used to pick tiers.
    pub quantity_to_select_tier: Decimal,
    /// Multiplier applied to per-unit amounts.
    pub unit_amount_multiplier: Decimal,
    /// True when a price mapping, not the quantity, selects the tier.
    pub is_using_price_mapping_to_select_tier: bool,
    /// The normalized price mapping value, if any.
    pub normalized_mapping_value: Option<Decimal>,
}

impl Quantities {
    /// Extra factor applied on top of a graduated aggregate or a flat fee.
    pub fn quantity_to_multiply(&self) -> Decimal {
        if self.is_using_price_mapping_to_select_tier {
            self.safe_quantity
        } else {
            Decimal::ONE
        }
    }
}

/// Resolves the quantities for `price` from an already-safe item quantity.
///
/// Composite components pass their own quantity times the parent's.
pub fn compute_quantities(
    price: &Price,
    safe_quantity: Decimal,
    price_mappings: Option<&[PriceMapping]>,
) -> PricingResult<Quantities> {
    let mapping_value = find_for_price(price_mappings, price, |m| m.price_id.as_deref())
        .and_then(|mapping| Some((mapping.value.filter(|v| *v >= 0.0)?, mapping.frequency_unit)));

    let normalized_mapping_value = match mapping_value {
        Some((value, frequency_unit)) => Some(normalize_value_to_frequency_unit(
            decimal_from_f64(value)?,
            frequency_unit,
            price.billing_period,
        )?),
        None => None,
    };

    Ok(match normalized_mapping_value {
        Some(normalized) => Quantities {
            safe_quantity,
            quantity_to_select_tier: normalized,
            unit_amount_multiplier: checked_product(safe_quantity, normalized)?,
            is_using_price_mapping_to_select_tier: true,
            normalized_mapping_value,
        },
        None => Quantities {
            safe_quantity,
            quantity_to_select_tier: safe_quantity,
            unit_amount_multiplier: safe_quantity,
            is_using_price_mapping_to_select_tier: false,
            normalized_mapping_value: None,
        },
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
