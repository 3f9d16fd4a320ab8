//! # Tax
//!
//! Tax identities, rate extraction, and tax resolution for a line item.
//!
//! ## Tax Classes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rate: 19 / "19"        → Taxed(19)    factor 1.19                      │
//! │  rate: "nontaxable"     → Nontaxable   factor 1, label "nontaxable"     │
//! │  no tax at all          → Nontaxable   factor 1, label "nontaxable"     │
//! │  rate: null / missing   → Rateless     factor 1, label "rateless"       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! None of these ever fail: a tax the engine cannot read contributes zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::PricingResult;
use crate::precision::{visit_optional, AmountVisitor, MoneyFields};
use crate::types::Price;

/// Label of the zero-tax state for items without a taxable rate.
pub const NONTAXABLE: &str = "nontaxable";

/// Label of a tax entity that carries no rate.
pub const RATELESS: &str = "rateless";

// =============================================================================
// Tax
// =============================================================================

/// A tax entity as embedded in prices and line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Tax {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tax_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Percentage as a number or string, or `"nontaxable"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | string | null")]
    pub rate: Option<Value>,
}

/// An entry of a line item's `taxes` list.
///
/// On input only `tax` is set; computed items also carry the tax amount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Tax>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i128>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_decimal: Option<String>,
}

impl MoneyFields for TaxEntry {
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()> {
        visit_optional(&mut self.amount, &mut self.amount_decimal, visit)
    }
}

// =============================================================================
// Classification
// =============================================================================

/// The zero/non-zero tax state of a resolved tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxClass {
    Taxed(Decimal),
    Nontaxable,
    Rateless,
}

impl TaxClass {
    /// Classifies an optional tax.
    pub fn of(tax: Option<&Tax>) -> TaxClass {
        let Some(tax) = tax else {
            return TaxClass::Nontaxable;
        };

        match &tax.rate {
            None | Some(Value::Null) => TaxClass::Rateless,
            Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
                .map(TaxClass::Taxed)
                .unwrap_or(TaxClass::Rateless),
            Some(Value::String(s)) if s.eq_ignore_ascii_case(NONTAXABLE) => TaxClass::Nontaxable,
            Some(Value::String(s)) => Decimal::from_str(s.trim())
                .map(TaxClass::Taxed)
                .unwrap_or(TaxClass::Rateless),
            Some(_) => TaxClass::Rateless,
        }
    }

    /// The numeric percentage, zero for the untaxed states.
    pub fn rate(&self) -> Decimal {
        match self {
            TaxClass::Taxed(rate) => *rate,
            TaxClass::Nontaxable | TaxClass::Rateless => Decimal::ZERO,
        }
    }

    /// Text label used in tax breakdown metadata.
    pub fn label(&self) -> String {
        match self {
            TaxClass::Taxed(rate) => rate.normalize().to_string(),
            TaxClass::Nontaxable => NONTAXABLE.to_string(),
            TaxClass::Rateless => RATELESS.to_string(),
        }
    }
}

/// Extracts the numeric rate of a tax; `0` for null, nontaxable or rateless.
///
/// ## Example
/// ```rust
/// use pricing_core::tax::{get_tax_value, Tax};
/// use rust_decimal::Decimal;
///
/// let tax: Tax = serde_json::from_value(serde_json::json!({ "rate": "19" })).unwrap();
/// assert_eq!(get_tax_value(Some(&tax)), Decimal::from(19));
/// assert_eq!(get_tax_value(None), Decimal::ZERO);
/// ```
pub fn get_tax_value(tax: Option<&Tax>) -> Decimal {
    TaxClass::of(tax).rate()
}

/// `1 + rate / 100`.
pub fn tax_factor(rate: Decimal) -> Decimal {
    Decimal::ONE + rate / Decimal::ONE_HUNDRED
}

/// Resolves the tax that applies to a line item.
///
/// First entry of the item's `taxes`, otherwise the price's legacy `tax`.
pub fn resolve_tax(taxes: Option<&[TaxEntry]>, price: &Price) -> Option<Tax> {
    taxes
        .and_then(|entries| entries.first())
        .and_then(|entry| entry.tax.clone())
        .or_else(|| price.tax.clone())
}

/// Key that identifies a tax bucket: the tax id, or its class label.
pub fn tax_key(tax: Option<&Tax>) -> String {
    tax.and_then(|t| t.id.clone())
        .unwrap_or_else(|| TaxClass::of(tax).label())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tax(value: Value) -> Tax {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_classify_rates() {
        assert_eq!(
            TaxClass::of(Some(&tax(json!({ "rate": 19 })))),
            TaxClass::Taxed(Decimal::from(19))
        );
        assert_eq!(
            TaxClass::of(Some(&tax(json!({ "rate": "7" })))),
            TaxClass::Taxed(Decimal::from(7))
        );
        assert_eq!(
            TaxClass::of(Some(&tax(json!({ "rate": "nontaxable" })))),
            TaxClass::Nontaxable
        );
        assert_eq!(TaxClass::of(Some(&tax(json!({ "rate": null })))), TaxClass::Rateless);
        assert_eq!(TaxClass::of(Some(&tax(json!({})))), TaxClass::Rateless);
        assert_eq!(TaxClass::of(None), TaxClass::Nontaxable);
    }

    #[test]
    fn test_untaxed_states_have_zero_rate_but_distinct_labels() {
        assert_eq!(TaxClass::Nontaxable.rate(), Decimal::ZERO);
        assert_eq!(TaxClass::Rateless.rate(), Decimal::ZERO);
        assert_ne!(TaxClass::Nontaxable.label(), TaxClass::Rateless.label());
    }

    #[test]
    fn test_tax_factor() {
        assert_eq!(tax_factor(Decimal::from(19)), Decimal::new(119, 2));
        assert_eq!(tax_factor(Decimal::ZERO), Decimal::ONE);
    }

    #[test]
    fn test_resolve_tax_prefers_item_taxes() {
        let price: Price =
            serde_json::from_value(json!({ "tax": { "_id": "legacy", "rate": 7 } })).unwrap();
        let entries = vec![TaxEntry {
            tax: Some(tax(json!({ "_id": "vat", "rate": 19 }))),
            ..Default::default()
        }];

        let resolved = resolve_tax(Some(&entries), &price).unwrap();
        assert_eq!(resolved.id.as_deref(), Some("vat"));

        let fallback = resolve_tax(None, &price).unwrap();
        assert_eq!(fallback.id.as_deref(), Some("legacy"));
        assert!(resolve_tax(Some(&[]), &Price::default()).is_none());
    }

    #[test]
    fn test_tax_key() {
        assert_eq!(tax_key(Some(&tax(json!({ "_id": "vat", "rate": 19 })))), "vat");
        assert_eq!(tax_key(Some(&tax(json!({ "rate": "19.0" })))), "19");
        assert_eq!(tax_key(None), "nontaxable");
    }
}
