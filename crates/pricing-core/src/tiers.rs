//! # Tier Selection & Aggregation
//!
//! ```text
//! tiers: up_to = [10, 20, ∞]   unit = [10.00, 9.00, 8.00]
//!
//!   quantity 10      volume: tier 0        graduated: 10 × 10.00
//!   quantity 10.999  volume: tier 1        graduated: 10 × 10.00 + 0.999 × 9.00
//!   quantity 21      volume: tier 2        graduated: 10 × 10.00 + 10 × 9.00 + 1 × 8.00
//! ```
//!
//! Graduated slices cover `[previous up_to, up_to)` of the quantity. The unit
//! amount reported for each slice is the tier's own amount.

use rust_decimal::Decimal;

use crate::amounts::{catalog_amount, Slice};
use crate::error::PricingResult;
use crate::money::Money;
use crate::quantity::{checked_product, decimal_from_f64};
use crate::types::Tier;

/// A bound beyond the decimal range caps nothing, like a missing one.
fn upper_bound(tier: &Tier) -> Option<Decimal> {
    tier.up_to.map(|up_to| decimal_from_f64(up_to).unwrap_or(Decimal::MAX))
}

/// Index of the tier a quantity falls into.
///
/// First tier whose `up_to` is at least `quantity`; the last tier when the
/// quantity exceeds every bound; the first tier for non-positive quantities.
pub fn select_tier_index(tiers: &[Tier], quantity: Decimal) -> Option<usize> {
    if tiers.is_empty() {
        return None;
    }
    if quantity <= Decimal::ZERO {
        return Some(0);
    }

    let index = tiers
        .iter()
        .position(|tier| upper_bound(tier).map_or(true, |up_to| up_to >= quantity))
        .unwrap_or(tiers.len() - 1);
    Some(index)
}

/// The single tier that prices the whole quantity (volume and flat-fee models).
pub fn select_tier_for_quantity(tiers: &[Tier], quantity: Decimal) -> Option<&Tier> {
    select_tier_index(tiers, quantity).map(|index| &tiers[index])
}

/// The ordered prefix of tiers a graduated quantity spans.
pub fn select_tiers_for_quantity(tiers: &[Tier], quantity: Decimal) -> &[Tier] {
    match select_tier_index(tiers, quantity) {
        Some(index) => &tiers[..=index],
        None => &[],
    }
}

/// Configured per-unit amount of a tier; zero when the tier has none.
pub fn tier_unit_amount(tier: &Tier, currency: &str) -> PricingResult<Money> {
    let amount = catalog_amount(tier.unit_amount_decimal.as_deref(), tier.unit_amount, currency)?;
    Ok(amount.unwrap_or_else(|| Money::zero(currency)))
}

/// Configured flat fee of a tier; zero when the tier has none.
pub fn tier_flat_fee_amount(tier: &Tier, currency: &str) -> PricingResult<Money> {
    let amount = catalog_amount(
        tier.flat_fee_amount_decimal.as_deref(),
        tier.flat_fee_amount,
        currency,
    )?;
    Ok(amount.unwrap_or_else(|| Money::zero(currency)))
}

/// Splits `quantity` across the tiers it spans.
///
/// Each slice is multiplied by `quantity_to_multiply` on top of its own
/// quantity (1 unless a price mapping selects the tiers).
pub fn graduated_slices(
    tiers: &[Tier],
    quantity: Decimal,
    quantity_to_multiply: Decimal,
    currency: &str,
) -> PricingResult<Vec<Slice>> {
    let mut lower = Decimal::ZERO;
    let mut slices = Vec::new();

    for tier in select_tiers_for_quantity(tiers, quantity) {
        let slice_quantity = match upper_bound(tier) {
            Some(upper) => quantity.min(upper) - lower,
            None => quantity - lower,
        }
        .max(Decimal::ZERO);

        slices.push(Slice {
            unit_amount: tier_unit_amount(tier, currency)?,
            quantity: slice_quantity,
            multiplier: checked_product(slice_quantity, quantity_to_multiply)?,
        });

        if let Some(upper) = upper_bound(tier) {
            lower = upper;
        }
    }

    Ok(slices)
}

/// Returns true when any of `tiers` hides its price pending a request.
pub fn any_on_request(tiers: &[Tier]) -> bool {
    tiers.iter().any(Tier::is_on_request)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn fixture() -> Vec<Tier> {
        serde_json::from_value(json!([
            { "up_to": 10, "unit_amount_decimal": "10.00" },
            { "up_to": 20, "unit_amount_decimal": "9.00" },
            { "up_to": null, "unit_amount_decimal": "8.00" }
        ]))
        .unwrap()
    }

    #[test]
    fn test_select_tier_boundaries() {
        let tiers = fixture();
        assert_eq!(select_tier_index(&tiers, dec("10")), Some(0));
        assert_eq!(select_tier_index(&tiers, dec("10.999")), Some(1));
        assert_eq!(select_tier_index(&tiers, dec("21")), Some(2));
        assert_eq!(select_tier_index(&tiers, dec("0")), Some(0));
        assert_eq!(select_tier_index(&tiers, dec("-3")), Some(0));
        assert_eq!(select_tier_index(&[], dec("5")), None);
    }

    #[test]
    fn test_select_tier_past_last_bound() {
        let tiers: Vec<Tier> =
            serde_json::from_value(json!([{ "up_to": 5 }, { "up_to": 10 }])).unwrap();
        assert_eq!(select_tier_index(&tiers, dec("50")), Some(1));
    }

    #[test]
    fn test_select_tiers_prefix() {
        let tiers = fixture();
        assert_eq!(select_tiers_for_quantity(&tiers, dec("10")).len(), 1);
        assert_eq!(select_tiers_for_quantity(&tiers, dec("10.999")).len(), 2);
        assert_eq!(select_tiers_for_quantity(&tiers, dec("21")).len(), 3);
    }

    #[test]
    fn test_graduated_slices() {
        let tiers = fixture();

        let slices = graduated_slices(&tiers, dec("10.999"), Decimal::ONE, "EUR").unwrap();
        let quantities: Vec<Decimal> = slices.iter().map(|s| s.quantity).collect();
        assert_eq!(quantities, vec![dec("10"), dec("0.999")]);
        assert_eq!(slices[1].unit_amount.to_decimal_string(), "9.000000000000");

        let slices = graduated_slices(&tiers, dec("21"), Decimal::ONE, "EUR").unwrap();
        let quantities: Vec<Decimal> = slices.iter().map(|s| s.quantity).collect();
        assert_eq!(quantities, vec![dec("10"), dec("10"), dec("1")]);
    }

    #[test]
    fn test_graduated_slices_overflow_is_an_error() {
        let result = graduated_slices(&fixture(), dec("21"), Decimal::MAX, "EUR");
        assert!(matches!(result, Err(PricingError::Overflow { .. })));
    }

    #[test]
    fn test_graduated_slices_apply_quantity_to_multiply() {
        let slices = graduated_slices(&fixture(), dec("15"), dec("2"), "EUR").unwrap();
        assert_eq!(slices[1].quantity, dec("5"));
        assert_eq!(slices[1].multiplier, dec("10"));
    }

    #[test]
    fn test_tier_amounts_fall_back_to_zero() {
        let tier = Tier::default();
        assert!(tier_unit_amount(&tier, "EUR").unwrap().is_zero());
        assert!(tier_flat_fee_amount(&tier, "EUR").unwrap().is_zero());

        let tier = Tier {
            flat_fee_amount: Some(500),
            ..Default::default()
        };
        assert_eq!(
            tier_flat_fee_amount(&tier, "EUR").unwrap().to_decimal_string(),
            "5.000000000000"
        );
    }
}
