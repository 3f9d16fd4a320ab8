//! # Tiered Models
//!
//! Volume, graduated and flat-fee pricing over a price's tiers. A price
//! without tiers prices as zero.

use crate::amounts::{PricingContext, Slice};
use crate::calculators::ModelOutput;
use crate::error::PricingResult;
use crate::quantity::Quantities;
use crate::tiers::{
    any_on_request, graduated_slices, select_tier_for_quantity, select_tiers_for_quantity,
    tier_flat_fee_amount, tier_unit_amount,
};
use crate::types::Price;

/// The whole multiplier priced at the selected tier's unit amount.
pub fn compute_volume(
    price: &Price,
    quantities: &Quantities,
    ctx: &PricingContext<'_>,
) -> PricingResult<ModelOutput> {
    let Some(tier) = select_tier_for_quantity(price.tiers(), quantities.quantity_to_select_tier)
    else {
        return Ok(ModelOutput::zero(ctx));
    };

    let slice = Slice {
        unit_amount: tier_unit_amount(tier, ctx.currency)?,
        quantity: quantities.unit_amount_multiplier,
        multiplier: quantities.unit_amount_multiplier,
    };
    Ok(ModelOutput::from_slices(vec![slice], ctx, true)?.on_request_if(tier.is_on_request()))
}

/// Each spanned tier prices its own slice of the quantity.
pub fn compute_graduated(
    price: &Price,
    quantities: &Quantities,
    ctx: &PricingContext<'_>,
) -> PricingResult<ModelOutput> {
    let tiers = price.tiers();
    if tiers.is_empty() {
        return Ok(ModelOutput::zero(ctx));
    }

    let slices = graduated_slices(
        tiers,
        quantities.quantity_to_select_tier,
        quantities.quantity_to_multiply(),
        ctx.currency,
    )?;
    let spanned = select_tiers_for_quantity(tiers, quantities.quantity_to_select_tier);
    Ok(ModelOutput::from_slices(slices, ctx, true)?.on_request_if(any_on_request(spanned)))
}

/// The selected tier's flat fee, independent of the quantity unless a price
/// mapping drives tier selection.
pub fn compute_flatfee(
    price: &Price,
    quantities: &Quantities,
    ctx: &PricingContext<'_>,
) -> PricingResult<ModelOutput> {
    let Some(tier) = select_tier_for_quantity(price.tiers(), quantities.quantity_to_select_tier)
    else {
        return Ok(ModelOutput::zero(ctx));
    };

    let slice = Slice {
        unit_amount: tier_flat_fee_amount(tier, ctx.currency)?,
        quantity: quantities.quantity_to_select_tier,
        multiplier: quantities.quantity_to_multiply(),
    };
    Ok(ModelOutput::from_slices(vec![slice], ctx, true)?.on_request_if(tier.is_on_request()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::compute_quantities;
    use crate::types::{PriceDisplayMode, PriceMapping};
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tiered(model: &str) -> Price {
        serde_json::from_value(json!({
            "_id": "tiered",
            "pricing_model": model,
            "is_tax_inclusive": true,
            "tiers": [
                { "up_to": 10, "unit_amount_decimal": "10.00", "flat_fee_amount_decimal": "50.00" },
                { "up_to": 20, "unit_amount_decimal": "9.00", "flat_fee_amount_decimal": "80.00" },
                { "up_to": null, "unit_amount_decimal": "8.00", "flat_fee_amount_decimal": "100.00" }
            ]
        }))
        .unwrap()
    }

    fn ctx() -> PricingContext<'static> {
        PricingContext::new("EUR", Decimal::ZERO, true)
    }

    fn total(output: &ModelOutput) -> String {
        output.amounts.amount_total.to_decimal_string()
    }

    #[test]
    fn test_volume_selects_one_tier() {
        let price = tiered("tiered_volume");
        let q = compute_quantities(&price, dec("21"), None).unwrap();
        let output = compute_volume(&price, &q, &ctx()).unwrap();

        assert_eq!(total(&output), "168.000000000000");
        let details = output.tiers_details.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].unit_amount, 8_000_000_000_000);
    }

    #[test]
    fn test_graduated_aggregates_slices() {
        let price = tiered("tiered_graduated");

        let q = compute_quantities(&price, dec("10"), None).unwrap();
        assert_eq!(total(&compute_graduated(&price, &q, &ctx()).unwrap()), "100.000000000000");

        let q = compute_quantities(&price, dec("10.999"), None).unwrap();
        let output = compute_graduated(&price, &q, &ctx()).unwrap();
        assert_eq!(total(&output), "108.991000000000");
        assert_eq!(output.tiers_details.as_ref().unwrap().len(), 2);

        let q = compute_quantities(&price, dec("21"), None).unwrap();
        let output = compute_graduated(&price, &q, &ctx()).unwrap();
        assert_eq!(total(&output), "198.000000000000");
        let unit_amounts: Vec<i128> = output
            .tiers_details
            .unwrap()
            .iter()
            .map(|t| t.unit_amount)
            .collect();
        assert_eq!(
            unit_amounts,
            vec![10_000_000_000_000, 9_000_000_000_000, 8_000_000_000_000]
        );
    }

    #[test]
    fn test_graduated_with_price_mapping_multiplies_by_quantity() {
        let price = tiered("tiered_graduated");
        let mappings: Vec<PriceMapping> =
            serde_json::from_value(json!([{ "price_id": "tiered", "value": 15 }])).unwrap();
        let q = compute_quantities(&price, dec("2"), Some(&mappings)).unwrap();

        // (10 × 10.00 + 5 × 9.00) × 2
        assert_eq!(total(&compute_graduated(&price, &q, &ctx()).unwrap()), "290.000000000000");
    }

    #[test]
    fn test_flatfee_ignores_quantity_without_mapping() {
        let price = tiered("tiered_flatfee");
        let q = compute_quantities(&price, dec("15"), None).unwrap();
        assert_eq!(total(&compute_flatfee(&price, &q, &ctx()).unwrap()), "80.000000000000");

        let mappings: Vec<PriceMapping> =
            serde_json::from_value(json!([{ "price_id": "tiered", "value": 5 }])).unwrap();
        let q = compute_quantities(&price, dec("3"), Some(&mappings)).unwrap();
        assert_eq!(total(&compute_flatfee(&price, &q, &ctx()).unwrap()), "150.000000000000");
    }

    #[test]
    fn test_on_request_tier_forces_display_mode() {
        let price: Price = serde_json::from_value(json!({
            "pricing_model": "tiered_volume",
            "price_display_in_journeys": "show_price",
            "tiers": [
                { "up_to": 10, "unit_amount_decimal": "1" },
                { "up_to": null, "unit_amount_decimal": "1", "display_mode": "on_request" }
            ]
        }))
        .unwrap();

        let q = compute_quantities(&price, dec("5"), None).unwrap();
        assert_eq!(compute_volume(&price, &q, &ctx()).unwrap().forced_display_mode, None);

        let q = compute_quantities(&price, dec("50"), None).unwrap();
        assert_eq!(
            compute_volume(&price, &q, &ctx()).unwrap().forced_display_mode,
            Some(PriceDisplayMode::ShowAsOnRequest)
        );
    }

    #[test]
    fn test_missing_tiers_price_zero() {
        let price: Price = serde_json::from_value(json!({ "pricing_model": "tiered_volume" })).unwrap();
        let q = compute_quantities(&price, dec("5"), None).unwrap();
        assert!(compute_volume(&price, &q, &ctx()).unwrap().amounts.amount_total.is_zero());
        assert!(compute_graduated(&price, &q, &ctx()).unwrap().amounts.amount_total.is_zero());
        assert!(compute_flatfee(&price, &q, &ctx()).unwrap().amounts.amount_total.is_zero());
    }
}
