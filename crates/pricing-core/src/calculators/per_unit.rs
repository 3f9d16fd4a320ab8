//! Per-unit model: the price's unit amount times the unit multiplier.

use crate::amounts::{catalog_amount, PricingContext, Slice};
use crate::calculators::ModelOutput;
use crate::error::PricingResult;
use crate::quantity::Quantities;
use crate::types::Price;

pub fn compute(
    price: &Price,
    quantities: &Quantities,
    ctx: &PricingContext<'_>,
) -> PricingResult<ModelOutput> {
    let unit_amount = catalog_amount(
        price.unit_amount_decimal.as_deref(),
        price.unit_amount,
        ctx.currency,
    )?
    .unwrap_or_else(|| ctx.zero());

    let slice = Slice {
        unit_amount,
        quantity: quantities.unit_amount_multiplier,
        multiplier: quantities.unit_amount_multiplier,
    };
    ModelOutput::from_slices(vec![slice], ctx, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::compute_quantities;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn price(value: serde_json::Value) -> Price {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_tax_inclusive_vs_exclusive_symmetry() {
        let inclusive = price(json!({ "unit_amount_decimal": "10.00", "is_tax_inclusive": true }));
        let exclusive = price(json!({ "unit_amount_decimal": "10.00", "is_tax_inclusive": false }));
        let q = compute_quantities(&inclusive, Decimal::ONE, None).unwrap();

        let incl = compute(&inclusive, &q, &PricingContext::new("EUR", Decimal::from(19), true))
            .unwrap();
        let excl = compute(&exclusive, &q, &PricingContext::new("EUR", Decimal::from(19), false))
            .unwrap();

        assert_eq!(incl.amounts.unit_amount_gross.to_decimal_string(), "10.000000000000");
        let net = incl.amounts.unit_amount_net.convert_precision(2).unwrap();
        assert_eq!(net.amount(), 840);
        assert_eq!(excl.amounts.unit_amount_net.to_decimal_string(), "10.000000000000");
        assert_eq!(excl.amounts.unit_amount_gross.to_decimal_string(), "11.900000000000");
    }

    #[test]
    fn test_missing_amount_prices_zero() {
        let p = price(json!({}));
        let q = compute_quantities(&p, Decimal::from(3), None).unwrap();
        let output = compute(&p, &q, &PricingContext::new("EUR", Decimal::from(19), true)).unwrap();
        assert!(output.amounts.amount_total.is_zero());
        assert!(output.unit_amount.is_zero());
    }

    #[test]
    fn test_legacy_cents_amount() {
        let p = price(json!({ "unit_amount": 250 }));
        let q = compute_quantities(&p, Decimal::from(4), None).unwrap();
        let output = compute(&p, &q, &PricingContext::new("EUR", Decimal::ZERO, true)).unwrap();
        assert_eq!(output.amounts.amount_total.to_decimal_string(), "10.000000000000");
    }
}
