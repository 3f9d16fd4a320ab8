//! # Pricing-Model Calculators
//!
//! One calculator per pricing model, selected by a closed dispatch over
//! [`PricingModel`].
//!
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────────────┐
//! │ per_unit         │ one slice: unit amount × multiplier                  │
//! │ tiered_volume    │ one slice: selected tier's unit amount × multiplier  │
//! │ tiered_graduated │ one slice per spanned tier                           │
//! │ tiered_flatfee   │ one slice: selected tier's flat fee                  │
//! │ dynamic_tariff   │ one slice: market price + markup                     │
//! │ external_getag   │ one slice: external fee share + markup               │
//! └──────────────────┴──────────────────────────────────────────────────────┘
//! ```
//!
//! Every calculator returns its [`Slice`]s alongside the priced amounts so
//! the discount engine can reprice the exact same slices.

pub mod dynamic_tariff;
pub mod getag;
pub mod per_unit;
pub mod tiered;

use tracing::debug;

use crate::amounts::{catalog_amount, price_slices, AmountBreakdown, PricingContext, Slice};
use crate::details::{DynamicTariffDetails, GetAgDetails, TierDetail};
use crate::error::PricingResult;
use crate::money::Money;
use crate::quantity::{normalize_value_to_frequency_unit, Quantities};
use crate::types::{ExternalFeeMapping, Price, PriceDisplayMode, PricingModel};
use crate::INTERNAL_PRECISION;

/// Result of one pricing-model calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    /// Configured unit amount, summed over slices.
    pub unit_amount: Money,
    pub amounts: AmountBreakdown,
    pub slices: Vec<Slice>,
    /// Present for the tiered models.
    pub tiers_details: Option<Vec<TierDetail>>,
    pub dynamic_tariff: Option<DynamicTariffDetails>,
    pub get_ag: Option<GetAgDetails>,
    /// Set when a selected tier overrides the price's display mode.
    pub forced_display_mode: Option<PriceDisplayMode>,
}

impl ModelOutput {
    /// Prices `slices`; `with_tier_details` emits one tier detail per slice.
    pub fn from_slices(
        slices: Vec<Slice>,
        ctx: &PricingContext<'_>,
        with_tier_details: bool,
    ) -> PricingResult<Self> {
        let (amounts, per_slice) = price_slices(&slices, ctx)?;

        let mut unit_amount = ctx.zero();
        for slice in &slices {
            unit_amount += &slice.unit_amount;
        }

        let tiers_details = with_tier_details.then(|| {
            slices
                .iter()
                .zip(&per_slice)
                .map(|(slice, amounts)| TierDetail::new(slice.quantity, &slice.unit_amount, amounts))
                .collect()
        });

        Ok(ModelOutput {
            unit_amount,
            amounts,
            slices,
            tiers_details,
            dynamic_tariff: None,
            get_ag: None,
            forced_display_mode: None,
        })
    }

    /// All-zero output for missing business data.
    pub fn zero(ctx: &PricingContext<'_>) -> Self {
        ModelOutput {
            unit_amount: ctx.zero(),
            amounts: AmountBreakdown::zero(ctx.currency),
            slices: Vec::new(),
            tiers_details: None,
            dynamic_tariff: None,
            get_ag: None,
            forced_display_mode: None,
        }
    }

    /// Reprices this output with replacement slices, keeping the model
    /// sub-breakdowns and display override.
    pub fn reprice(&self, slices: Vec<Slice>, ctx: &PricingContext<'_>) -> PricingResult<Self> {
        let repriced = ModelOutput::from_slices(slices, ctx, self.tiers_details.is_some())?;
        Ok(ModelOutput {
            dynamic_tariff: self.dynamic_tariff.clone(),
            get_ag: self.get_ag.clone(),
            forced_display_mode: self.forced_display_mode,
            ..repriced
        })
    }

    pub(crate) fn on_request_if(mut self, on_request: bool) -> Self {
        if on_request {
            debug!("Tier on request forces show_as_on_request");
            self.forced_display_mode = Some(PriceDisplayMode::ShowAsOnRequest);
        }
        self
    }
}

/// Computes the amounts of `price` with the calculator of its pricing model.
pub fn compute_model(
    price: &Price,
    quantities: &Quantities,
    ctx: &PricingContext<'_>,
    external_fee: Option<&ExternalFeeMapping>,
) -> PricingResult<ModelOutput> {
    match price.pricing_model {
        PricingModel::PerUnit | PricingModel::Composite => {
            per_unit::compute(price, quantities, ctx)
        }
        PricingModel::TieredVolume => tiered::compute_volume(price, quantities, ctx),
        PricingModel::TieredGraduated => tiered::compute_graduated(price, quantities, ctx),
        PricingModel::TieredFlatfee => tiered::compute_flatfee(price, quantities, ctx),
        PricingModel::DynamicTariff => {
            let fee = external_fee_amount(external_fee, price, ctx.currency)?;
            dynamic_tariff::compute(price, quantities, ctx, fee)
        }
        PricingModel::ExternalGetag => {
            let fee = external_fee_amount(external_fee, price, ctx.currency)?;
            getag::compute(price, quantities, ctx, fee)
        }
    }
}

/// The external fee of a mapping, normalized to the price's billing period.
pub fn external_fee_amount(
    mapping: Option<&ExternalFeeMapping>,
    price: &Price,
    currency: &str,
) -> PricingResult<Option<Money>> {
    let Some(mapping) = mapping else {
        return Ok(None);
    };
    let Some(amount) = catalog_amount(
        mapping.amount_total_decimal.as_deref(),
        mapping.amount_total,
        currency,
    )?
    else {
        return Ok(None);
    };

    let normalized = normalize_value_to_frequency_unit(
        amount.to_decimal()?,
        mapping.frequency_unit,
        price.billing_period,
    )?;
    Money::from_decimal(normalized, currency, INTERNAL_PRECISION).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::compute_quantities;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn test_dispatch_per_unit_fixture() {
        let price: Price = serde_json::from_value(json!({
            "pricing_model": "per_unit",
            "unit_amount": 1000,
            "unit_amount_decimal": "10.00",
            "is_tax_inclusive": true
        }))
        .unwrap();
        let ctx = PricingContext::new("EUR", Decimal::from(19), true);
        let quantities = compute_quantities(&price, Decimal::ONE, None).unwrap();

        let output = compute_model(&price, &quantities, &ctx, None).unwrap();
        assert_eq!(output.amounts.unit_amount_net.amount(), 8_403_361_344_538);
        assert_eq!(output.amounts.amount_tax.amount(), 1_596_638_655_462);
        assert!(output.tiers_details.is_none());
    }

    #[test]
    fn test_external_fee_normalization() {
        let price: Price =
            serde_json::from_value(json!({ "type": "recurring", "billing_period": "monthly" }))
                .unwrap();
        let mapping: ExternalFeeMapping = serde_json::from_value(json!({
            "frequency_unit": "yearly",
            "amount_total_decimal": "120"
        }))
        .unwrap();

        let fee = external_fee_amount(Some(&mapping), &price, "EUR").unwrap().unwrap();
        assert_eq!(fee.to_decimal_string(), "10.000000000000");
        assert!(external_fee_amount(None, &price, "EUR").unwrap().is_none());
    }

    #[test]
    fn test_reprice_keeps_model_details() {
        let ctx = PricingContext::new("EUR", Decimal::ZERO, true);
        let mut output = ModelOutput::zero(&ctx);
        output.dynamic_tariff = Some(DynamicTariffDetails::default());
        output.forced_display_mode = Some(PriceDisplayMode::ShowAsOnRequest);

        let slice = Slice {
            unit_amount: Money::from_decimal_str("2", "EUR").unwrap(),
            quantity: Decimal::from(3),
            multiplier: Decimal::from(3),
        };
        let repriced = output.reprice(vec![slice], &ctx).unwrap();
        assert_eq!(repriced.amounts.amount_total.to_decimal_string(), "6.000000000000");
        assert!(repriced.dynamic_tariff.is_some());
        assert_eq!(repriced.forced_display_mode, Some(PriceDisplayMode::ShowAsOnRequest));
    }
}
