//! # External GetAG
//!
//! Grid-fee pricing: an externally supplied fee plus a catalog markup.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  user_input = normalized price mapping value, else the quantity         │
//! │                                                                         │
//! │  work_price   unit = fee / user_input + markup_per_unit                 │
//! │               multiplier = unit amount multiplier                       │
//! │  base_price   unit = fee + markup                                       │
//! │               multiplier = quantity                                     │
//! │                                                                         │
//! │  markup: per_unit       markup_amount_decimal                           │
//! │          tiered_volume  unit amount of the tier user_input falls into   │
//! │          tiered_flatfee flat fee of that tier (÷ user_input for work)   │
//! │                                                                         │
//! │  zero user_input, no external fee, or no config → every amount is 0    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Like market prices, the external fee is a net amount.

use rust_decimal::Decimal;

use crate::amounts::{PricingContext, Slice};
use crate::calculators::ModelOutput;
use crate::details::GetAgDetails;
use crate::error::PricingResult;
use crate::item::PriceItemDto;
use crate::money::Money;
use crate::quantity::Quantities;
use crate::tax::tax_factor;
use crate::tiers::{select_tier_for_quantity, tier_flat_fee_amount, tier_unit_amount};
use crate::types::{GetAgConfig, GetAgType, MarkupPricingModel, Price, TariffType};

fn zeroed_details(config: &GetAgConfig) -> GetAgDetails {
    GetAgDetails {
        category: config.category,
        fee_type: config.fee_type,
        tariff_type: config.tariff_type,
        markup_pricing_model: config.markup_pricing_model,
        amount_total: 0,
        amount_total_decimal: None,
        unit_amount_net: 0,
        unit_amount_net_decimal: None,
        unit_amount_gross: 0,
        unit_amount_gross_decimal: None,
        markup_amount_net: 0,
        markup_amount_net_decimal: None,
        markup_amount_gross: 0,
        markup_amount_gross_decimal: None,
    }
}

fn zero_output(config: Option<&GetAgConfig>, ctx: &PricingContext<'_>) -> ModelOutput {
    let mut output = ModelOutput::zero(ctx);
    output.get_ag = config.map(zeroed_details);
    output
}

/// Markup per unit and whether its tier is on request.
fn markup_per_unit(
    config: &GetAgConfig,
    user_input: Decimal,
    ctx: &PricingContext<'_>,
) -> PricingResult<(Money, bool)> {
    let tiers = config.markup_tiers.as_deref().unwrap_or_default();

    match config.markup_pricing_model {
        MarkupPricingModel::PerUnit => {
            let markup = match config.markup_amount_decimal.as_deref() {
                Some(decimal) => Money::from_decimal_str(decimal, ctx.currency)?,
                None => ctx.zero(),
            };
            Ok((markup, false))
        }
        MarkupPricingModel::TieredVolume => match select_tier_for_quantity(tiers, user_input) {
            Some(tier) => Ok((tier_unit_amount(tier, ctx.currency)?, tier.is_on_request())),
            None => Ok((ctx.zero(), false)),
        },
        MarkupPricingModel::TieredFlatfee => match select_tier_for_quantity(tiers, user_input) {
            Some(tier) => {
                let fee = tier_flat_fee_amount(tier, ctx.currency)?;
                let markup = match config.fee_type {
                    GetAgType::WorkPrice => fee.divide(user_input)?,
                    GetAgType::BasePrice => fee,
                };
                Ok((markup, tier.is_on_request()))
            }
            None => Ok((ctx.zero(), false)),
        },
    }
}

pub fn compute(
    price: &Price,
    quantities: &Quantities,
    ctx: &PricingContext<'_>,
    external_fee: Option<Money>,
) -> PricingResult<ModelOutput> {
    let config = price.get_ag.as_ref();
    let (Some(fee), Some(config)) = (external_fee, config) else {
        return Ok(zero_output(config, ctx));
    };

    let user_input = quantities
        .normalized_mapping_value
        .unwrap_or(quantities.safe_quantity);
    if user_input <= Decimal::ZERO {
        return Ok(zero_output(Some(config), ctx));
    }

    let (markup, on_request) = markup_per_unit(config, user_input, ctx)?;
    let (fee_net, multiplier) = match config.fee_type {
        GetAgType::WorkPrice => (fee.divide(user_input)?, quantities.unit_amount_multiplier),
        GetAgType::BasePrice => (fee.clone(), quantities.safe_quantity),
    };
    let fee_gross = fee_net.multiply(tax_factor(ctx.tax_rate))?;

    let combined = if ctx.is_tax_inclusive {
        &fee_gross + &markup
    } else {
        &fee_net + &markup
    };
    let (markup_net, markup_gross) = ctx.net_and_gross(&markup)?;

    let slice = Slice {
        unit_amount: combined,
        quantity: multiplier,
        multiplier,
    };
    let mut output = ModelOutput::from_slices(vec![slice], ctx, false)?.on_request_if(on_request);
    output.get_ag = Some(GetAgDetails {
        amount_total: fee.amount(),
        unit_amount_net: fee_net.amount(),
        unit_amount_gross: fee_gross.amount(),
        markup_amount_net: markup_net.amount(),
        markup_amount_gross: markup_gross.amount(),
        ..zeroed_details(config)
    });
    Ok(output)
}

// =============================================================================
// Config Extraction
// =============================================================================

fn matches(config: &GetAgConfig, fee_type: GetAgType, tariff_type: TariffType) -> bool {
    match (config.fee_type, fee_type) {
        (GetAgType::BasePrice, GetAgType::BasePrice) => true,
        (GetAgType::WorkPrice, GetAgType::WorkPrice) => {
            config.tariff_type.unwrap_or_default() == tariff_type
        }
        _ => false,
    }
}

fn find_in_price(price: &Price, fee_type: GetAgType, tariff_type: TariffType) -> Option<&GetAgConfig> {
    price
        .get_ag
        .as_ref()
        .filter(|config| matches(config, fee_type, tariff_type))
        .or_else(|| {
            price
                .price_components
                .iter()
                .flatten()
                .find_map(|component| find_in_price(component, fee_type, tariff_type))
        })
}

/// Finds the GetAG configuration of `fee_type` on an item or its components.
///
/// Work prices additionally match on tariff type, `HT` when unspecified.
pub fn extract_get_ag_config(
    item: &PriceItemDto,
    fee_type: GetAgType,
    tariff_type: Option<TariffType>,
) -> Option<&GetAgConfig> {
    let tariff_type = tariff_type.unwrap_or_default();

    item.price
        .as_ref()
        .and_then(|price| find_in_price(price, fee_type, tariff_type))
        .or_else(|| {
            item.item_components
                .iter()
                .flatten()
                .find_map(|component| extract_get_ag_config(component, fee_type, Some(tariff_type)))
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
