//! # Dynamic Tariff
//!
//! Unit price driven by a per-call market price plus a catalog markup.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  manual            combined = average_price_decimal                     │
//! │                    market part = 0, markup part = average price         │
//! │                                                                         │
//! │  day_ahead_market  tax-inclusive: combined = market × (1+rate) + markup │
//! │                    tax-exclusive: combined = market + markup            │
//! │                                                                         │
//! │  no external fee or no tariff config → every amount is zero             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The market price is always a net amount; the markup follows the price's
//! tax inclusivity.

use crate::amounts::{PricingContext, Slice};
use crate::calculators::ModelOutput;
use crate::details::DynamicTariffDetails;
use crate::error::PricingResult;
use crate::money::Money;
use crate::quantity::Quantities;
use crate::tax::tax_factor;
use crate::types::{DynamicTariffMode, Price};

fn optional_amount(decimal: Option<&str>, ctx: &PricingContext<'_>) -> PricingResult<Money> {
    match decimal {
        Some(decimal) => Money::from_decimal_str(decimal, ctx.currency),
        None => Ok(ctx.zero()),
    }
}

pub fn compute(
    price: &Price,
    quantities: &Quantities,
    ctx: &PricingContext<'_>,
    external_fee: Option<Money>,
) -> PricingResult<ModelOutput> {
    let (Some(market), Some(config)) = (external_fee, price.dynamic_tariff.as_ref()) else {
        let mut output = ModelOutput::zero(ctx);
        output.dynamic_tariff = Some(DynamicTariffDetails {
            mode: price
                .dynamic_tariff
                .as_ref()
                .map(|config| config.mode)
                .unwrap_or_default(),
            ..Default::default()
        });
        return Ok(output);
    };

    let (market_net, market_gross, markup) = match config.mode {
        DynamicTariffMode::Manual => {
            let average = optional_amount(config.average_price_decimal.as_deref(), ctx)?;
            (ctx.zero(), ctx.zero(), average)
        }
        DynamicTariffMode::DayAheadMarket => {
            let markup = optional_amount(config.markup_amount_decimal.as_deref(), ctx)?;
            let market_gross = market.multiply(tax_factor(ctx.tax_rate))?;
            (market, market_gross, markup)
        }
    };

    let combined = if ctx.is_tax_inclusive {
        &market_gross + &markup
    } else {
        &market_net + &markup
    };
    let (markup_net, markup_gross) = ctx.net_and_gross(&markup)?;

    let slice = Slice {
        unit_amount: combined,
        quantity: quantities.unit_amount_multiplier,
        multiplier: quantities.unit_amount_multiplier,
    };
    let mut output = ModelOutput::from_slices(vec![slice], ctx, false)?;
    output.dynamic_tariff = Some(DynamicTariffDetails {
        mode: config.mode,
        unit_amount_net: market_net.amount(),
        unit_amount_gross: market_gross.amount(),
        markup_amount_net: markup_net.amount(),
        markup_amount_gross: markup_gross.amount(),
        ..Default::default()
    });
    Ok(output)
}
