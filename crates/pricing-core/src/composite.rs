//! # Composite Prices
//!
//! A composite price is a bundle of component prices priced as one line
//! item.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  components = item_components (if any) else _price.price_components     │
//! │       │                                                                 │
//! │       ├──► drop structurally invalid components                         │
//! │       ├──► compute each at component quantity × composite quantity      │
//! │       ├──► sum totals, discount fields and cashbacks                    │
//! │       └──► composite-level cashback coupons on the summed total         │
//! │       ▼                                                                 │
//! │  PriceItem { item_components, total_details, ... }                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Composite-level discount coupons are ignored; only components discount.

use rust_decimal::Decimal;
use tracing::debug;

use crate::cashback::{compute_cashbacks, merge_cashbacks};
use crate::config::PricingOptions;
use crate::coupon::select_coupons;
use crate::error::PricingResult;
use crate::item::{compute_line_item, PriceItem, PriceItemDto};
use crate::money::Money;
use crate::quantity::safe_quantity;
use crate::totals::Accumulator;
use crate::types::Price;
use crate::validation::validate_component_price;
use crate::INTERNAL_PRECISION;

/// The component inputs of a composite item.
///
/// Components without mappings of their own use the composite's, whichever
/// source they come from.
fn component_inputs(dto: &PriceItemDto, price: &Price) -> Vec<PriceItemDto> {
    let components = match dto.item_components.as_ref().filter(|c| !c.is_empty()) {
        Some(components) => components.clone(),
        None => price
            .price_components
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|component| PriceItemDto {
                price_id: component.id.clone(),
                description: component.description.clone(),
                price: Some(component.clone()),
                ..Default::default()
            })
            .collect(),
    };

    components
        .into_iter()
        .map(|mut component| {
            if component.price_mappings.is_none() {
                component.price_mappings = dto.price_mappings.clone();
            }
            if component.external_fees_mappings.is_none() {
                component.external_fees_mappings = dto.external_fees_mappings.clone();
            }
            component
        })
        .collect()
}

/// Divides a scaled amount by a quantity; zero for a zero quantity.
fn per_unit(amount: i128, quantity: Decimal, currency: &str) -> PricingResult<i128> {
    if quantity.is_zero() {
        return Ok(0);
    }
    Ok(Money::from_integer(amount, currency, INTERNAL_PRECISION)
        .divide(quantity)?
        .amount())
}

/// Sums the discount fields of the components into the composite.
fn sum_discounts(item: &mut PriceItem, components: &[PriceItem], quantity: Decimal) -> PricingResult<()> {
    let mut before_total = 0;
    let mut before_tax = 0;
    let mut discount = 0;
    let mut discount_net = 0;
    let mut tax_discount = 0;

    for c in components {
        before_total += c.before_discount_amount_total.unwrap_or(c.amount_total);
        before_tax += c.before_discount_tax_amount.unwrap_or(c.amount_tax);
        discount += c.discount_amount.unwrap_or_default();
        discount_net += c.discount_amount_net.unwrap_or_default();
        tax_discount += c.tax_discount_amount.unwrap_or_default();
    }

    let currency = item.currency.clone();
    let before_gross = per_unit(before_total, quantity, &currency)?;
    let before_net = per_unit(before_total - before_tax, quantity, &currency)?;

    item.before_discount_amount_total = Some(before_total);
    item.before_discount_tax_amount = Some(before_tax);
    item.before_discount_unit_amount_gross = Some(before_gross);
    item.before_discount_unit_amount_net = Some(before_net);
    item.before_discount_unit_amount = Some(if item.is_tax_inclusive {
        before_gross
    } else {
        before_net
    });
    item.discount_amount = Some(discount);
    item.discount_amount_net = Some(discount_net);
    item.tax_discount_amount = Some(tax_discount);
    item.unit_discount_amount = Some(per_unit(
        if item.is_tax_inclusive { discount } else { discount_net },
        quantity,
        &currency,
    )?);
    item.unit_discount_amount_net = Some(per_unit(discount_net, quantity, &currency)?);
    Ok(())
}

/// Computes a composite line item at internal precision.
pub fn compute_composite_price_item(
    dto: &PriceItemDto,
    options: &PricingOptions,
) -> PricingResult<PriceItem> {
    let price = dto.price.clone().unwrap_or_default();
    let quantity = safe_quantity(dto.quantity)?;

    let mut components = Vec::new();
    for input in component_inputs(dto, &price) {
        let component_price = input.price.clone().unwrap_or_default();
        if let Err(error) = validate_component_price(&component_price) {
            debug!(
                price_id = ?input.price_id,
                error = %error,
                "Dropping invalid composite component"
            );
            continue;
        }
        components.push(compute_line_item(&input, options, quantity)?);
    }

    let mut item = PriceItem::from_input(dto, &price);
    item.is_composite_price = Some(true);
    for c in &components {
        item.amount_subtotal += c.amount_subtotal;
        item.amount_total += c.amount_total;
        item.amount_tax += c.amount_tax;
    }
    item.unit_amount_net = per_unit(item.amount_subtotal, quantity, &item.currency)?;
    item.unit_amount_gross = per_unit(item.amount_total, quantity, &item.currency)?;
    item.unit_amount = Some(if item.is_tax_inclusive {
        item.unit_amount_gross
    } else {
        item.unit_amount_net
    });

    if components.iter().any(PriceItem::has_discount) {
        sum_discounts(&mut item, &components, quantity)?;
    }

    let composite_coupons = select_coupons(dto.coupons.as_deref(), &options.redeemed_promos);
    let composite_total = Money::from_integer(item.amount_total, &item.currency, INTERNAL_PRECISION);
    let composite_cashbacks =
        compute_cashbacks(&composite_coupons.cashbacks, &composite_total, quantity)?;
    let cashbacks = merge_cashbacks(
        components
            .iter()
            .flat_map(|c| c.cashbacks.iter().flatten().cloned())
            .chain(composite_cashbacks),
    );

    let accumulator = components
        .iter()
        .fold(Accumulator::new(&item.currency), |acc, c| acc.add_line(c))
        .add_cashbacks(&cashbacks);
    item.total_details = Some(accumulator.finish(Vec::new())?.total_details);

    item.set_cashbacks(cashbacks);
    item.item_components = Some(components);
    Ok(item)
}
