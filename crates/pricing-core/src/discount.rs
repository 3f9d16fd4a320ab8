//! # Discount Engine
//!
//! Applies the winning discount coupon to already-priced model output.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ModelOutput ──► for each slice:                                        │
//! │                    percentage: unit × (1 - pct/100)                     │
//! │                    fixed:      unit - min(fixed, unit)                  │
//! │              ──► reprice the discounted slices                          │
//! │              ──► before_discount_* snapshot + discount deltas           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Discounts apply to the configured unit amount, so tax-inclusive prices are
//! discounted on gross and tax-exclusive prices on net. Graduated prices are
//! discounted slice by slice and `tiers_details` shows discounted amounts.

use rust_decimal::Decimal;

use crate::amounts::{PricingContext, Slice};
use crate::calculators::ModelOutput;
use crate::coupon::{Coupon, CouponType};
use crate::error::PricingResult;
use crate::money::Money;

/// Pre-discount snapshot and discount deltas of a line item.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountFields {
    pub before_discount_unit_amount: Money,
    pub before_discount_unit_amount_gross: Money,
    pub before_discount_unit_amount_net: Money,
    pub before_discount_tax_amount: Money,
    pub before_discount_amount_total: Money,
    pub discount_amount: Money,
    pub discount_amount_net: Money,
    pub tax_discount_amount: Money,
    pub unit_discount_amount: Money,
    pub unit_discount_amount_net: Money,
    /// Effective (clamped) percentage; percentage coupons only.
    pub discount_percentage: Option<Decimal>,
}

fn discount_slice(slice: &Slice, coupon: &Coupon, ctx: &PricingContext<'_>) -> PricingResult<Slice> {
    let unit_amount = match coupon.coupon_type {
        CouponType::Percentage => {
            let remaining = Decimal::ONE - coupon.percentage() / Decimal::ONE_HUNDRED;
            slice.unit_amount.multiply(remaining)?
        }
        CouponType::Fixed => {
            let base = slice.unit_amount.clone().floor_zero();
            let discount = coupon.fixed_amount(ctx.currency)?.floor_zero().min(base.clone())?;
            &base - &discount
        }
    };

    Ok(Slice {
        unit_amount,
        ..slice.clone()
    })
}

/// Reprices `base` with `coupon` applied.
///
/// Returns the discounted output and the discount fields.
pub fn apply_discount(
    base: &ModelOutput,
    coupon: &Coupon,
    ctx: &PricingContext<'_>,
) -> PricingResult<(ModelOutput, DiscountFields)> {
    let slices = base
        .slices
        .iter()
        .map(|slice| discount_slice(slice, coupon, ctx))
        .collect::<PricingResult<Vec<_>>>()?;
    let discounted = base.reprice(slices, ctx)?;

    let before = &base.amounts;
    let after = &discounted.amounts;
    let fields = DiscountFields {
        before_discount_unit_amount: base.unit_amount.clone(),
        before_discount_unit_amount_gross: before.unit_amount_gross.clone(),
        before_discount_unit_amount_net: before.unit_amount_net.clone(),
        before_discount_tax_amount: before.amount_tax.clone(),
        before_discount_amount_total: before.amount_total.clone(),
        discount_amount: &before.amount_total - &after.amount_total,
        discount_amount_net: &before.amount_subtotal - &after.amount_subtotal,
        tax_discount_amount: &before.amount_tax - &after.amount_tax,
        unit_discount_amount: &base.unit_amount - &discounted.unit_amount,
        unit_discount_amount_net: &before.unit_amount_net - &after.unit_amount_net,
        discount_percentage: coupon.is_percentage().then(|| coupon.percentage()),
    };

    Ok((discounted, fields))
}

// =============================================================================
// Unit Tests
// =============================================================================
