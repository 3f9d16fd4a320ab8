//! # Cashback
//!
//! Cashback coupons never change an item's totals. They produce per-period
//! entries that the totals engine buckets and subtracts from recurrence
//! totals as `after_cashback_amount_total`.
//!
//! ```text
//! fixed       amount = fixed value × quantity
//! percentage  amount = amount_total × pct / 100
//!
//! period "0"   immediate: subtracted from every recurrence in full
//! period "N"   annual amount: spread over the recurrence's billing period
//! ```

use rust_decimal::Decimal;

use crate::coupon::{Coupon, CouponType, IMMEDIATE_CASHBACK_PERIOD};
use crate::details::CashbackEntry;
use crate::error::PricingResult;
use crate::money::Money;
use crate::types::BillingPeriod;

/// Computes one cashback entry per coupon, merged by period.
pub fn compute_cashbacks(
    coupons: &[Coupon],
    amount_total: &Money,
    quantity: Decimal,
) -> PricingResult<Vec<CashbackEntry>> {
    let mut entries = Vec::with_capacity(coupons.len());

    for coupon in coupons.iter().filter(|c| c.is_cashback()) {
        let amount = match coupon.coupon_type {
            CouponType::Fixed => coupon.fixed_amount(amount_total.currency())?.multiply(quantity)?,
            CouponType::Percentage => {
                amount_total.multiply(coupon.percentage() / Decimal::ONE_HUNDRED)?
            }
        };
        entries.push(CashbackEntry::new(coupon.cashback_period(), &amount));
    }

    Ok(merge_cashbacks(entries))
}

/// Sums entries sharing a cashback period, keeping first-seen order.
pub fn merge_cashbacks(entries: impl IntoIterator<Item = CashbackEntry>) -> Vec<CashbackEntry> {
    let mut merged: Vec<CashbackEntry> = Vec::new();

    for entry in entries {
        match merged
            .iter_mut()
            .find(|existing| existing.cashback_period == entry.cashback_period)
        {
            Some(existing) => existing.amount_total += entry.amount_total,
            None => merged.push(entry),
        }
    }

    merged
}

/// The share of a cashback that offsets one recurrence.
pub fn cashback_for_recurrence(
    amount: &Money,
    cashback_period: &str,
    recurrence_period: Option<BillingPeriod>,
) -> PricingResult<Money> {
    match recurrence_period {
        Some(period) if cashback_period != IMMEDIATE_CASHBACK_PERIOD => {
            amount.divide(Decimal::from(period.yearly_factor()))
        }
        _ => Ok(amount.clone()),
    }
}
