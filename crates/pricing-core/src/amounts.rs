//! # Per-Unit Amounts
//!
//! The innermost primitive every pricing model ends in: a configured unit
//! amount, a tax rate and a multiplier become net/gross unit amounts and
//! subtotal/total/tax amounts at internal precision.
//!
//! ## Tax Direction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  is_tax_inclusive = true           is_tax_inclusive = false             │
//! │  ────────────────────────          ─────────────────────────            │
//! │  gross = configured amount         net   = configured amount            │
//! │  net   = gross / (1 + rate)        gross = net × (1 + rate)             │
//! │                                                                         │
//! │  subtotal = net × multiplier                                            │
//! │  total    = gross × multiplier                                          │
//! │  tax      = total - subtotal                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;

use crate::error::PricingResult;
use crate::money::Money;
use crate::tax::tax_factor;
use crate::{DISPLAY_PRECISION, INTERNAL_PRECISION};

/// Everything a calculator needs to know about the line item besides amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingContext<'a> {
    pub currency: &'a str,
    /// Tax percentage, zero for untaxed items.
    pub tax_rate: Decimal,
    pub is_tax_inclusive: bool,
}

impl<'a> PricingContext<'a> {
    pub fn new(currency: &'a str, tax_rate: Decimal, is_tax_inclusive: bool) -> Self {
        PricingContext {
            currency,
            tax_rate,
            is_tax_inclusive,
        }
    }

    pub fn zero(&self) -> Money {
        Money::zero(self.currency)
    }

    /// Splits a configured amount into `(net, gross)`.
    pub fn net_and_gross(&self, amount: &Money) -> PricingResult<(Money, Money)> {
        let factor = tax_factor(self.tax_rate);
        if self.is_tax_inclusive {
            Ok((amount.divide(factor)?, amount.clone()))
        } else {
            Ok((amount.clone(), amount.multiply(factor)?))
        }
    }
}

// =============================================================================
// Amount Breakdown
// =============================================================================

/// Unit and total amounts of a line item (or of one tier slice).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountBreakdown {
    pub unit_amount_net: Money,
    pub unit_amount_gross: Money,
    pub amount_subtotal: Money,
    pub amount_total: Money,
    pub amount_tax: Money,
}

impl AmountBreakdown {
    pub fn zero(currency: &str) -> Self {
        AmountBreakdown {
            unit_amount_net: Money::zero(currency),
            unit_amount_gross: Money::zero(currency),
            amount_subtotal: Money::zero(currency),
            amount_total: Money::zero(currency),
            amount_tax: Money::zero(currency),
        }
    }

    /// Adds another breakdown field by field.
    pub fn accumulate(&mut self, other: &AmountBreakdown) {
        self.unit_amount_net += &other.unit_amount_net;
        self.unit_amount_gross += &other.unit_amount_gross;
        self.amount_subtotal += &other.amount_subtotal;
        self.amount_total += &other.amount_total;
        self.amount_tax += &other.amount_tax;
    }
}

/// Prices a configured unit amount at `multiplier` units.
///
/// ## Example
/// ```rust
/// use pricing_core::amounts::{compute_unit_amounts, PricingContext};
/// use pricing_core::money::Money;
/// use rust_decimal::Decimal;
///
/// let ctx = PricingContext::new("EUR", Decimal::from(19), true);
/// let unit = Money::from_decimal_str("10.00", "EUR").unwrap();
/// let amounts = compute_unit_amounts(&unit, &ctx, Decimal::ONE).unwrap();
/// assert_eq!(amounts.unit_amount_net.amount(), 8_403_361_344_538);
/// assert_eq!(amounts.amount_tax.amount(), 1_596_638_655_462);
/// ```
pub fn compute_unit_amounts(
    unit_amount: &Money,
    ctx: &PricingContext<'_>,
    multiplier: Decimal,
) -> PricingResult<AmountBreakdown> {
    let (unit_amount_net, unit_amount_gross) = ctx.net_and_gross(unit_amount)?;
    let amount_subtotal = unit_amount_net.multiply(multiplier)?;
    let amount_total = unit_amount_gross.multiply(multiplier)?;
    let amount_tax = &amount_total - &amount_subtotal;

    Ok(AmountBreakdown {
        unit_amount_net,
        unit_amount_gross,
        amount_subtotal,
        amount_total,
        amount_tax,
    })
}

/// Per-unit calculator over an optional decimal string.
///
/// A missing amount prices as zero. Only a malformed string fails.
pub fn compute_per_unit_amounts(
    unit_amount_decimal: Option<&str>,
    ctx: &PricingContext<'_>,
    multiplier: Decimal,
) -> PricingResult<AmountBreakdown> {
    let unit_amount = match unit_amount_decimal {
        Some(decimal) => Money::from_decimal_str(decimal, ctx.currency)?,
        None => ctx.zero(),
    };
    compute_unit_amounts(&unit_amount, ctx, multiplier)
}

/// Resolves a catalog amount given as decimal string or legacy cents.
pub fn catalog_amount(
    decimal: Option<&str>,
    cents: Option<i64>,
    currency: &str,
) -> PricingResult<Option<Money>> {
    match (decimal, cents) {
        (Some(decimal), _) => Money::from_decimal_str(decimal, currency).map(Some),
        (None, Some(cents)) => Money::from_integer(cents as i128, currency, DISPLAY_PRECISION)
            .convert_precision(INTERNAL_PRECISION)
            .map(Some),
        (None, None) => Ok(None),
    }
}

// =============================================================================
// Slices
// =============================================================================

/// One priced portion of a line item: a configured unit amount applied to a
/// quantity. Per-unit models have one slice; graduated tiers have one per
/// participating tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    /// Configured unit amount (gross if tax-inclusive, net otherwise).
    pub unit_amount: Money,
    /// Quantity reported for this slice.
    pub quantity: Decimal,
    /// Factor the unit amounts are multiplied by.
    pub multiplier: Decimal,
}

/// Prices every slice and sums them into the line-item breakdown.
pub fn price_slices(
    slices: &[Slice],
    ctx: &PricingContext<'_>,
) -> PricingResult<(AmountBreakdown, Vec<AmountBreakdown>)> {
    let mut total = AmountBreakdown::zero(ctx.currency);
    let mut per_slice = Vec::with_capacity(slices.len());

    for slice in slices {
        let amounts = compute_unit_amounts(&slice.unit_amount, ctx, slice.multiplier)?;
        total.accumulate(&amounts);
        per_slice.push(amounts);
    }

    Ok((total, per_slice))
}

// =============================================================================
// Unit Tests
// =============================================================================
