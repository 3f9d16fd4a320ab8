//! # Precision Rescaling
//!
//! Every computed shape stores its money fields as scaled integers with an
//! optional `*_decimal` sibling. This module walks those fields generically.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  compute (precision 12)                                                 │
//! │    amount_total = 10_000_000_000_000   amount_total_decimal = None      │
//! │                     │                                                   │
//! │                     ▼ convert_precision(2)                              │
//! │    amount_total = 1000                 amount_total_decimal = "10.00"   │
//! │                     │                                                   │
//! │                     ▼ restore_from_decimals (snapshot reuse)            │
//! │    amount_total = 10_000_000_000_000   amount_total_decimal = None      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Absent optional fields are skipped, never zero-filled.

use crate::error::PricingResult;
use crate::money::{rescale_amount, Money};
use crate::{DEFAULT_CURRENCY, INTERNAL_PRECISION};

/// Callback over one `(amount, amount_decimal)` pair.
pub type AmountVisitor<'a> = dyn FnMut(&mut i128, &mut Option<String>) -> PricingResult<()> + 'a;

/// A shape that owns scaled-integer money fields.
pub trait MoneyFields {
    /// Calls `visit` on every money field present, nested shapes included.
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()>;
}

impl<T: MoneyFields> MoneyFields for Vec<T> {
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()> {
        for value in self.iter_mut() {
            value.visit_amounts(visit)?;
        }
        Ok(())
    }
}

impl<T: MoneyFields> MoneyFields for Option<T> {
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()> {
        match self {
            Some(value) => value.visit_amounts(visit),
            None => Ok(()),
        }
    }
}

impl<T: MoneyFields> MoneyFields for Box<T> {
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()> {
        self.as_mut().visit_amounts(visit)
    }
}

/// Visits an optional money field.
pub fn visit_optional(
    amount: &mut Option<i128>,
    decimal: &mut Option<String>,
    visit: &mut AmountVisitor<'_>,
) -> PricingResult<()> {
    match amount {
        Some(amount) => visit(amount, decimal),
        None => Ok(()),
    }
}

// =============================================================================
// Passes
// =============================================================================

/// Rescales every money field from `from` to `to` digits (half-up) and
/// writes the decimal-string sibling.
pub fn convert_precision<T: MoneyFields>(value: &mut T, from: u32, to: u32) -> PricingResult<()> {
    value.visit_amounts(&mut |amount, decimal| {
        *amount = rescale_amount(*amount, from, to)?;
        *decimal = Some(Money::from_integer(*amount, DEFAULT_CURRENCY, to).to_decimal_string());
        Ok(())
    })
}

/// Rounds every money field to `to` digits while keeping it at `from`.
///
/// Sums of rounded values then rescale exactly, so a total always equals the
/// sum of the amounts displayed for its parts.
pub fn round_to_precision<T: MoneyFields>(value: &mut T, from: u32, to: u32) -> PricingResult<()> {
    value.visit_amounts(&mut |amount, _| {
        *amount = rescale_amount(rescale_amount(*amount, from, to)?, to, from)?;
        Ok(())
    })
}

/// Re-derives internal-precision integers from persisted decimal strings.
///
/// Fields without a decimal sibling are rescaled from `stored_precision`.
/// Decimal siblings are cleared; the final rescale rewrites them.
pub fn restore_from_decimals<T: MoneyFields>(
    value: &mut T,
    stored_precision: u32,
) -> PricingResult<()> {
    value.visit_amounts(&mut |amount, decimal| {
        *amount = match decimal.take() {
            Some(text) => Money::from_decimal_str(&text, DEFAULT_CURRENCY)?.amount(),
            None => rescale_amount(*amount, stored_precision, INTERNAL_PRECISION)?,
        };
        Ok(())
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
