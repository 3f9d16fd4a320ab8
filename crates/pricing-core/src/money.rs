//! # Money Module
//!
//! Provides the `Money` type: an exact fixed-point monetary value.
//!
//! ## Why Scaled Integers?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE CHAINED-DIVISION PROBLEM                                           │
//! │                                                                         │
//! │  Tax-inclusive €10.00 at 19%:                                           │
//! │    net = 10.00 / 1.19 = 8.40336134453781512605...                       │
//! │                                                                         │
//! │  Rounding to cents here (8.40) and multiplying by 1000 units            │
//! │  loses €3.36. Floats lose exactness on every literal.                   │
//! │                                                                         │
//! │  OUR SOLUTION: 12-digit scaled integers                                 │
//! │    8.403361344538 → 8_403_361_344_538 (precision 12)                    │
//! │    All intermediate math stays at precision 12 and is only             │
//! │    rescaled to display precision (2) at the very end.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pricing_core::money::Money;
//!
//! let price = Money::from_decimal_str("10.00", "EUR").unwrap();
//! assert_eq!(price.amount(), 10_000_000_000_000);
//!
//! let display = price.convert_precision(2).unwrap();
//! assert_eq!(display.amount(), 1000);
//! assert_eq!(display.to_decimal_string(), "10.00");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use crate::error::{PricingError, PricingResult};
use crate::INTERNAL_PRECISION;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value stored as an integer scaled by `10^precision`.
///
/// ## Design Decisions
/// - **i128**: 12 fractional digits leave ~26 integer digits of headroom
/// - **Precision travels with the value**: rescaling is explicit
/// - **No float constructor**: amounts enter as decimal strings or as
///   already-scaled integers, never as `f64`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Money {
    amount: i128,
    precision: u32,
    currency: String,
}

impl Money {
    /// Creates a Money value from a decimal string at internal precision.
    ///
    /// Parsing is exact: `"0.1"` is one tenth, not the nearest binary float.
    ///
    /// ## Example
    /// ```rust
    /// use pricing_core::money::Money;
    ///
    /// let m = Money::from_decimal_str("8.40", "EUR").unwrap();
    /// assert_eq!(m.to_decimal_string(), "8.400000000000");
    /// assert!(Money::from_decimal_str("8,40", "EUR").is_err());
    /// ```
    pub fn from_decimal_str(value: &str, currency: &str) -> PricingResult<Self> {
        Self::from_decimal_str_with_precision(value, currency, INTERNAL_PRECISION)
    }

    /// Creates a Money value from a decimal string at the given precision.
    pub fn from_decimal_str_with_precision(
        value: &str,
        currency: &str,
        precision: u32,
    ) -> PricingResult<Self> {
        let parsed = parse_decimal(value)?;
        Self::from_decimal(parsed, currency, precision)
    }

    /// Creates a Money value from a decimal, rounding half-up to `precision`.
    pub fn from_decimal(value: Decimal, currency: &str, precision: u32) -> PricingResult<Self> {
        let mut rounded =
            value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(precision);
        if rounded.scale() != precision {
            return Err(PricingError::Overflow {
                operation: "rescale",
            });
        }

        Ok(Money {
            amount: rounded.mantissa(),
            precision,
            currency: currency.to_string(),
        })
    }

    /// Creates a Money value from an already-scaled integer.
    ///
    /// ## Example
    /// ```rust
    /// use pricing_core::money::Money;
    ///
    /// // 1099 at precision 2 = 10.99
    /// let m = Money::from_integer(1099, "EUR", 2);
    /// assert_eq!(m.to_decimal_string(), "10.99");
    /// ```
    #[inline]
    pub fn from_integer(amount: i128, currency: &str, precision: u32) -> Self {
        Money {
            amount,
            precision,
            currency: currency.to_string(),
        }
    }

    /// Zero at internal precision.
    #[inline]
    pub fn zero(currency: &str) -> Self {
        Money::from_integer(0, currency, INTERNAL_PRECISION)
    }

    /// Returns the scaled integer amount.
    #[inline]
    pub const fn amount(&self) -> i128 {
        self.amount
    }

    /// Returns the number of fractional digits of the scaled amount.
    #[inline]
    pub const fn precision(&self) -> u32 {
        self.precision
    }

    /// Returns the currency code.
    #[inline]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.amount == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.amount < 0
    }

    /// Returns the exact decimal value.
    pub fn to_decimal(&self) -> PricingResult<Decimal> {
        Decimal::try_from_i128_with_scale(self.amount, self.precision).map_err(|_| {
            PricingError::Overflow {
                operation: "to_decimal",
            }
        })
    }

    /// Formats the amount with exactly `precision` fractional digits.
    ///
    /// Works on the integer directly, so it never fails.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.amount < 0 { "-" } else { "" };
        let digits = self.amount.unsigned_abs().to_string();
        let precision = self.precision as usize;

        if precision == 0 {
            return format!("{sign}{digits}");
        }

        let padded = format!("{:0>width$}", digits, width = precision + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - precision);
        format!("{sign}{int_part}.{frac_part}")
    }

    /// Multiplies by a decimal scalar, rounding half-up to this precision.
    ///
    /// ## Example
    /// ```rust
    /// use pricing_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let net = Money::from_decimal_str("10.00", "EUR").unwrap();
    /// let gross = net.multiply(Decimal::new(119, 2)).unwrap();
    /// assert_eq!(gross.to_decimal_string(), "11.900000000000");
    /// ```
    pub fn multiply(&self, factor: Decimal) -> PricingResult<Money> {
        let product = self
            .to_decimal()?
            .checked_mul(factor)
            .ok_or(PricingError::Overflow {
                operation: "multiply",
            })?;
        Money::from_decimal(product, &self.currency, self.precision)
    }

    /// Divides by a decimal scalar, rounding half-up to this precision.
    ///
    /// ## Errors
    /// `DivisionByZero` when `divisor` is zero.
    pub fn divide(&self, divisor: Decimal) -> PricingResult<Money> {
        if divisor.is_zero() {
            return Err(PricingError::DivisionByZero);
        }
        let quotient = self
            .to_decimal()?
            .checked_div(divisor)
            .ok_or(PricingError::Overflow {
                operation: "divide",
            })?;
        Money::from_decimal(quotient, &self.currency, self.precision)
    }

    /// Returns true when `self > other` (compared at a common precision).
    pub fn greater_than(&self, other: &Money) -> bool {
        self.cmp_amount(other) == Ordering::Greater
    }

    /// Returns the smaller of two values, at the precision of `self`.
    pub fn min(self, other: Money) -> PricingResult<Money> {
        if other.greater_than(&self) {
            Ok(self)
        } else {
            other.with_scale_of(&self)
        }
    }

    /// Floors the value at zero.
    pub fn floor_zero(self) -> Money {
        if self.is_negative() {
            Money::from_integer(0, &self.currency, self.precision)
        } else {
            self
        }
    }

    /// Rescales to `precision` fractional digits, rounding half-up.
    ///
    /// ## Rounding Rule
    /// ```text
    /// 8.403361344538 → 8.40      0.125 → 0.13      -0.125 → -0.13
    /// ```
    ///
    /// ## Errors
    /// `Overflow` when scaling up does not fit an i128.
    pub fn convert_precision(&self, precision: u32) -> PricingResult<Money> {
        Ok(Money {
            amount: rescale_amount(self.amount, self.precision, precision)?,
            precision,
            currency: self.currency.clone(),
        })
    }

    fn with_scale_of(self, reference: &Money) -> PricingResult<Money> {
        if self.precision == reference.precision {
            Ok(self)
        } else {
            self.convert_precision(reference.precision)
        }
    }

    fn cmp_amount(&self, other: &Money) -> Ordering {
        let precision = self.precision.max(other.precision);
        let lhs = saturating_rescale(self.amount, self.precision, precision);
        let rhs = saturating_rescale(other.amount, other.precision, precision);
        lhs.cmp(&rhs)
    }
}

// =============================================================================
// Scaled Integer Helpers
// =============================================================================

/// `10^exp`, or `None` past 10^38.
#[inline]
fn pow10(exp: u32) -> Option<i128> {
    10i128.checked_pow(exp)
}

/// Integer division rounding half away from zero.
fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.unsigned_abs() * 2 >= denominator.unsigned_abs() {
        quotient + numerator.signum() * denominator.signum()
    } else {
        quotient
    }
}

/// Moves a scaled integer from one precision to another.
///
/// Scaling up is exact; scaling down rounds half-up.
///
/// ## Errors
/// `Overflow` when scaling up does not fit an i128.
///
/// ## Example
/// ```rust
/// use pricing_core::money::rescale_amount;
///
/// assert_eq!(rescale_amount(8_403_361_344_538, 12, 2).unwrap(), 840);
/// assert_eq!(rescale_amount(840, 2, 12).unwrap(), 8_400_000_000_000);
/// assert!(rescale_amount(1, 2, 41).is_err());
/// ```
pub fn rescale_amount(amount: i128, from: u32, to: u32) -> PricingResult<i128> {
    match from.cmp(&to) {
        Ordering::Equal => Ok(amount),
        Ordering::Less if amount == 0 => Ok(0),
        Ordering::Less => pow10(to - from)
            .and_then(|factor| amount.checked_mul(factor))
            .ok_or(PricingError::Overflow {
                operation: "rescale",
            }),
        Ordering::Greater => Ok(match pow10(from - to) {
            Some(divisor) => div_round_half_up(amount, divisor),
            // every i128 is below half of 10^39
            None => 0,
        }),
    }
}

/// Rescale for comparisons and same-precision operators: an out-of-range
/// upscale pins to the i128 bound of the same sign.
fn saturating_rescale(amount: i128, from: u32, to: u32) -> i128 {
    rescale_amount(amount, from, to).unwrap_or(if amount < 0 { i128::MIN } else { i128::MAX })
}

/// Parses an exact decimal string.
pub fn parse_decimal(value: &str) -> PricingResult<Decimal> {
    Decimal::from_str(value.trim()).map_err(|e| PricingError::InvalidAmount {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display: `10.00 EUR`. Localized formatting belongs to the
/// presentation layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_decimal_string(), self.currency)
    }
}

impl Add<&Money> for &Money {
    type Output = Money;

    fn add(self, other: &Money) -> Money {
        debug_assert_eq!(self.precision, other.precision);
        Money {
            amount: self.amount + saturating_rescale(other.amount, other.precision, self.precision),
            precision: self.precision,
            currency: self.currency.clone(),
        }
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        &self + &other
    }
}

impl AddAssign<&Money> for Money {
    fn add_assign(&mut self, other: &Money) {
        debug_assert_eq!(self.precision, other.precision);
        self.amount += saturating_rescale(other.amount, other.precision, self.precision);
    }
}

impl Sub<&Money> for &Money {
    type Output = Money;

    fn sub(self, other: &Money) -> Money {
        debug_assert_eq!(self.precision, other.precision);
        Money {
            amount: self.amount - saturating_rescale(other.amount, other.precision, self.precision),
            precision: self.precision,
            currency: self.currency.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn eur(value: &str) -> Money {
        Money::from_decimal_str(value, "EUR").unwrap()
    }

    #[test]
    fn test_from_decimal_str_is_exact() {
        let money = eur("0.1");
        assert_eq!(money.amount(), 100_000_000_000);
        assert_eq!(money.precision(), 12);

        let money = eur("  12.5 ");
        assert_eq!(money.to_decimal_string(), "12.500000000000");
    }

    #[test]
    fn test_from_decimal_str_rejects_garbage() {
        let err = Money::from_decimal_str("12,5", "EUR").unwrap_err();
        assert!(matches!(err, PricingError::InvalidAmount { .. }));
        assert!(Money::from_decimal_str("", "EUR").is_err());
    }

    #[test]
    fn test_from_integer() {
        let money = Money::from_integer(1099, "EUR", 2);
        assert_eq!(money.amount(), 1099);
        assert_eq!(money.to_decimal_string(), "10.99");
        assert_eq!(Money::from_integer(-5, "EUR", 2).to_decimal_string(), "-0.05");
        assert_eq!(Money::from_integer(7, "EUR", 0).to_decimal_string(), "7");
    }

    #[test]
    fn test_arithmetic() {
        let a = eur("10.00");
        let b = eur("2.50");

        assert_eq!((&a + &b).to_decimal_string(), "12.500000000000");
        assert_eq!((&a - &b).to_decimal_string(), "7.500000000000");

        let mut acc = Money::zero("EUR");
        acc += &a;
        acc += &b;
        assert_eq!(acc, eur("12.5"));
    }

    #[test]
    fn test_divide_tax_inclusive_net() {
        let gross = eur("10.00");
        let net = gross.divide(Decimal::new(119, 2)).unwrap();
        assert_eq!(net.amount(), 8_403_361_344_538);

        let tax = &gross - &net;
        assert_eq!(tax.amount(), 1_596_638_655_462);
    }

    #[test]
    fn test_divide_by_zero_fails() {
        let err = eur("1").divide(Decimal::ZERO).unwrap_err();
        assert!(matches!(err, PricingError::DivisionByZero));
    }

    #[test]
    fn test_multiply_rounds_half_up() {
        let money = Money::from_integer(5, "EUR", 2); // 0.05
        let half = money.multiply(Decimal::new(5, 1)).unwrap(); // 0.025
        assert_eq!(half.amount(), 3);
    }

    /// Pins the rescale rule: half-up (midpoint away from zero).
    #[test]
    fn test_convert_precision_half_up() {
        assert_eq!(eur("8.403361344538").convert_precision(2).unwrap().amount(), 840);
        assert_eq!(eur("1.596638655462").convert_precision(2).unwrap().amount(), 160);
        assert_eq!(eur("0.125").convert_precision(2).unwrap().amount(), 13);
        assert_eq!(eur("0.135").convert_precision(2).unwrap().amount(), 14);
        assert_eq!(eur("-0.125").convert_precision(2).unwrap().amount(), -13);
        assert_eq!(eur("0.124999").convert_precision(2).unwrap().amount(), 12);
    }

    #[test]
    fn test_convert_precision_round_trip() {
        let display = eur("11.90").convert_precision(2).unwrap();
        let back = display.convert_precision(12).unwrap();
        assert_eq!(back, eur("11.90"));
    }

    #[test]
    fn test_convert_precision_overflow_is_an_error() {
        let total = eur("11.90");
        assert!(matches!(
            total.convert_precision(40),
            Err(PricingError::Overflow { .. })
        ));
        assert_eq!(rescale_amount(0, 12, 60).unwrap(), 0);
        assert_eq!(rescale_amount(i128::MAX, 60, 2).unwrap(), 0);
    }

    #[test]
    fn test_greater_than_and_min() {
        let ten = eur("10");
        let five = eur("5");
        assert!(ten.greater_than(&five));
        assert!(!five.greater_than(&ten));
        assert!(!ten.greater_than(&ten.clone()));
        assert_eq!(ten.clone().min(five.clone()).unwrap(), five);
        assert_eq!(five.clone().min(ten).unwrap(), five);
    }

    #[test]
    fn test_floor_zero() {
        let negative = &eur("1") - &eur("3");
        assert!(negative.is_negative());
        assert!(negative.floor_zero().is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_integer(1190, "EUR", 2).to_string(), "11.90 EUR");
    }
}
