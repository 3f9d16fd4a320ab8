//! # Error Types
//!
//! Error types for pricing-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  PricingError     - Money-primitive failures (fail fast)               │
//! │  ├── InvalidAmount   malformed decimal string                          │
//! │  ├── DivisionByZero  divide() with a zero divisor                      │
//! │  └── Overflow        result does not fit the decimal representation    │
//! │                                                                         │
//! │  ValidationError  - Catalog shape checks (recovered locally, never     │
//! │                     surfaced as a PricingError)                        │
//! │                                                                         │
//! │  NOT errors (degrade to zero amounts):                                 │
//! │  missing unit amount, tiers, tax, external fee, tariff config          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation
//! Arithmetic failures indicate corrupt data upstream and propagate with `?`
//! all the way to the caller. Validation failures are only ever produced by
//! the composite expander, which drops the offending component and logs it.

use thiserror::Error;

// =============================================================================
// Pricing Error
// =============================================================================

/// Errors raised at the money-primitive boundary.
#[derive(Debug, Error)]
pub enum PricingError {
    /// A decimal string or number could not be turned into an exact amount.
    ///
    /// ## When This Occurs
    /// - A catalog `unit_amount_decimal` like `"12,5"` or `"abc"`
    /// - An external fee decimal that is not a number
    /// - A quantity or mapping value beyond the decimal range
    #[error("Invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    /// Division by a zero scalar.
    #[error("Division by zero")]
    DivisionByZero,

    /// An intermediate result exceeded the decimal representation.
    ///
    /// ## When This Occurs
    /// - A quantity times a parent quantity or mapping value past ~7.9e28
    /// - A display precision whose scale does not fit an i128
    #[error("Arithmetic overflow during {operation}")]
    Overflow { operation: &'static str },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Catalog shape validation errors.
///
/// Raised when a price definition is structurally unusable for its pricing
/// model (e.g. a tiered price without tiers).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing.
    #[error("{field} is required")]
    Required { field: String },

    /// A list field is present but empty.
    #[error("{field} must not be empty")]
    Empty { field: String },

    /// Invalid format (e.g., a non-numeric decimal string).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with PricingError.
pub type PricingResult<T> = Result<T, PricingError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PricingError::InvalidAmount {
            value: "abc".to_string(),
            reason: "not a decimal".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid amount 'abc': not a decimal");
        assert_eq!(PricingError::DivisionByZero.to_string(), "Division by zero");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "unit_amount_decimal".to_string(),
        };
        assert_eq!(err.to_string(), "unit_amount_decimal is required");

        let err = ValidationError::Empty {
            field: "tiers".to_string(),
        };
        assert_eq!(err.to_string(), "tiers must not be empty");
    }

    #[test]
    fn test_overflow_message_names_operation() {
        let err = PricingError::Overflow {
            operation: "quantity multiply",
        };
        assert_eq!(err.to_string(), "Arithmetic overflow during quantity multiply");
    }
}
