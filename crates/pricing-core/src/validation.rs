//! Shape checks for composite component prices.
//!
//! A component that fails these checks is dropped from its composite rather
//! than failing the whole computation.

use crate::error::{ValidationError, ValidationResult};
use crate::money::parse_decimal;
use crate::types::{Price, PricingModel};

/// Validates that a component price carries what its pricing model needs.
///
/// - per_unit: a numeric `unit_amount` and a parseable `unit_amount_decimal`
/// - tiered models: a non-empty `tiers` list
pub fn validate_component_price(price: &Price) -> ValidationResult<()> {
    match price.pricing_model {
        PricingModel::PerUnit => {
            if price.unit_amount.is_none() {
                return Err(ValidationError::Required {
                    field: "unit_amount".to_string(),
                });
            }
            let decimal = price
                .unit_amount_decimal
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ValidationError::Required {
                    field: "unit_amount_decimal".to_string(),
                })?;
            parse_decimal(decimal).map_err(|e| ValidationError::InvalidFormat {
                field: "unit_amount_decimal".to_string(),
                reason: e.to_string(),
            })?;
            Ok(())
        }
        model if model.is_tiered() => {
            if price.tiers().is_empty() {
                return Err(ValidationError::Empty {
                    field: "tiers".to_string(),
                });
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
