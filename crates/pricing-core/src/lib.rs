//! # pricing-core: Pure Pricing Computation Engine
//!
//! Turns catalog price definitions, quantities, taxes and coupons into
//! line-item amounts and aggregate totals. Every entry point is a pure
//! function with zero I/O.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          pricing-core                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  totals   compute_aggregated_and_price_totals                   │   │
//! │  │           snapshot reuse ──► composite / item ──► Accumulator   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │  composite ──► item ──► calculators ──► discount / cashback     │   │
//! │  │                         per_unit, tiered, dynamic_tariff, getag │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │  amounts  │  │   tiers   │  │ precision │  │   │
//! │  │   │  Money    │  │ net/gross │  │ selection │  │ rescaling │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO GLOBAL STATE • PURE FUNCTIONS                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Exact decimal money at a fixed precision
//! - [`types`] - Catalog price definitions and per-call mappings
//! - [`item`] - Line-item DTOs and single line-item computation
//! - [`composite`] - Composite (bundle) prices
//! - [`totals`] - Aggregate totals and breakdowns
//! - [`precision`] - Internal-to-display precision rescaling
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output; safe to call from any thread
//! 2. **Exact Money**: amounts are scaled integers, never binary floats
//! 3. **Graceful Degradation**: missing business data prices as zero
//! 4. **Explicit Errors**: only corrupt decimals, division by zero and
//!    overflow return `Err`
//!
//! ## Example Usage
//!
//! ```rust
//! use pricing_core::{compute_aggregated_and_price_totals, PriceItemDto, PricingOptions};
//!
//! let item: PriceItemDto = serde_json::from_value(serde_json::json!({
//!     "price_id": "price-1",
//!     "quantity": 1,
//!     "_price": {
//!         "pricing_model": "per_unit",
//!         "unit_amount": 1000,
//!         "unit_amount_decimal": "10.00",
//!         "is_tax_inclusive": true
//!     },
//!     "taxes": [{ "tax": { "_id": "vat", "rate": 19 } }]
//! }))
//! .unwrap();
//!
//! let details = compute_aggregated_and_price_totals(&[item], &PricingOptions::default()).unwrap();
//! assert_eq!(details.amount_total_decimal.as_deref(), Some("10.00"));
//! assert_eq!(details.amount_subtotal_decimal.as_deref(), Some("8.40"));
//! assert_eq!(details.amount_tax_decimal.as_deref(), Some("1.60"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod amounts;
pub mod approval;
pub mod breakdown;
pub mod calculators;
pub mod cashback;
pub mod composite;
pub mod config;
pub mod coupon;
pub mod details;
pub mod discount;
pub mod error;
pub mod item;
pub mod money;
pub mod precision;
pub mod quantity;
pub mod snapshot;
pub mod tax;
pub mod tiers;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use approval::is_price_item_approved;
pub use breakdown::PricingDetails;
pub use calculators::getag::extract_get_ag_config;
pub use composite::compute_composite_price_item;
pub use config::PricingOptions;
pub use coupon::{Coupon, RedeemedPromo};
pub use error::{PricingError, PricingResult, ValidationError};
pub use item::{compute_price_item, PriceItem, PriceItemDto};
pub use money::Money;
pub use totals::compute_aggregated_and_price_totals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fractional digits every amount is computed at.
///
/// ## Why 12?
/// Net amounts derived from tax-inclusive prices (`10.00 / 1.19`) do not
/// terminate. Twelve digits keep per-unit rounding far below a cent even
/// after multiplying by large consumption quantities.
pub const INTERNAL_PRECISION: u32 = 12;

/// Fractional digits of the returned tree unless the caller asks otherwise.
pub const DISPLAY_PRECISION: u32 = 2;

/// Currency of prices that do not name one.
pub const DEFAULT_CURRENCY: &str = "EUR";
