//! # Pricing Options
//!
//! Per-call configuration of an aggregation run. Nothing here is read from
//! the environment or from files: every call carries its own options.

use serde::{Deserialize, Serialize};

use crate::coupon::RedeemedPromo;
use crate::DISPLAY_PRECISION;

/// Options for [`crate::totals::compute_aggregated_and_price_totals`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingOptions {
    /// Promo codes the customer redeemed; unlocks `requires_promo_code` coupons.
    #[serde(default, rename = "redeemedPromos", alias = "redeemed_promos")]
    pub redeemed_promos: Vec<RedeemedPromo>,

    /// Fractional digits of every amount in the returned tree.
    #[serde(default = "default_display_precision")]
    pub display_precision: u32,
}

fn default_display_precision() -> u32 {
    DISPLAY_PRECISION
}

impl Default for PricingOptions {
    fn default() -> Self {
        PricingOptions {
            redeemed_promos: Vec::new(),
            display_precision: default_display_precision(),
        }
    }
}

impl PricingOptions {
    pub fn with_redeemed_promos(mut self, redeemed_promos: Vec<RedeemedPromo>) -> Self {
        self.redeemed_promos = redeemed_promos;
        self
    }

    pub fn with_display_precision(mut self, display_precision: u32) -> Self {
        self.display_precision = display_precision;
        self
    }
}
