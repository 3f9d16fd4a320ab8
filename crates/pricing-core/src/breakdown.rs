//! # Pricing Details
//!
//! The aggregate output tree and its breakdown buckets.
//!
//! ## Shape
//! ```text
//! PricingDetails
//! ├── amount_subtotal / amount_total / amount_tax
//! ├── currency
//! ├── items[]                       computed PriceItems (composites nest)
//! └── total_details
//!     ├── amount_shipping / amount_tax
//!     └── breakdown
//!         ├── taxes[]               by tax identity
//!         ├── recurrences[]         by (type, billing_period)
//!         ├── recurrencesByTax[]    by (type, billing_period, tax)
//!         └── cashbacks[]           by cashback period
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::details::CashbackEntry;
use crate::error::PricingResult;
use crate::item::PriceItem;
use crate::precision::{visit_optional, AmountVisitor, MoneyFields};
use crate::tax::Tax;
use crate::types::{BillingPeriod, RecurrenceType};

// =============================================================================
// Breakdown Buckets
// =============================================================================

/// Tax amount of all items sharing one tax.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Tax>,

    /// The percentage, or `nontaxable` / `rateless`.
    pub rate: String,

    pub amount: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_decimal: Option<String>,
}

impl MoneyFields for TaxBreakdown {
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()> {
        visit(&mut self.amount, &mut self.amount_decimal)
    }
}

/// Totals of all items billed on one recurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecurrenceBreakdown {
    #[serde(rename = "type")]
    pub recurrence_type: RecurrenceType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_period: Option<BillingPeriod>,

    pub amount_subtotal: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_subtotal_decimal: Option<String>,

    pub amount_total: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_total_decimal: Option<String>,

    pub amount_tax: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_tax_decimal: Option<String>,

    /// Set once any item of this recurrence carries a discount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_discount_amount_total: Option<i128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_discount_amount_total_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<i128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount_decimal: Option<String>,

    /// Set when any cashback exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_cashback_amount_total: Option<i128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_cashback_amount_total_decimal: Option<String>,
}

impl MoneyFields for RecurrenceBreakdown {
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()> {
        visit(&mut self.amount_subtotal, &mut self.amount_subtotal_decimal)?;
        visit(&mut self.amount_total, &mut self.amount_total_decimal)?;
        visit(&mut self.amount_tax, &mut self.amount_tax_decimal)?;
        visit_optional(
            &mut self.before_discount_amount_total,
            &mut self.before_discount_amount_total_decimal,
            visit,
        )?;
        visit_optional(&mut self.discount_amount, &mut self.discount_amount_decimal, visit)?;
        visit_optional(
            &mut self.after_cashback_amount_total,
            &mut self.after_cashback_amount_total_decimal,
            visit,
        )
    }
}

/// Totals of one recurrence restricted to one tax.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecurrenceByTaxBreakdown {
    #[serde(rename = "type")]
    pub recurrence_type: RecurrenceType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_period: Option<BillingPeriod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Tax>,

    pub rate: String,

    pub amount_subtotal: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_subtotal_decimal: Option<String>,

    pub amount_total: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_total_decimal: Option<String>,

    pub amount_tax: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_tax_decimal: Option<String>,
}

impl MoneyFields for RecurrenceByTaxBreakdown {
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()> {
        visit(&mut self.amount_subtotal, &mut self.amount_subtotal_decimal)?;
        visit(&mut self.amount_total, &mut self.amount_total_decimal)?;
        visit(&mut self.amount_tax, &mut self.amount_tax_decimal)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Breakdown {
    #[serde(default)]
    pub taxes: Vec<TaxBreakdown>,

    #[serde(default)]
    pub recurrences: Vec<RecurrenceBreakdown>,

    #[serde(default, rename = "recurrencesByTax")]
    pub recurrences_by_tax: Vec<RecurrenceByTaxBreakdown>,

    #[serde(default)]
    pub cashbacks: Vec<CashbackEntry>,
}

impl MoneyFields for Breakdown {
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()> {
        self.taxes.visit_amounts(visit)?;
        self.recurrences.visit_amounts(visit)?;
        self.recurrences_by_tax.visit_amounts(visit)?;
        self.cashbacks.visit_amounts(visit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TotalDetails {
    pub amount_shipping: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_shipping_decimal: Option<String>,

    pub amount_tax: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_tax_decimal: Option<String>,

    #[serde(default)]
    pub breakdown: Breakdown,
}

impl MoneyFields for TotalDetails {
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()> {
        visit(&mut self.amount_shipping, &mut self.amount_shipping_decimal)?;
        visit(&mut self.amount_tax, &mut self.amount_tax_decimal)?;
        self.breakdown.visit_amounts(visit)
    }
}

// =============================================================================
// Pricing Details
// =============================================================================

/// Aggregated totals over a list of line items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingDetails {
    pub amount_subtotal: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_subtotal_decimal: Option<String>,

    pub amount_total: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_total_decimal: Option<String>,

    pub amount_tax: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_tax_decimal: Option<String>,

    pub currency: String,

    #[serde(default)]
    pub items: Vec<PriceItem>,

    #[serde(default)]
    pub total_details: TotalDetails,
}

impl MoneyFields for PricingDetails {
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()> {
        visit(&mut self.amount_subtotal, &mut self.amount_subtotal_decimal)?;
        visit(&mut self.amount_total, &mut self.amount_total_decimal)?;
        visit(&mut self.amount_tax, &mut self.amount_tax_decimal)?;
        self.items.visit_amounts(visit)?;
        self.total_details.visit_amounts(visit)
    }
}
