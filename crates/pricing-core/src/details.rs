//! # Line-Item Detail Shapes
//!
//! Nested objects a computed line item may carry: per-tier amounts, the
//! dynamic tariff and GetAG sub-breakdowns, and per-period cashbacks.
//!
//! All money fields are scaled integers with a `*_decimal` sibling that is
//! only filled by the final precision pass.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::amounts::AmountBreakdown;
use crate::error::PricingResult;
use crate::money::Money;
use crate::precision::{AmountVisitor, MoneyFields};
use crate::types::{
    DynamicTariffMode, GetAgCategory, GetAgType, MarkupPricingModel, TariffType,
};

// =============================================================================
// Tier Details
// =============================================================================

/// Amounts of one tier that participated in pricing a line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierDetail {
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,

    /// The tier's own configured amount (unit amount or flat fee).
    pub unit_amount: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount_decimal: Option<String>,

    pub unit_amount_net: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount_net_decimal: Option<String>,

    pub unit_amount_gross: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount_gross_decimal: Option<String>,

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

impl TierDetail {
    pub fn new(quantity: Decimal, unit_amount: &Money, amounts: &AmountBreakdown) -> Self {
        TierDetail {
            quantity,
            unit_amount: unit_amount.amount(),
            unit_amount_net: amounts.unit_amount_net.amount(),
            unit_amount_gross: amounts.unit_amount_gross.amount(),
            amount_subtotal: amounts.amount_subtotal.amount(),
            amount_total: amounts.amount_total.amount(),
            amount_tax: amounts.amount_tax.amount(),
            ..Default::default()
        }
    }
}

impl MoneyFields for TierDetail {
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()> {
        visit(&mut self.unit_amount, &mut self.unit_amount_decimal)?;
        visit(&mut self.unit_amount_net, &mut self.unit_amount_net_decimal)?;
        visit(&mut self.unit_amount_gross, &mut self.unit_amount_gross_decimal)?;
        visit(&mut self.amount_subtotal, &mut self.amount_subtotal_decimal)?;
        visit(&mut self.amount_total, &mut self.amount_total_decimal)?;
        visit(&mut self.amount_tax, &mut self.amount_tax_decimal)
    }
}

// =============================================================================
// Dynamic Tariff
// =============================================================================

/// Market price and markup parts of a dynamic tariff unit price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicTariffDetails {
    pub mode: DynamicTariffMode,

    /// Market part of the unit price.
    pub unit_amount_net: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount_net_decimal: Option<String>,

    pub unit_amount_gross: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount_gross_decimal: Option<String>,

    pub markup_amount_net: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup_amount_net_decimal: Option<String>,

    pub markup_amount_gross: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup_amount_gross_decimal: Option<String>,
}

impl MoneyFields for DynamicTariffDetails {
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()> {
        visit(&mut self.unit_amount_net, &mut self.unit_amount_net_decimal)?;
        visit(&mut self.unit_amount_gross, &mut self.unit_amount_gross_decimal)?;
        visit(&mut self.markup_amount_net, &mut self.markup_amount_net_decimal)?;
        visit(&mut self.markup_amount_gross, &mut self.markup_amount_gross_decimal)
    }
}

// =============================================================================
// GetAG
// =============================================================================

/// External fee and markup parts of a GetAG unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetAgDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<GetAgCategory>,

    #[serde(rename = "type")]
    pub fee_type: GetAgType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tariff_type: Option<TariffType>,

    pub markup_pricing_model: MarkupPricingModel,

    /// The external fee as supplied, normalized to the billing period.
    pub amount_total: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_total_decimal: Option<String>,

    /// Fee part of the unit price.
    pub unit_amount_net: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount_net_decimal: Option<String>,

    pub unit_amount_gross: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount_gross_decimal: Option<String>,

    pub markup_amount_net: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup_amount_net_decimal: Option<String>,

    pub markup_amount_gross: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup_amount_gross_decimal: Option<String>,
}

impl MoneyFields for GetAgDetails {
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()> {
        visit(&mut self.amount_total, &mut self.amount_total_decimal)?;
        visit(&mut self.unit_amount_net, &mut self.unit_amount_net_decimal)?;
        visit(&mut self.unit_amount_gross, &mut self.unit_amount_gross_decimal)?;
        visit(&mut self.markup_amount_net, &mut self.markup_amount_net_decimal)?;
        visit(&mut self.markup_amount_gross, &mut self.markup_amount_gross_decimal)
    }
}

// =============================================================================
// Cashback
// =============================================================================

/// Cashback owed for one cashback period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashbackEntry {
    pub cashback_period: String,

    pub amount_total: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_total_decimal: Option<String>,
}

impl CashbackEntry {
    pub fn new(cashback_period: &str, amount: &Money) -> Self {
        CashbackEntry {
            cashback_period: cashback_period.to_string(),
            amount_total: amount.amount(),
            amount_total_decimal: None,
        }
    }
}

impl MoneyFields for CashbackEntry {
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()> {
        visit(&mut self.amount_total, &mut self.amount_total_decimal)
    }
}
