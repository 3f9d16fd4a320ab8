//! # Line Items
//!
//! The input DTO, the computed line item, and single line-item computation.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PriceItemDto                                                           │
//! │       │                                                                 │
//! │       ├──► resolve tax          taxes[0].tax, else _price.tax           │
//! │       ├──► compute quantities   safe quantity × parent quantity         │
//! │       ├──► compute_model        dispatch on pricing_model               │
//! │       ├──► apply_discount       first discount coupon, if any           │
//! │       └──► compute_cashbacks    every cashback coupon                   │
//! │       ▼                                                                 │
//! │  PriceItem (internal precision; rescaled by the totals engine)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::amounts::PricingContext;
use crate::breakdown::{PricingDetails, TotalDetails};
use crate::calculators::{compute_model, ModelOutput};
use crate::cashback::compute_cashbacks;
use crate::config::PricingOptions;
use crate::coupon::{select_coupons, Coupon};
use crate::details::{CashbackEntry, DynamicTariffDetails, GetAgDetails, TierDetail};
use crate::discount::{apply_discount, DiscountFields};
use crate::error::PricingResult;
use crate::precision::{visit_optional, AmountVisitor, MoneyFields};
use crate::quantity::{checked_product, compute_quantities, find_for_price, safe_quantity};
use crate::snapshot::strip_entity;
use crate::tax::{get_tax_value, resolve_tax, Tax, TaxEntry};
use crate::types::{
    lenient, BillingPeriod, ExternalFeeMapping, Price, PriceDisplayMode, PriceMapping,
    PricingModel, RecurrenceType,
};

// =============================================================================
// Input DTO
// =============================================================================

/// A request to price one catalog price at a quantity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceItemDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::f64_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<f64>,

    #[serde(rename = "_price", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,

    #[serde(rename = "_product", default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Value>,

    #[serde(rename = "_coupons", default, skip_serializing_if = "Option::is_none")]
    pub coupons: Option<Vec<Coupon>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_mappings: Option<Vec<PriceMapping>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_fees_mappings: Option<Vec<ExternalFeeMapping>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxes: Option<Vec<TaxEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_composite_price: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_components: Option<Vec<PriceItemDto>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_request_approved: Option<bool>,

    /// A previously computed result to reuse instead of recomputing.
    #[serde(
        rename = "_immutable_pricing_details",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub immutable_pricing_details: Option<Box<PricingDetails>>,
}

impl PriceItemDto {
    pub fn is_composite(&self) -> bool {
        self.is_composite_price == Some(true)
            || self.price.as_ref().is_some_and(Price::is_composite)
    }
}

// =============================================================================
// Computed Line Item
// =============================================================================

/// A fully computed line item; composites carry their computed components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::f64_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<f64>,

    #[serde(rename = "_price", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,

    #[serde(rename = "_product", default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Value>,

    #[serde(rename = "_coupons", default, skip_serializing_if = "Option::is_none")]
    pub coupons: Option<Vec<Coupon>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_mappings: Option<Vec<PriceMapping>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_fees_mappings: Option<Vec<ExternalFeeMapping>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxes: Option<Vec<TaxEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_composite_price: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_request_approved: Option<bool>,

    #[serde(
        rename = "_immutable_pricing_details",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub immutable_pricing_details: Option<Box<PricingDetails>>,

    // -------------------------------------------------------------------------
    // Price metadata
    // -------------------------------------------------------------------------
    pub currency: String,

    #[serde(default)]
    pub pricing_model: PricingModel,

    #[serde(default)]
    pub is_tax_inclusive: bool,

    #[serde(rename = "type", default)]
    pub price_type: RecurrenceType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_period: Option<BillingPeriod>,

    /// Effective display mode, after tier overrides.
    #[serde(default)]
    pub price_display_in_journeys: PriceDisplayMode,

    // -------------------------------------------------------------------------
    // Amounts
    // -------------------------------------------------------------------------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount: Option<i128>,
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

    // -------------------------------------------------------------------------
    // Discount
    // -------------------------------------------------------------------------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_discount_unit_amount: Option<i128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_discount_unit_amount_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_discount_unit_amount_gross: Option<i128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_discount_unit_amount_gross_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_discount_unit_amount_net: Option<i128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_discount_unit_amount_net_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_discount_tax_amount: Option<i128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_discount_tax_amount_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_discount_amount_total: Option<i128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_discount_amount_total_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<i128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount_net: Option<i128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount_net_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_discount_amount: Option<i128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_discount_amount_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_discount_amount: Option<i128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_discount_amount_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_discount_amount_net: Option<i128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_discount_amount_net_decimal: Option<String>,

    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discount_percentage: Option<Decimal>,

    // -------------------------------------------------------------------------
    // Cashback
    // -------------------------------------------------------------------------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashback_amount: Option<i128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashback_amount_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashback_period: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashbacks: Option<Vec<CashbackEntry>>,

    // -------------------------------------------------------------------------
    // Model details
    // -------------------------------------------------------------------------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiers_details: Option<Vec<TierDetail>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_tariff: Option<DynamicTariffDetails>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_ag: Option<GetAgDetails>,

    // -------------------------------------------------------------------------
    // Composite
    // -------------------------------------------------------------------------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_components: Option<Vec<PriceItem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_details: Option<TotalDetails>,
}

impl PriceItem {
    /// An item with the DTO's inputs and the price's metadata, no amounts yet.
    pub(crate) fn from_input(dto: &PriceItemDto, price: &Price) -> Self {
        PriceItem {
            price_id: dto.price_id.clone().or_else(|| price.id.clone()),
            product_id: dto.product_id.clone(),
            description: dto.description.clone().or_else(|| price.description.clone()),
            quantity: dto.quantity,
            price: dto.price.clone(),
            product: dto.product.clone().map(strip_entity),
            coupons: dto.coupons.clone(),
            price_mappings: dto.price_mappings.clone(),
            external_fees_mappings: dto.external_fees_mappings.clone(),
            taxes: dto.taxes.clone(),
            is_composite_price: dto.is_composite_price,
            on_request_approved: dto.on_request_approved,
            immutable_pricing_details: dto.immutable_pricing_details.clone(),
            currency: price.currency().to_string(),
            pricing_model: price.pricing_model,
            is_tax_inclusive: price.is_tax_inclusive,
            price_type: price.price_type,
            billing_period: price.billing_period,
            price_display_in_journeys: price.display_mode(),
            ..Default::default()
        }
    }

    /// The tax this item was priced with.
    pub fn tax(&self) -> Option<&Tax> {
        self.taxes
            .as_deref()
            .and_then(|entries| entries.first())
            .and_then(|entry| entry.tax.as_ref())
    }

    /// The recurrence billing period; `None` for one-time items.
    pub fn recurrence_period(&self) -> Option<BillingPeriod> {
        match self.price_type {
            RecurrenceType::OneTime => None,
            RecurrenceType::Recurring => self.billing_period,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.is_composite_price == Some(true) || self.pricing_model == PricingModel::Composite
    }

    pub fn has_discount(&self) -> bool {
        self.discount_amount.is_some()
    }

    fn apply_model_output(&mut self, output: ModelOutput) {
        self.unit_amount = Some(output.unit_amount.amount());
        self.unit_amount_net = output.amounts.unit_amount_net.amount();
        self.unit_amount_gross = output.amounts.unit_amount_gross.amount();
        self.amount_subtotal = output.amounts.amount_subtotal.amount();
        self.amount_total = output.amounts.amount_total.amount();
        self.amount_tax = output.amounts.amount_tax.amount();
        self.tiers_details = output.tiers_details;
        self.dynamic_tariff = output.dynamic_tariff;
        self.get_ag = output.get_ag;
        if let Some(mode) = output.forced_display_mode {
            self.price_display_in_journeys = mode;
        }
    }

    fn apply_discount_fields(&mut self, fields: DiscountFields) {
        self.before_discount_unit_amount = Some(fields.before_discount_unit_amount.amount());
        self.before_discount_unit_amount_gross =
            Some(fields.before_discount_unit_amount_gross.amount());
        self.before_discount_unit_amount_net = Some(fields.before_discount_unit_amount_net.amount());
        self.before_discount_tax_amount = Some(fields.before_discount_tax_amount.amount());
        self.before_discount_amount_total = Some(fields.before_discount_amount_total.amount());
        self.discount_amount = Some(fields.discount_amount.amount());
        self.discount_amount_net = Some(fields.discount_amount_net.amount());
        self.tax_discount_amount = Some(fields.tax_discount_amount.amount());
        self.unit_discount_amount = Some(fields.unit_discount_amount.amount());
        self.unit_discount_amount_net = Some(fields.unit_discount_amount_net.amount());
        self.discount_percentage = fields.discount_percentage;
    }

    /// Attaches cashback entries; the first one is mirrored on the item.
    pub(crate) fn set_cashbacks(&mut self, cashbacks: Vec<CashbackEntry>) {
        if let Some(first) = cashbacks.first() {
            self.cashback_amount = Some(first.amount_total);
            self.cashback_period = Some(first.cashback_period.clone());
            self.cashbacks = Some(cashbacks);
        }
    }
}

impl MoneyFields for PriceItem {
    fn visit_amounts(&mut self, visit: &mut AmountVisitor<'_>) -> PricingResult<()> {
        visit_optional(&mut self.unit_amount, &mut self.unit_amount_decimal, visit)?;
        visit(&mut self.unit_amount_net, &mut self.unit_amount_net_decimal)?;
        visit(&mut self.unit_amount_gross, &mut self.unit_amount_gross_decimal)?;
        visit(&mut self.amount_subtotal, &mut self.amount_subtotal_decimal)?;
        visit(&mut self.amount_total, &mut self.amount_total_decimal)?;
        visit(&mut self.amount_tax, &mut self.amount_tax_decimal)?;

        visit_optional(
            &mut self.before_discount_unit_amount,
            &mut self.before_discount_unit_amount_decimal,
            visit,
        )?;
        visit_optional(
            &mut self.before_discount_unit_amount_gross,
            &mut self.before_discount_unit_amount_gross_decimal,
            visit,
        )?;
        visit_optional(
            &mut self.before_discount_unit_amount_net,
            &mut self.before_discount_unit_amount_net_decimal,
            visit,
        )?;
        visit_optional(
            &mut self.before_discount_tax_amount,
            &mut self.before_discount_tax_amount_decimal,
            visit,
        )?;
        visit_optional(
            &mut self.before_discount_amount_total,
            &mut self.before_discount_amount_total_decimal,
            visit,
        )?;
        visit_optional(&mut self.discount_amount, &mut self.discount_amount_decimal, visit)?;
        visit_optional(
            &mut self.discount_amount_net,
            &mut self.discount_amount_net_decimal,
            visit,
        )?;
        visit_optional(
            &mut self.tax_discount_amount,
            &mut self.tax_discount_amount_decimal,
            visit,
        )?;
        visit_optional(
            &mut self.unit_discount_amount,
            &mut self.unit_discount_amount_decimal,
            visit,
        )?;
        visit_optional(
            &mut self.unit_discount_amount_net,
            &mut self.unit_discount_amount_net_decimal,
            visit,
        )?;
        visit_optional(&mut self.cashback_amount, &mut self.cashback_amount_decimal, visit)?;

        self.cashbacks.visit_amounts(visit)?;
        self.taxes.visit_amounts(visit)?;
        self.tiers_details.visit_amounts(visit)?;
        self.dynamic_tariff.visit_amounts(visit)?;
        self.get_ag.visit_amounts(visit)?;
        self.item_components.visit_amounts(visit)?;
        self.total_details.visit_amounts(visit)
    }
}

/// Turns a computed item back into an input, for idempotent recomputation.
impl From<PriceItem> for PriceItemDto {
    fn from(item: PriceItem) -> Self {
        PriceItemDto {
            price_id: item.price_id,
            product_id: item.product_id,
            description: item.description,
            quantity: item.quantity,
            price: item.price,
            product: item.product,
            coupons: item.coupons,
            price_mappings: item.price_mappings,
            external_fees_mappings: item.external_fees_mappings,
            taxes: item.taxes,
            is_composite_price: item.is_composite_price,
            item_components: item
                .item_components
                .map(|components| components.into_iter().map(PriceItemDto::from).collect()),
            on_request_approved: item.on_request_approved,
            immutable_pricing_details: item.immutable_pricing_details,
        }
    }
}

// =============================================================================
// Computation
// =============================================================================

/// Computes one simple line item at internal precision.
pub fn compute_price_item(dto: &PriceItemDto, options: &PricingOptions) -> PricingResult<PriceItem> {
    compute_line_item(dto, options, Decimal::ONE)
}

/// Computes one line item whose quantity is multiplied by `quantity_factor`
/// (the parent quantity for composite components).
///
/// The returned item keeps the DTO's own quantity.
pub(crate) fn compute_line_item(
    dto: &PriceItemDto,
    options: &PricingOptions,
    quantity_factor: Decimal,
) -> PricingResult<PriceItem> {
    let price = dto.price.clone().unwrap_or_default();
    let tax = resolve_tax(dto.taxes.as_deref(), &price);
    let ctx = PricingContext::new(
        price.currency(),
        get_tax_value(tax.as_ref()),
        price.is_tax_inclusive,
    );

    let quantity = checked_product(safe_quantity(dto.quantity)?, quantity_factor)?;
    let quantities = compute_quantities(&price, quantity, dto.price_mappings.as_deref())?;
    let external_fee = find_for_price(dto.external_fees_mappings.as_deref(), &price, |m| {
        m.price_id.as_deref()
    });
    let base = compute_model(&price, &quantities, &ctx, external_fee)?;

    let coupons = select_coupons(dto.coupons.as_deref(), &options.redeemed_promos);
    let (output, discount) = match &coupons.discount {
        Some(coupon) => {
            let (discounted, fields) = apply_discount(&base, coupon, &ctx)?;
            (discounted, Some(fields))
        }
        None => (base, None),
    };
    let cashbacks = compute_cashbacks(&coupons.cashbacks, &output.amounts.amount_total, quantity)?;

    let mut item = PriceItem::from_input(dto, &price);
    item.apply_model_output(output);
    if let Some(fields) = discount {
        item.apply_discount_fields(fields);
    }
    item.set_cashbacks(cashbacks);
    item.taxes = tax.map(|tax| {
        vec![TaxEntry {
            tax: Some(tax),
            amount: Some(item.amount_tax),
            amount_decimal: None,
        }]
    });

    Ok(item)
}

// =============================================================================
// Unit Tests
// =============================================================================
