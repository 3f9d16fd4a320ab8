//! # Catalog Types
//!
//! The immutable catalog definitions a line item is priced against.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog Types                                   │
//! │                                                                         │
//! │  ┌─────────────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │       Price         │   │      Tier       │   │  PricingModel   │   │
//! │  │  ─────────────────  │   │  ─────────────  │   │  ─────────────  │   │
//! │  │  pricing_model      │──►│  up_to          │   │  per_unit       │   │
//! │  │  unit_amount_decimal│   │  unit_amount_*  │   │  tiered_*       │   │
//! │  │  tiers[]            │   │  flat_fee_*     │   │  dynamic_tariff │   │
//! │  │  price_components[] │   │  display_mode   │   │  external_getag │   │
//! │  │  dynamic_tariff     │   └─────────────────┘   │  composite      │   │
//! │  │  get_ag             │                         └─────────────────┘   │
//! │  └─────────────────────┘                                               │
//! │                                                                         │
//! │  PriceMapping / ExternalFeeMapping: per-call inputs keyed by price_id  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every type here mirrors the JSON wire shape. Fields the engine never reads
//! are dropped on deserialization, which is also what keeps `_price`
//! snapshots free of volatile catalog metadata.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::tax::Tax;
use crate::DEFAULT_CURRENCY;

// =============================================================================
// Enums
// =============================================================================

/// How a price turns a quantity into an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    #[default]
    PerUnit,
    TieredVolume,
    TieredGraduated,
    TieredFlatfee,
    DynamicTariff,
    ExternalGetag,
    Composite,
}

impl PricingModel {
    /// Returns true for the three tier-driven models.
    pub fn is_tiered(&self) -> bool {
        matches!(
            self,
            PricingModel::TieredVolume | PricingModel::TieredGraduated | PricingModel::TieredFlatfee
        )
    }
}

/// How a price is shown in journeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PriceDisplayMode {
    #[default]
    ShowPrice,
    ShowAsStartingPrice,
    ShowAsOnRequest,
}

/// Per-tier display override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TierDisplayMode {
    Hidden,
    OnRequest,
}

/// One-time or recurring charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceType {
    #[default]
    OneTime,
    Recurring,
}

/// Billing interval of a recurring price, also used as a frequency unit.
///
/// Variants are declared shortest interval first; the derived `Ord` is the
/// order recurrence buckets are sorted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum BillingPeriod {
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "every_quarter")]
    EveryQuarter,
    #[serde(rename = "every_6_months")]
    EverySixMonths,
    #[serde(rename = "yearly")]
    Yearly,
}

impl BillingPeriod {
    /// How many of this period fit in one year.
    pub const fn yearly_factor(&self) -> i64 {
        match self {
            BillingPeriod::Weekly => 52,
            BillingPeriod::Monthly => 12,
            BillingPeriod::EveryQuarter => 4,
            BillingPeriod::EverySixMonths => 2,
            BillingPeriod::Yearly => 1,
        }
    }
}

// =============================================================================
// Tier
// =============================================================================

/// A quantity band with its own per-unit or flat-fee rate.
///
/// `up_to: None` marks the unbounded last tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_to: Option<f64>,

    /// Legacy integer amount in cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_fee_amount: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_fee_amount_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<TierDisplayMode>,
}

impl Tier {
    /// Returns true when this tier hides its price pending a request.
    pub fn is_on_request(&self) -> bool {
        self.display_mode == Some(TierDisplayMode::OnRequest)
    }
}

// =============================================================================
// Dynamic Tariff / GetAG Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicTariffMode {
    Manual,
    #[default]
    DayAheadMarket,
}

/// Catalog configuration of a market-driven price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicTariffConfig {
    #[serde(default)]
    pub mode: DynamicTariffMode,

    /// Fixed average price used in manual mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_price_decimal: Option<String>,

    /// Markup added on top of the market price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup_amount_decimal: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GetAgCategory {
    Power,
    Gas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GetAgType {
    BasePrice,
    WorkPrice,
}

/// High tariff / low tariff time band of a work price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TariffType {
    #[default]
    #[serde(rename = "HT")]
    Ht,
    #[serde(rename = "NT")]
    Nt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupPricingModel {
    #[default]
    PerUnit,
    TieredVolume,
    TieredFlatfee,
}

/// Catalog configuration of an external GetAG (grid fee) price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetAgConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<GetAgCategory>,

    #[serde(rename = "type")]
    pub fee_type: GetAgType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tariff_type: Option<TariffType>,

    #[serde(default)]
    pub markup_pricing_model: MarkupPricingModel,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup_amount_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup_tiers: Option<Vec<Tier>>,
}

// =============================================================================
// Price
// =============================================================================

/// An immutable catalog price definition.
///
/// `Default` matches deserializing `{}`: prices are tax-inclusive unless
/// they say otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub pricing_model: PricingModel,

    /// Legacy integer amount in cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount_decimal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount_currency: Option<String>,

    #[serde(default = "default_tax_inclusive")]
    pub is_tax_inclusive: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiers: Option<Vec<Tier>>,

    #[serde(rename = "type", default)]
    pub price_type: RecurrenceType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_period: Option<BillingPeriod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_display_in_journeys: Option<PriceDisplayMode>,

    /// Legacy embedded tax, used when the line item carries no `taxes`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Tax>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_composite_price: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_components: Option<Vec<Price>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_tariff: Option<DynamicTariffConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_ag: Option<GetAgConfig>,
}

fn default_tax_inclusive() -> bool {
    true
}

impl Default for Price {
    fn default() -> Self {
        Price {
            id: None,
            pricing_model: PricingModel::default(),
            unit_amount: None,
            unit_amount_decimal: None,
            unit_amount_currency: None,
            is_tax_inclusive: default_tax_inclusive(),
            tiers: None,
            price_type: RecurrenceType::default(),
            billing_period: None,
            price_display_in_journeys: None,
            tax: None,
            description: None,
            is_composite_price: None,
            price_components: None,
            dynamic_tariff: None,
            get_ag: None,
        }
    }
}

impl Price {
    pub fn currency(&self) -> &str {
        self.unit_amount_currency
            .as_deref()
            .unwrap_or(DEFAULT_CURRENCY)
    }

    pub fn display_mode(&self) -> PriceDisplayMode {
        self.price_display_in_journeys.unwrap_or_default()
    }

    pub fn is_composite(&self) -> bool {
        self.pricing_model == PricingModel::Composite || self.is_composite_price == Some(true)
    }

    pub fn tiers(&self) -> &[Tier] {
        self.tiers.as_deref().unwrap_or_default()
    }

    /// The billing period that keys recurrence buckets. One-time prices have none.
    pub fn recurrence_period(&self) -> Option<BillingPeriod> {
        match self.price_type {
            RecurrenceType::OneTime => None,
            RecurrenceType::Recurring => self.billing_period,
        }
    }
}

// =============================================================================
// Per-Call Mappings
// =============================================================================

/// A user-supplied value (e.g. yearly consumption) for one price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_unit: Option<BillingPeriod>,

    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub value: Option<f64>,
}

/// An externally computed fee (market price, grid fee) for one price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalFeeMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_unit: Option<BillingPeriod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_total: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_total_decimal: Option<String>,
}

// =============================================================================
// Lenient Deserializers
// =============================================================================

/// Deserializers for numeric fields that arrive as numbers or numeric strings.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Number or numeric string; anything else becomes `None`.
    pub fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite()))
    }

    /// Number or string, kept as its decimal text.
    pub fn decimal_string_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::String(s)) => Some(s),
            _ => None,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_price_defaults() {
        let price: Price = serde_json::from_value(json!({})).unwrap();
        assert_eq!(price.pricing_model, PricingModel::PerUnit);
        assert!(price.is_tax_inclusive);
        assert_eq!(price.price_type, RecurrenceType::OneTime);
        assert_eq!(price.currency(), "EUR");
        assert_eq!(price.display_mode(), PriceDisplayMode::ShowPrice);
        assert!(price.tiers().is_empty());
    }

    #[test]
    fn test_price_default_matches_empty_json() {
        let from_json: Price = serde_json::from_value(json!({})).unwrap();
        assert_eq!(Price::default(), from_json);
        assert!(Price::default().is_tax_inclusive);
    }

    #[test]
    fn test_price_wire_names() {
        let price: Price = serde_json::from_value(json!({
            "_id": "price-1",
            "pricing_model": "tiered_flatfee",
            "type": "recurring",
            "billing_period": "every_6_months",
            "price_display_in_journeys": "show_as_on_request",
            "_org": "ignored",
            "tiers": [{ "up_to": 10, "flat_fee_amount_decimal": "5", "display_mode": "on_request" }]
        }))
        .unwrap();

        assert_eq!(price.id.as_deref(), Some("price-1"));
        assert_eq!(price.pricing_model, PricingModel::TieredFlatfee);
        assert_eq!(price.recurrence_period(), Some(BillingPeriod::EverySixMonths));
        assert!(price.tiers()[0].is_on_request());
    }

    #[test]
    fn test_one_time_price_has_no_recurrence_period() {
        let price: Price =
            serde_json::from_value(json!({ "type": "one_time", "billing_period": "monthly" }))
                .unwrap();
        assert_eq!(price.recurrence_period(), None);
    }

    #[test]
    fn test_composite_detection() {
        let by_model: Price = serde_json::from_value(json!({ "pricing_model": "composite" })).unwrap();
        let by_flag: Price = serde_json::from_value(json!({ "is_composite_price": true })).unwrap();
        assert!(by_model.is_composite());
        assert!(by_flag.is_composite());
        assert!(!Price::default().is_composite());
    }

    #[test]
    fn test_billing_period_order() {
        assert!(BillingPeriod::Weekly < BillingPeriod::Monthly);
        assert!(BillingPeriod::EverySixMonths < BillingPeriod::Yearly);
        assert_eq!(BillingPeriod::EveryQuarter.yearly_factor(), 4);
    }

    #[test]
    fn test_price_mapping_lenient_value() {
        let mapping: PriceMapping =
            serde_json::from_value(json!({ "price_id": "p", "value": "1200" })).unwrap();
        assert_eq!(mapping.value, Some(1200.0));

        let mapping: PriceMapping =
            serde_json::from_value(json!({ "price_id": "p", "value": "lots" })).unwrap();
        assert_eq!(mapping.value, None);
    }

    #[test]
    fn test_get_ag_config_wire_names() {
        let config: GetAgConfig = serde_json::from_value(json!({
            "category": "power",
            "type": "work_price",
            "tariff_type": "NT",
            "markup_pricing_model": "tiered_volume"
        }))
        .unwrap();
        assert_eq!(config.fee_type, GetAgType::WorkPrice);
        assert_eq!(config.tariff_type, Some(TariffType::Nt));
        assert_eq!(config.markup_pricing_model, MarkupPricingModel::TieredVolume);
    }
}
