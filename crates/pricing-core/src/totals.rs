//! # Aggregate Totals
//!
//! Reduces a list of line items into one [`PricingDetails`] tree.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for each PriceItemDto:                                                 │
//! │     _immutable_pricing_details?  ──► restore snapshot                   │
//! │     composite?                   ──► compute_composite_price_item       │
//! │     otherwise                    ──► compute_price_item                 │
//! │                                                                         │
//! │     approved or visible?         ──► Accumulator::add_item              │
//! │                                        ├── totals                       │
//! │                                        ├── tax buckets                  │
//! │                                        ├── recurrence buckets           │
//! │                                        ├── recurrence × tax buckets     │
//! │                                        └── cashback periods             │
//! │                                                                         │
//! │  Accumulator::finish  ──► sort buckets, after-cashback totals           │
//! │  convert_precision    ──► internal (12) → display precision             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Buckets are sorted on finish, so the order of the input items never
//! changes the breakdown.

use tracing::debug;

use crate::approval::is_price_item_approved;
use crate::breakdown::{
    Breakdown, PricingDetails, RecurrenceBreakdown, RecurrenceByTaxBreakdown, TaxBreakdown,
    TotalDetails,
};
use crate::cashback::{cashback_for_recurrence, merge_cashbacks};
use crate::composite::compute_composite_price_item;
use crate::config::PricingOptions;
use crate::details::CashbackEntry;
use crate::error::PricingResult;
use crate::item::{compute_price_item, PriceItem, PriceItemDto};
use crate::money::Money;
use crate::precision::{convert_precision, round_to_precision};
use crate::snapshot::restore_snapshot_item;
use crate::tax::{tax_key, TaxClass};
use crate::types::{BillingPeriod, RecurrenceType};
use crate::{DEFAULT_CURRENCY, INTERNAL_PRECISION};

// =============================================================================
// Accumulator
// =============================================================================

type RecurrenceKey = (RecurrenceType, Option<BillingPeriod>);

#[derive(Debug, Clone)]
struct RecurrenceBucket {
    breakdown: RecurrenceBreakdown,
    before_discount_total: i128,
    discount_total: i128,
    has_discount: bool,
}

/// Running totals of an aggregation, threaded through the fold by value.
#[derive(Debug, Clone)]
pub(crate) struct Accumulator {
    currency: String,
    amount_subtotal: i128,
    amount_total: i128,
    amount_tax: i128,
    taxes: Vec<(String, TaxBreakdown)>,
    recurrences: Vec<(RecurrenceKey, RecurrenceBucket)>,
    recurrences_by_tax: Vec<((RecurrenceKey, String), RecurrenceByTaxBreakdown)>,
    cashbacks: Vec<CashbackEntry>,
}

fn recurrence_key(line: &PriceItem) -> RecurrenceKey {
    (line.price_type, line.recurrence_period())
}

/// one_time first, then recurring by billing period.
fn recurrence_order(key: &RecurrenceKey) -> (u8, Option<BillingPeriod>) {
    match key.0 {
        RecurrenceType::OneTime => (0, None),
        RecurrenceType::Recurring => (1, key.1),
    }
}

/// Numeric periods ascending, so the immediate period "0" comes first.
fn cashback_order(entry: &CashbackEntry) -> (Option<u64>, String) {
    let period = entry.cashback_period.trim();
    (period.parse().ok(), period.to_string())
}

impl Accumulator {
    pub(crate) fn new(currency: &str) -> Self {
        Accumulator {
            currency: currency.to_string(),
            amount_subtotal: 0,
            amount_total: 0,
            amount_tax: 0,
            taxes: Vec::new(),
            recurrences: Vec::new(),
            recurrences_by_tax: Vec::new(),
            cashbacks: Vec::new(),
        }
    }

    /// Folds the amounts of one priced line (a simple item or a component).
    pub(crate) fn add_line(mut self, line: &PriceItem) -> Self {
        self.amount_subtotal += line.amount_subtotal;
        self.amount_total += line.amount_total;
        self.amount_tax += line.amount_tax;

        let tax = line.tax();
        let key = tax_key(tax);

        match self.taxes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, bucket)) => bucket.amount += line.amount_tax,
            None => self.taxes.push((
                key.clone(),
                TaxBreakdown {
                    tax: tax.cloned(),
                    rate: TaxClass::of(tax).label(),
                    amount: line.amount_tax,
                    amount_decimal: None,
                },
            )),
        }

        let recurrence = recurrence_key(line);
        let index = match self.recurrences.iter().position(|(k, _)| *k == recurrence) {
            Some(index) => index,
            None => {
                self.recurrences.push((
                    recurrence,
                    RecurrenceBucket {
                        breakdown: RecurrenceBreakdown {
                            recurrence_type: recurrence.0,
                            billing_period: recurrence.1,
                            ..Default::default()
                        },
                        before_discount_total: 0,
                        discount_total: 0,
                        has_discount: false,
                    },
                ));
                self.recurrences.len() - 1
            }
        };
        let bucket = &mut self.recurrences[index].1;
        bucket.breakdown.amount_subtotal += line.amount_subtotal;
        bucket.breakdown.amount_total += line.amount_total;
        bucket.breakdown.amount_tax += line.amount_tax;
        bucket.before_discount_total += line.before_discount_amount_total.unwrap_or(line.amount_total);
        bucket.discount_total += line.discount_amount.unwrap_or_default();
        bucket.has_discount |= line.has_discount();

        let by_tax_key = (recurrence, key);
        match self.recurrences_by_tax.iter_mut().find(|(k, _)| *k == by_tax_key) {
            Some((_, bucket)) => {
                bucket.amount_subtotal += line.amount_subtotal;
                bucket.amount_total += line.amount_total;
                bucket.amount_tax += line.amount_tax;
            }
            None => self.recurrences_by_tax.push((
                by_tax_key,
                RecurrenceByTaxBreakdown {
                    recurrence_type: recurrence.0,
                    billing_period: recurrence.1,
                    tax: tax.cloned(),
                    rate: TaxClass::of(tax).label(),
                    amount_subtotal: line.amount_subtotal,
                    amount_total: line.amount_total,
                    amount_tax: line.amount_tax,
                    ..Default::default()
                },
            )),
        }

        self
    }

    pub(crate) fn add_cashbacks(mut self, cashbacks: &[CashbackEntry]) -> Self {
        let existing = std::mem::take(&mut self.cashbacks);
        self.cashbacks = merge_cashbacks(existing.into_iter().chain(cashbacks.iter().cloned()));
        self
    }

    /// Folds a simple item, or every component of a composite item.
    pub(crate) fn add_item(self, item: &PriceItem) -> Self {
        let cashbacks = item.cashbacks.as_deref().unwrap_or_default();
        match item.item_components.as_deref() {
            Some(components) if item.is_composite() => components
                .iter()
                .fold(self, |acc, component| acc.add_line(component))
                .add_cashbacks(cashbacks),
            _ => self.add_line(item).add_cashbacks(cashbacks),
        }
    }

    /// Sorts the buckets and builds the details tree at internal precision.
    pub(crate) fn finish(self, items: Vec<PriceItem>) -> PricingResult<PricingDetails> {
        let mut cashbacks: Vec<CashbackEntry> = self
            .cashbacks
            .into_iter()
            .filter(|entry| entry.amount_total != 0)
            .collect();
        cashbacks.sort_by_key(cashback_order);

        let mut recurrences = self.recurrences;
        recurrences.sort_by_key(|(key, _)| recurrence_order(key));
        let recurrences = recurrences
            .into_iter()
            .map(|(key, bucket)| -> PricingResult<RecurrenceBreakdown> {
                let mut breakdown = bucket.breakdown;
                if bucket.has_discount {
                    breakdown.before_discount_amount_total = Some(bucket.before_discount_total);
                    breakdown.discount_amount = Some(bucket.discount_total);
                }
                if !cashbacks.is_empty() {
                    let mut after = breakdown.amount_total;
                    for entry in &cashbacks {
                        let amount =
                            Money::from_integer(entry.amount_total, &self.currency, INTERNAL_PRECISION);
                        after -= cashback_for_recurrence(&amount, &entry.cashback_period, key.1)?
                            .amount();
                    }
                    breakdown.after_cashback_amount_total = Some(after);
                }
                Ok(breakdown)
            })
            .collect::<PricingResult<Vec<_>>>()?;

        let mut taxes = self.taxes;
        taxes.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut recurrences_by_tax = self.recurrences_by_tax;
        recurrences_by_tax.sort_by(|((ra, ta), _), ((rb, tb), _)| {
            recurrence_order(ra)
                .cmp(&recurrence_order(rb))
                .then_with(|| ta.cmp(tb))
        });

        Ok(PricingDetails {
            amount_subtotal: self.amount_subtotal,
            amount_total: self.amount_total,
            amount_tax: self.amount_tax,
            currency: self.currency,
            items,
            total_details: TotalDetails {
                amount_shipping: 0,
                amount_tax: self.amount_tax,
                breakdown: Breakdown {
                    taxes: taxes.into_iter().map(|(_, bucket)| bucket).collect(),
                    recurrences,
                    recurrences_by_tax: recurrences_by_tax
                        .into_iter()
                        .map(|(_, bucket)| bucket)
                        .collect(),
                    cashbacks,
                },
                ..Default::default()
            },
            ..Default::default()
        })
    }
}

// =============================================================================
// Entry Point
// =============================================================================

fn compute_item(dto: &PriceItemDto, options: &PricingOptions) -> PricingResult<PriceItem> {
    if let Some(item) = restore_snapshot_item(dto, options.display_precision)? {
        return Ok(item);
    }
    if dto.is_composite() {
        compute_composite_price_item(dto, options)
    } else {
        compute_price_item(dto, options)
    }
}

/// Prices every line item and aggregates the totals.
///
/// Every amount in the result is at `options.display_precision` with its
/// decimal-string sibling filled. Items are rounded before they are summed,
/// so `amount_total` equals the sum of the displayed item totals. Items
/// awaiting approval are returned but left out of the totals.
///
/// ## Example
/// ```rust
/// use pricing_core::config::PricingOptions;
/// use pricing_core::item::PriceItemDto;
/// use pricing_core::totals::compute_aggregated_and_price_totals;
///
/// let item: PriceItemDto = serde_json::from_value(serde_json::json!({
///     "quantity": 2,
///     "_price": { "unit_amount": 1000, "unit_amount_decimal": "10.00" }
/// }))
/// .unwrap();
///
/// let details = compute_aggregated_and_price_totals(&[item], &PricingOptions::default()).unwrap();
/// assert_eq!(details.amount_total, 2000);
/// assert_eq!(details.amount_total_decimal.as_deref(), Some("20.00"));
/// ```
pub fn compute_aggregated_and_price_totals(
    line_items: &[PriceItemDto],
    options: &PricingOptions,
) -> PricingResult<PricingDetails> {
    let mut items = line_items
        .iter()
        .map(|dto| compute_item(dto, options))
        .collect::<PricingResult<Vec<_>>>()?;
    // totals are summed from the amounts as displayed
    round_to_precision(&mut items, INTERNAL_PRECISION, options.display_precision)?;

    let currency = items
        .first()
        .map(|item| item.currency.clone())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    let accumulator = items
        .iter()
        .filter(|item| is_price_item_approved(item))
        .fold(Accumulator::new(&currency), |acc, item| acc.add_item(item));

    let mut details = accumulator.finish(items)?;
    convert_precision(&mut details, INTERNAL_PRECISION, options.display_precision)?;

    debug!(
        items = details.items.len(),
        currency = %details.currency,
        amount_total = %details.amount_total_decimal.as_deref().unwrap_or_default(),
        "Computed aggregated price totals"
    );

    Ok(details)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;
    use serde_json::{json, Value};

    fn dto(value: Value) -> PriceItemDto {
        serde_json::from_value(value).unwrap()
    }

    fn options() -> PricingOptions {
        PricingOptions::default()
    }

    fn per_unit(id: &str, amount: &str, quantity: u32, recurrence: Value, rate: u32) -> PriceItemDto {
        let mut price = json!({
            "_id": id,
            "pricing_model": "per_unit",
            "unit_amount": 0,
            "unit_amount_decimal": amount,
            "unit_amount_currency": "EUR",
            "is_tax_inclusive": true
        });
        if let (Value::Object(price), Value::Object(extra)) = (&mut price, recurrence) {
            price.extend(extra);
        }
        dto(json!({
            "price_id": id,
            "quantity": quantity,
            "_price": price,
            "taxes": [{ "tax": { "_id": format!("vat{rate}"), "rate": rate } }]
        }))
    }

    fn monthly() -> Value {
        json!({ "type": "recurring", "billing_period": "monthly" })
    }

    fn one_time() -> Value {
        json!({})
    }

    #[test]
    fn test_single_item_fixture() {
        let details =
            compute_aggregated_and_price_totals(&[per_unit("p", "10.00", 1, one_time(), 19)], &options())
                .unwrap();

        assert_eq!(details.currency, "EUR");
        assert_eq!(details.amount_total, 1000);
        assert_eq!(details.amount_subtotal, 840);
        assert_eq!(details.amount_tax, 160);
        assert_eq!(details.amount_total_decimal.as_deref(), Some("10.00"));

        let item = &details.items[0];
        assert_eq!(item.unit_amount_net, 840);
        assert_eq!(item.unit_amount_net_decimal.as_deref(), Some("8.40"));
        assert_eq!(item.unit_amount_gross, 1000);

        let breakdown = &details.total_details.breakdown;
        assert_eq!(breakdown.taxes.len(), 1);
        assert_eq!(breakdown.taxes[0].rate, "19");
        assert_eq!(breakdown.taxes[0].amount, 160);
        assert_eq!(breakdown.recurrences[0].recurrence_type, RecurrenceType::OneTime);
        assert!(breakdown.cashbacks.is_empty());
    }

    #[test]
    fn test_exclusive_and_inclusive_symmetry() {
        let mut exclusive = per_unit("p", "10.00", 1, one_time(), 19);
        if let Some(price) = exclusive.price.as_mut() {
            price.is_tax_inclusive = false;
        }

        let details = compute_aggregated_and_price_totals(&[exclusive], &options()).unwrap();
        assert_eq!(details.items[0].unit_amount_net, 1000);
        assert_eq!(details.items[0].unit_amount_gross, 1190);
        assert_eq!(details.amount_total, 1190);
    }

    #[test]
    fn test_buckets_by_recurrence_and_tax() {
        let items = [
            per_unit("a", "10.00", 1, monthly(), 19),
            per_unit("b", "5.00", 2, one_time(), 7),
            per_unit("c", "20.00", 1, monthly(), 7),
        ];
        let details = compute_aggregated_and_price_totals(&items, &options()).unwrap();
        let breakdown = &details.total_details.breakdown;

        assert_eq!(details.amount_total, 4000);
        assert_eq!(breakdown.recurrences.len(), 2);
        assert_eq!(breakdown.recurrences[0].recurrence_type, RecurrenceType::OneTime);
        assert_eq!(breakdown.recurrences[0].amount_total, 1000);
        assert_eq!(breakdown.recurrences[1].billing_period, Some(BillingPeriod::Monthly));
        assert_eq!(breakdown.recurrences[1].amount_total, 3000);
        assert_eq!(breakdown.taxes.len(), 2);
        assert_eq!(breakdown.recurrences_by_tax.len(), 3);
    }

    #[test]
    fn test_order_independence() {
        let mut discounted = per_unit("d", "40.00", 1, monthly(), 19);
        discounted.coupons = Some(
            serde_json::from_value(json!([{ "type": "percentage", "percentage_value": 25 }])).unwrap(),
        );
        let items = vec![
            per_unit("a", "10.00", 1, monthly(), 19),
            per_unit("b", "5.00", 3, one_time(), 7),
            discounted,
            per_unit("c", "12.50", 2, json!({ "type": "recurring", "billing_period": "yearly" }), 19),
        ];
        let mut reversed = items.clone();
        reversed.reverse();

        let forward = compute_aggregated_and_price_totals(&items, &options()).unwrap();
        let backward = compute_aggregated_and_price_totals(&reversed, &options()).unwrap();

        assert_eq!(forward.total_details, backward.total_details);
        assert_eq!(forward.amount_total, backward.amount_total);
    }

    #[test]
    fn test_discount_is_tracked_per_recurrence() {
        let mut discounted = per_unit("d", "40.00", 1, monthly(), 19);
        discounted.coupons = Some(
            serde_json::from_value(json!([{ "type": "fixed", "fixed_value_decimal": "10.00" }])).unwrap(),
        );
        let items = [discounted, per_unit("a", "10.00", 1, monthly(), 19), per_unit("b", "5.00", 1, one_time(), 19)];

        let details = compute_aggregated_and_price_totals(&items, &options()).unwrap();
        let recurrences = &details.total_details.breakdown.recurrences;

        assert_eq!(recurrences[0].discount_amount, None);
        assert_eq!(recurrences[1].amount_total, 4000);
        assert_eq!(recurrences[1].before_discount_amount_total, Some(5000));
        assert_eq!(recurrences[1].discount_amount, Some(1000));
        assert_eq!(recurrences[1].discount_amount_decimal.as_deref(), Some("10.00"));
    }

    #[test]
    fn test_cashbacks_bucketed_and_subtracted() {
        let mut item = per_unit("a", "10.00", 1, monthly(), 19);
        item.coupons = Some(
            serde_json::from_value(json!([
                { "type": "fixed", "category": "cashback", "fixed_value_decimal": "120", "cashback_period": "12" },
                { "type": "fixed", "category": "cashback", "fixed_value_decimal": "0", "cashback_period": "0" }
            ]))
            .unwrap(),
        );

        let details = compute_aggregated_and_price_totals(&[item], &options()).unwrap();
        let breakdown = &details.total_details.breakdown;

        // zero cashbacks are suppressed
        assert_eq!(breakdown.cashbacks.len(), 1);
        assert_eq!(breakdown.cashbacks[0].cashback_period, "12");
        assert_eq!(breakdown.cashbacks[0].amount_total, 12000);
        // 120 a year is 10 a month
        assert_eq!(breakdown.recurrences[0].after_cashback_amount_total, Some(0));
        // cashbacks never change totals
        assert_eq!(details.amount_total, 1000);
    }

    #[test]
    fn test_unapproved_items_are_listed_but_not_totalled() {
        let mut on_request = per_unit("r", "99.00", 1, one_time(), 19);
        if let Some(price) = on_request.price.as_mut() {
            price.price_display_in_journeys = Some(crate::types::PriceDisplayMode::ShowAsOnRequest);
        }
        let items = [per_unit("a", "10.00", 1, one_time(), 19), on_request.clone()];

        let details = compute_aggregated_and_price_totals(&items, &options()).unwrap();
        assert_eq!(details.items.len(), 2);
        assert_eq!(details.amount_total, 1000);

        on_request.on_request_approved = Some(true);
        let items = [per_unit("a", "10.00", 1, one_time(), 19), on_request];
        let details = compute_aggregated_and_price_totals(&items, &options()).unwrap();
        assert_eq!(details.amount_total, 10900);
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let mut discounted = per_unit("d", "40.00", 1, monthly(), 19);
        discounted.coupons = Some(
            serde_json::from_value(json!([{ "type": "percentage", "percentage_value": "15" }])).unwrap(),
        );
        let mut cashback = per_unit("c", "10.00", 2, monthly(), 19);
        cashback.coupons = Some(
            serde_json::from_value(json!([
                { "type": "fixed", "category": "cashback", "fixed_value_decimal": "5", "cashback_period": "0" }
            ]))
            .unwrap(),
        );
        let composite = dto(json!({
            "quantity": 2,
            "_price": {
                "pricing_model": "composite",
                "price_components": [
                    { "_id": "x", "pricing_model": "per_unit", "unit_amount": 1, "unit_amount_decimal": "3.33",
                      "tax": { "_id": "vat19", "rate": 19 } },
                    { "_id": "y", "pricing_model": "tiered_graduated", "type": "recurring", "billing_period": "monthly",
                      "tiers": [{ "up_to": 1, "unit_amount_decimal": "2" }, { "up_to": null, "unit_amount_decimal": "1" }] }
                ]
            }
        }));
        let items = vec![per_unit("a", "10.00", 3, one_time(), 19), discounted, cashback, composite];

        let first = compute_aggregated_and_price_totals(&items, &options()).unwrap();
        let again: Vec<PriceItemDto> = first.items.iter().cloned().map(PriceItemDto::from).collect();
        let second = compute_aggregated_and_price_totals(&again, &options()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_immutable_snapshot_is_reused() {
        let first =
            compute_aggregated_and_price_totals(&[per_unit("a", "10.00", 1, monthly(), 19)], &options())
                .unwrap();

        // a changed catalog price must not affect an item priced from its snapshot
        let mut item = per_unit("a", "99.00", 1, monthly(), 19);
        item.immutable_pricing_details = Some(Box::new(first.clone()));

        let second = compute_aggregated_and_price_totals(&[item], &options()).unwrap();
        assert_eq!(second.amount_total, first.amount_total);
        assert_eq!(second.items[0].amount_total_decimal.as_deref(), Some("10.00"));
        assert_eq!(second.total_details, first.total_details);
    }

    #[test]
    fn test_display_precision_option() {
        let options = PricingOptions::default().with_display_precision(4);
        let details =
            compute_aggregated_and_price_totals(&[per_unit("p", "10.00", 1, one_time(), 19)], &options)
                .unwrap();
        assert_eq!(details.amount_subtotal, 84034);
        assert_eq!(details.amount_subtotal_decimal.as_deref(), Some("8.4034"));
    }

    #[test]
    fn test_totals_equal_sum_of_displayed_items() {
        let half_cent = |id: &str| {
            let mut item = per_unit(id, "0.005", 1, one_time(), 0);
            if let Some(price) = item.price.as_mut() {
                price.is_tax_inclusive = false;
            }
            item.taxes = None;
            item
        };
        let details =
            compute_aggregated_and_price_totals(&[half_cent("a"), half_cent("b")], &options()).unwrap();

        let items_total: i128 = details.items.iter().map(|item| item.amount_total).sum();
        assert_eq!(details.items[0].amount_total, 1);
        assert_eq!(items_total, 2);
        assert_eq!(details.amount_total, items_total);
        assert_eq!(details.amount_total_decimal.as_deref(), Some("0.02"));
        assert_eq!(details.total_details.breakdown.recurrences[0].amount_total, 2);
    }

    #[test]
    fn test_display_precision_beyond_i128_is_an_error() {
        let options = PricingOptions::default().with_display_precision(40);
        let result =
            compute_aggregated_and_price_totals(&[per_unit("p", "10.00", 1, one_time(), 19)], &options);
        assert!(matches!(result, Err(PricingError::Overflow { .. })));
    }

    #[test]
    fn test_external_fee_and_price_mappings_end_to_end() {
        let energy = dto(json!({
            "price_id": "energy",
            "quantity": 100,
            "_price": {
                "_id": "energy",
                "pricing_model": "dynamic_tariff",
                "type": "recurring",
                "billing_period": "monthly",
                "is_tax_inclusive": false,
                "dynamic_tariff": { "mode": "day_ahead_market", "markup_amount_decimal": "0.05" }
            },
            "external_fees_mappings": [{ "price_id": "energy", "amount_total_decimal": "0.20" }]
        }));
        let grid = dto(json!({
            "price_id": "grid",
            "quantity": 1,
            "_price": {
                "_id": "grid",
                "pricing_model": "tiered_volume",
                "type": "recurring",
                "billing_period": "monthly",
                "is_tax_inclusive": false,
                "tiers": [
                    { "up_to": 100, "unit_amount_decimal": "0.30" },
                    { "up_to": null, "unit_amount_decimal": "0.25" }
                ]
            },
            "price_mappings": [{ "price_id": "grid", "value": 400 }]
        }));

        let details = compute_aggregated_and_price_totals(&[energy, grid], &options()).unwrap();

        // 100 × (0.20 + 0.05) and 400 × 0.25
        assert_eq!(details.items[0].amount_total, 2500);
        assert_eq!(details.items[1].amount_total, 10000);
        assert_eq!(details.amount_total, 12500);
        assert_eq!(details.total_details.breakdown.recurrences.len(), 1);
    }

    #[test]
    fn test_composite_with_parent_mappings_end_to_end() {
        let composite = dto(json!({
            "price_id": "bundle",
            "quantity": 2,
            "_price": { "pricing_model": "composite", "is_composite_price": true },
            "external_fees_mappings": [{ "price_id": "energy", "amount_total_decimal": "0.20" }],
            "price_mappings": [{ "price_id": "grid", "value": 400 }],
            "item_components": [
                {
                    "price_id": "energy",
                    "quantity": 50,
                    "_price": {
                        "_id": "energy",
                        "pricing_model": "dynamic_tariff",
                        "is_tax_inclusive": false,
                        "dynamic_tariff": { "mode": "day_ahead_market", "markup_amount_decimal": "0.05" }
                    }
                },
                {
                    "price_id": "grid",
                    "_price": {
                        "_id": "grid",
                        "pricing_model": "tiered_volume",
                        "is_tax_inclusive": false,
                        "tiers": [
                            { "up_to": 100, "unit_amount_decimal": "0.30" },
                            { "up_to": null, "unit_amount_decimal": "0.25" }
                        ]
                    }
                }
            ]
        }));

        let details = compute_aggregated_and_price_totals(&[composite], &options()).unwrap();

        // energy: 50 × 2 × 0.25; grid: 400 × 0.25 × 2
        let components = details.items[0].item_components.as_ref().unwrap();
        assert_eq!(components[0].amount_total, 2500);
        assert_eq!(components[1].amount_total, 20000);
        assert_eq!(details.amount_total, 22500);
    }

    #[test]
    fn test_empty_input() {
        let details = compute_aggregated_and_price_totals(&[], &options()).unwrap();
        assert_eq!(details.currency, DEFAULT_CURRENCY);
        assert_eq!(details.amount_total, 0);
        assert_eq!(details.amount_total_decimal.as_deref(), Some("0.00"));
        assert!(details.items.is_empty());
    }
}
