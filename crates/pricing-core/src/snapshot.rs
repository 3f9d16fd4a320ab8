//! # Entity Snapshots
//!
//! Embedded entity snapshots drop internal keys before they are stored on a
//! computed item, and previously computed pricing snapshots are restored for
//! reuse instead of recomputation.

use serde_json::Value;
use tracing::debug;

use crate::error::PricingResult;
use crate::item::{PriceItem, PriceItemDto};
use crate::precision::restore_from_decimals;

/// Keys that are internal to the entity store and volatile between reads.
const VOLATILE_KEYS: [&str; 8] = [
    "_org",
    "_owners",
    "_acl",
    "_created_at",
    "_updated_at",
    "_updated_by",
    "_created_by",
    "_relations",
];

/// Removes internal and volatile keys from an entity snapshot.
///
/// Non-object values are returned unchanged.
pub fn strip_entity(mut entity: Value) -> Value {
    if let Value::Object(map) = &mut entity {
        for key in VOLATILE_KEYS {
            map.remove(key);
        }
    }
    entity
}

/// Restores the line item stored in `_immutable_pricing_details`.
///
/// The snapshot's first item is re-derived into internal-precision integers
/// from its decimal strings (falling back to `display_precision` for fields
/// without one). Returns `None` when the item carries no usable snapshot.
pub fn restore_snapshot_item(
    dto: &PriceItemDto,
    display_precision: u32,
) -> PricingResult<Option<PriceItem>> {
    let Some(snapshot) = dto.immutable_pricing_details.as_deref() else {
        return Ok(None);
    };
    let Some(stored) = snapshot.items.first() else {
        return Ok(None);
    };

    let mut item = stored.clone();
    restore_from_decimals(&mut item, display_precision)?;
    item.immutable_pricing_details = dto.immutable_pricing_details.clone();

    debug!(
        price_id = ?item.price_id,
        amount_total = item.amount_total,
        "Reusing immutable pricing snapshot"
    );

    Ok(Some(item))
}
