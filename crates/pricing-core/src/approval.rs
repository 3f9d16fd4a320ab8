//! # Approval Gate
//!
//! Items shown "on request" or "starting at" hide their real price until
//! someone approves it. Classification is a pure function of the input data
//! and is re-evaluated on every computation.
//!
//! ```text
//! ┌──────────────┐   display mode on_request /   ┌──────────────────┐
//! │   Visible    │   starting_price              │ RequiresApproval │
//! │ (show_price) │ ◄──────────────────────────── │                  │
//! └──────────────┘                               └────────┬─────────┘
//!                                                         │ on_request_approved
//!                                                         ▼
//!                                                ┌──────────────────┐
//!                                                │     Approved     │
//!                                                └──────────────────┘
//! ```
//!
//! Only `Visible` and `Approved` items contribute to aggregate totals.

use crate::item::PriceItem;
use crate::types::PriceDisplayMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    Visible,
    RequiresApproval,
    Approved,
}

impl ApprovalState {
    pub fn contributes_to_totals(&self) -> bool {
        !matches!(self, ApprovalState::RequiresApproval)
    }
}

/// Returns true for display modes that hide the real price.
pub fn requires_approval(mode: PriceDisplayMode) -> bool {
    matches!(
        mode,
        PriceDisplayMode::ShowAsOnRequest | PriceDisplayMode::ShowAsStartingPrice
    )
}

pub fn approval_state(mode: PriceDisplayMode, on_request_approved: Option<bool>) -> ApprovalState {
    if !requires_approval(mode) {
        ApprovalState::Visible
    } else if on_request_approved == Some(true) {
        ApprovalState::Approved
    } else {
        ApprovalState::RequiresApproval
    }
}

fn own_state(item: &PriceItem) -> ApprovalState {
    approval_state(item.price_display_in_journeys, item.on_request_approved)
}

fn components(item: &PriceItem) -> &[PriceItem] {
    item.item_components.as_deref().unwrap_or_default()
}

/// Returns true when any component of a composite hides its price.
pub fn has_hidden_components(item: &PriceItem) -> bool {
    components(item)
        .iter()
        .any(|c| requires_approval(c.price_display_in_journeys))
}

/// Classifies a simple or composite item.
///
/// Once any component requires approval, the composite's own flag governs
/// the whole composite and component flags are ignored.
pub fn price_item_state(item: &PriceItem) -> ApprovalState {
    if has_hidden_components(item) {
        if item.on_request_approved == Some(true) {
            ApprovalState::Approved
        } else {
            ApprovalState::RequiresApproval
        }
    } else {
        own_state(item)
    }
}

pub fn is_price_item_approved(item: &PriceItem) -> bool {
    price_item_state(item).contributes_to_totals()
}

/// Whether the unit amount of `item` may be shown, given its composite
/// parent when there is one.
pub fn is_unit_amount_approved(item: &PriceItem, parent: Option<&PriceItem>) -> bool {
    match parent {
        Some(parent) => {
            let parent_visible =
                !has_hidden_components(parent) && !requires_approval(parent.price_display_in_journeys);
            parent_visible || parent.on_request_approved == Some(true)
        }
        None => own_state(item).contributes_to_totals(),
    }
}
