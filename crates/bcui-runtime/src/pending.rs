#![forbid(unsafe_code)]

//! Pending change reducers.
//!
//! An overlay holds the unsaved edits of one (BC, cursor). Edits are shallow
//! merges: only the named keys change. Overlays are reset to empty maps on
//! save and cancel, never removed, so readers must tolerate an empty overlay.
//!
//! # Required-field recompute
//!
//! After a merge, only the fields named in the delta are re-validated
//! against the row metadata at the BC's current path key. A required field
//! that was not part of the delta keeps whatever violation state it had.

use bcui_core::{PendingDataItem, is_empty_value};
use tracing::{debug, warn};

use crate::effect::Effect;
use crate::state::ViewState;

/// Merge `delta` into the overlay of (`bc_name`, `cursor`) and re-validate
/// the touched fields.
///
/// Returns a [`Effect::FetchForcedRowMeta`] when a touched field is
/// `forceActive` and its new value has not been handled yet.
pub fn apply_edit(
    state: &mut ViewState,
    bc_name: &str,
    cursor: &str,
    delta: PendingDataItem,
    required_message: &str,
) -> Vec<Effect> {
    let touched: Vec<String> = delta.keys().cloned().collect();
    state.pending_mut(bc_name, cursor).extend(delta);

    let bc_url = state.bcs.build_url(bc_name, true);
    let row_meta = bc_url
        .as_deref()
        .and_then(|url| state.row_meta_at(bc_name, url))
        .cloned();

    let overlay = state.pending_mut(bc_name, cursor).clone();
    for key in &touched {
        let required = row_meta.as_ref().is_some_and(|meta| meta.is_required(key));
        if required && is_empty_value(overlay.get(key)) {
            debug!(
                target: "bcui.pending",
                bc = %bc_name,
                cursor = %cursor,
                field = %key,
                "required field emptied"
            );
            state
                .pending_validation_fails
                .record(bc_name, cursor, key, required_message);
        } else {
            state.pending_validation_fails.clear_field(bc_name, cursor, key);
        }
    }

    match (bc_url, row_meta) {
        (Some(bc_url), Some(_)) if needs_forced_refresh(state, bc_name, cursor, &touched) => {
            vec![Effect::FetchForcedRowMeta {
                bc_name: bc_name.to_string(),
                bc_url,
                cursor: cursor.to_string(),
                pending: overlay,
            }]
        }
        _ => Vec::new(),
    }
}

/// Merge `items[i]` into the overlay of `cursors[i]`, pairwise.
///
/// No validation is recomputed. Unpaired trailing entries are ignored.
pub fn apply_bulk_edit(
    state: &mut ViewState,
    bc_name: &str,
    cursors: Vec<String>,
    items: Vec<PendingDataItem>,
) {
    if cursors.len() != items.len() {
        warn!(
            target: "bcui.pending",
            bc = %bc_name,
            cursors = cursors.len(),
            items = items.len(),
            "bulk edit arrays differ in length; extra entries ignored"
        );
    }
    for (cursor, item) in cursors.into_iter().zip(items) {
        state.pending_mut(bc_name, &cursor).extend(item);
    }
}

/// Whether any of `fields` is `forceActive` at the BC's current path key and
/// its pending value differs from the handled ledger.
#[must_use]
pub fn needs_forced_refresh(
    state: &ViewState,
    bc_name: &str,
    cursor: &str,
    fields: &[String],
) -> bool {
    let Some(bc_url) = state.bcs.build_url(bc_name, true) else {
        return false;
    };
    let Some(row_meta) = state.row_meta_at(bc_name, &bc_url) else {
        return false;
    };
    let overlay = state.pending(bc_name, cursor);
    let handled = state
        .handled_force_active
        .get(bc_name)
        .and_then(|by_cursor| by_cursor.get(cursor));
    fields.iter().any(|key| {
        row_meta.is_force_active(key)
            && overlay.and_then(|o| o.get(key)) != handled.and_then(|h| h.get(key))
    })
}

/// Reset the overlay and the handled ledger of one record to empty maps.
pub fn reset_record(state: &mut ViewState, bc_name: &str, cursor: &str) {
    state.pending_mut(bc_name, cursor).clear();
    state
        .handled_force_active
        .entry(bc_name.to_string())
        .or_default()
        .insert(cursor.to_string(), PendingDataItem::new());
}

/// Reset every overlay of the given BCs (all BCs when `None`) and drop their
/// ledger and validation fails.
pub fn cancel_pending_changes(state: &mut ViewState, bc_names: Option<&[String]>) {
    let targets: Vec<String> = match bc_names {
        Some(names) => names.to_vec(),
        None => state.pending_data_changes.keys().cloned().collect(),
    };
    for bc_name in &targets {
        if let Some(by_cursor) = state.pending_data_changes.get_mut(bc_name) {
            for overlay in by_cursor.values_mut() {
                overlay.clear();
            }
        }
        state.handled_force_active.remove(bc_name);
        state.pending_validation_fails.clear_bc(bc_name);
    }
    if bc_names.is_none() {
        state.handled_force_active.clear();
        state.pending_validation_fails.clear_all();
    }
}
