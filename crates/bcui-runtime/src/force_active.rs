#![forbid(unsafe_code)]

//! Reconciliation of server-forced values with local edits.
//!
//! When a `forceActive` field changes, row metadata is refetched with the
//! pending overlay and the server answers with authoritative
//! `currentValue`s. [`reconcile_forced_values`] folds them into the overlay:
//!
//! 1. Forced values come from fields that carry a `currentValue`, including
//!    an explicit `null`. Fields without the key force nothing.
//! 2. The front-end view is the record data overlaid by the pending overlay.
//! 3. Every key of that view whose forced value differs becomes a diff.
//! 4. The diff is merged over the old overlay; keys outside it are kept.
//! 5. `forceActive` keys present in the new overlay are written to the
//!    handled ledger, so the same value does not request another refetch.
//! 6. The metadata is cached at its path key, replacing any previous entry.
//!
//! A forced value equal to the user's edit produces no diff.

use bcui_core::{PendingDataItem, RowMeta};
use tracing::debug;

use crate::state::ViewState;

/// Fold the forced values of `row_meta` into the overlay of
/// (`bc_name`, `cursor`) and cache `row_meta` at `bc_url`.
///
/// Returns the keys whose pending value was overwritten.
pub fn reconcile_forced_values(
    state: &mut ViewState,
    bc_name: &str,
    bc_url: &str,
    cursor: &str,
    current_record_data: &PendingDataItem,
    row_meta: RowMeta,
) -> Vec<String> {
    let forced = row_meta.forced_values();
    let force_active_keys: Vec<String> = row_meta
        .force_active_keys()
        .into_iter()
        .map(str::to_string)
        .collect();

    let previous = state.pending(bc_name, cursor).cloned().unwrap_or_default();
    let mut consolidated = current_record_data.clone();
    consolidated.extend(previous.clone());

    let diff: PendingDataItem = consolidated
        .iter()
        .filter_map(|(key, front_value)| {
            forced
                .get(key)
                .filter(|forced_value| *forced_value != front_value)
                .map(|forced_value| (key.clone(), forced_value.clone()))
        })
        .collect();
    let changed: Vec<String> = diff.keys().cloned().collect();

    let mut next = previous;
    next.extend(diff);

    let ledger = state
        .handled_force_active
        .entry(bc_name.to_string())
        .or_default()
        .entry(cursor.to_string())
        .or_default();
    for key in &force_active_keys {
        if let Some(value) = next.get(key) {
            ledger.insert(key.clone(), value.clone());
        }
    }

    debug!(
        target: "bcui.force_active",
        bc = %bc_name,
        cursor = %cursor,
        bc_url = %bc_url,
        overridden = changed.len(),
        "forced values reconciled"
    );

    *state.pending_mut(bc_name, cursor) = next;
    state
        .row_meta
        .entry(bc_name.to_string())
        .or_default()
        .insert(bc_url.to_string(), row_meta);
    changed
}
