#![forbid(unsafe_code)]

//! Read-only views over [`ViewState`].
//!
//! Field values resolve in a fixed order: the pending overlay, then the
//! fetched record, then the `currentValue` of the row metadata cached for
//! that exact record.

use bcui_core::{DataItem, DataValue, PendingDataItem, RowMeta};

use crate::association;
use crate::state::ViewState;

/// Path key of a BC, with or without its own cursor.
#[must_use]
pub fn bc_url(state: &ViewState, bc_name: &str, include_self: bool) -> Option<String> {
    state.bcs.build_url(bc_name, include_self)
}

/// Metadata cached for the BC's current record.
#[must_use]
pub fn current_row_meta<'a>(state: &'a ViewState, bc_name: &str) -> Option<&'a RowMeta> {
    let url = state.bcs.build_url(bc_name, true)?;
    state.row_meta_at(bc_name, &url)
}

/// Effective value of one field of one record.
#[must_use]
pub fn effective_value(
    state: &ViewState,
    bc_name: &str,
    cursor: &str,
    field: &str,
) -> Option<DataValue> {
    if let Some(value) = state.pending(bc_name, cursor).and_then(|o| o.get(field)) {
        return Some(value.clone());
    }
    if let Some(value) = state
        .find_record(bc_name, cursor)
        .and_then(|record| record.value(field))
    {
        return Some(value);
    }
    let url = state.bcs.build_url_for_cursor(bc_name, cursor)?;
    state
        .row_meta_at(bc_name, &url)?
        .field(field)?
        .current_value
        .clone()
}

/// The fetched record with its overlay applied, as a field map.
#[must_use]
pub fn effective_record(state: &ViewState, bc_name: &str, cursor: &str) -> Option<PendingDataItem> {
    let mut fields = state.find_record(bc_name, cursor)?.to_record_map();
    if let Some(overlay) = state.pending(bc_name, cursor) {
        fields.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    Some(fields)
}

/// Effective selection of a record.
#[must_use]
pub fn is_associated(state: &ViewState, bc_name: &str, record: &DataItem) -> bool {
    association::is_associated(state, bc_name, record)
}

/// Records of a BC at a depth that are effectively selected.
#[must_use]
pub fn associated_records<'a>(state: &'a ViewState, bc_name: &str, depth: u32) -> Vec<&'a DataItem> {
    state
        .records(bc_name, depth)
        .iter()
        .filter(|record| association::is_associated(state, bc_name, record))
        .collect()
}

/// Whether operations on `bc_name` are blocked by validation fails.
#[must_use]
pub fn has_pending_validation_fails(state: &ViewState, bc_name: &str) -> bool {
    state.pending_validation_fails.has_pending(bc_name)
}
