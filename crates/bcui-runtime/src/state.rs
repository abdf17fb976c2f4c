#![forbid(unsafe_code)]

//! The state of one view.
//!
//! [`ViewState`] is the single shared resource of the runtime. It is owned by
//! a [`crate::Store`], read through [`crate::selectors`] and changed only by
//! reducers in response to [`crate::Action`]s.
//!
//! # Persisted shape
//!
//! [`PersistedState`] is the externally visible part of the state, in the
//! camelCase JSON shape exchanged with other consumers:
//!
//! ```text
//! pendingDataChanges:  { bc: { cursor: { field: value } } }
//! handledForceActive:  { bc: { cursor: { field: value } } }
//! pendingValidationFails:       flat or nested, see format
//! pendingValidationFailsFormat: "old" | "target"
//! ```

use std::collections::BTreeMap;

use bcui_core::{
    BcTable, BusinessComponent, DataItem, PendingDataItem, RowMeta, ValidationFails,
    ValidationFailsFormat, ViewError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// BC → cursor → overlay.
pub type PendingDataChanges = BTreeMap<String, BTreeMap<String, PendingDataItem>>;

/// BC → path key → metadata.
pub type RowMetaCache = BTreeMap<String, BTreeMap<String, RowMeta>>;

/// Depth (≥ 2) → BC → records of that nesting depth.
pub type DepthData = BTreeMap<u32, BTreeMap<String, Vec<DataItem>>>;

/// The view description a screen is loaded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewDescriptor {
    pub name: String,
    #[serde(default)]
    pub bcs: Vec<BusinessComponent>,
}

/// Everything the runtime tracks for the current view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub view_name: Option<String>,
    pub bcs: BcTable,
    /// Top-level (depth 1) records per BC.
    pub data: BTreeMap<String, Vec<DataItem>>,
    pub depth_data: DepthData,
    /// BC → depth → selected record at that depth.
    pub depth_cursors: BTreeMap<String, BTreeMap<u32, String>>,
    pub row_meta: RowMetaCache,
    pub pending_data_changes: PendingDataChanges,
    pub handled_force_active: PendingDataChanges,
    pub pending_validation_fails: ValidationFails,
    pub view_error: Option<ViewError>,
}

impl ViewState {
    /// Empty state whose validation fails use `format`.
    #[must_use]
    pub fn new(format: ValidationFailsFormat) -> Self {
        Self {
            pending_validation_fails: ValidationFails::empty(format),
            ..Self::default()
        }
    }

    /// Records of a BC at a depth. Depth 1 (or 0) is the main collection.
    #[must_use]
    pub fn records(&self, bc_name: &str, depth: u32) -> &[DataItem] {
        let records = if depth <= 1 {
            self.data.get(bc_name)
        } else {
            self.depth_data
                .get(&depth)
                .and_then(|by_bc| by_bc.get(bc_name))
        };
        records.map(Vec::as_slice).unwrap_or_default()
    }

    /// Find a record by id in the main collection, then in depth collections.
    #[must_use]
    pub fn find_record(&self, bc_name: &str, id: &str) -> Option<&DataItem> {
        self.records(bc_name, 1)
            .iter()
            .chain(
                self.depth_data
                    .values()
                    .filter_map(|by_bc| by_bc.get(bc_name))
                    .flatten(),
            )
            .find(|item| item.id == id)
    }

    /// The overlay of a record, if one exists.
    #[must_use]
    pub fn pending(&self, bc_name: &str, cursor: &str) -> Option<&PendingDataItem> {
        self.pending_data_changes.get(bc_name)?.get(cursor)
    }

    /// The overlay of a record, created empty if missing.
    pub fn pending_mut(&mut self, bc_name: &str, cursor: &str) -> &mut PendingDataItem {
        self.pending_data_changes
            .entry(bc_name.to_string())
            .or_default()
            .entry(cursor.to_string())
            .or_default()
    }

    /// Cached metadata of a BC at a path key.
    #[must_use]
    pub fn row_meta_at(&self, bc_name: &str, bc_url: &str) -> Option<&RowMeta> {
        self.row_meta.get(bc_name)?.get(bc_url)
    }

    /// Extract the persisted part of the state.
    #[must_use]
    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            pending_data_changes: self.pending_data_changes.clone(),
            handled_force_active: self.handled_force_active.clone(),
            pending_validation_fails: self.pending_validation_fails.to_value(),
            pending_validation_fails_format: Some(self.pending_validation_fails.format()),
        }
    }

    /// Replace the persisted part of the state.
    ///
    /// A missing format means `old`.
    pub fn restore(&mut self, persisted: PersistedState) -> bcui_core::Result<()> {
        let format = persisted.pending_validation_fails_format.unwrap_or_default();
        self.pending_validation_fails =
            ValidationFails::from_value(format, persisted.pending_validation_fails)?;
        self.pending_data_changes = persisted.pending_data_changes;
        self.handled_force_active = persisted.handled_force_active;
        Ok(())
    }
}

/// The externally visible, persisted part of [`ViewState`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub pending_data_changes: PendingDataChanges,
    #[serde(default)]
    pub handled_force_active: PendingDataChanges,
    /// Raw fails; interpreted through `pending_validation_fails_format`.
    #[serde(default)]
    pub pending_validation_fails: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_validation_fails_format: Option<ValidationFailsFormat>,
}

impl PersistedState {
    pub fn from_json_str(s: &str) -> bcui_core::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> bcui_core::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
