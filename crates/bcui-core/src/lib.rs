#![forbid(unsafe_code)]

//! bcui core data model.
//!
//! # Key Components
//!
//! - [`BcTable`] / [`BusinessComponent`] - the BC tree of a view and the
//!   path-key builder [`build_url`]
//! - [`DataItem`] / [`PendingDataItem`] - fetched records and unsaved overlays
//! - [`RowMeta`] - per-record field constraints and forced values
//! - [`ValidationFails`] - required-field violations in the `old` and
//!   `target` formats
//! - [`ViewError`] - the closed taxonomy of errors shown for a view
//!
//! # Role in bcui
//! `bcui-core` has no behavior beyond pure lookups. State transitions live
//! in `bcui-runtime`, which owns the store and reducers built on these types.

pub mod bc;
pub mod data;
pub mod error;
pub mod row_meta;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;
pub mod validation;

pub use bc::{BcTable, BusinessComponent, FilterGroup, build_url, build_url_for_cursor};
pub use data::{
    ASSOCIATE_KEY, ASSOCIATE_VALUE_KEY, AssociatedItem, DataItem, DataValue, LEVEL_KEY,
    PARENT_ID_KEY, PendingDataItem, is_empty_value, overlay_association,
};
pub use error::{CoreError, Result, TransportError, ViewError};
pub use row_meta::{FieldValueOption, RowMeta, RowMetaAction, RowMetaField};
pub use validation::{FieldFails, NestedFails, ValidationFails, ValidationFailsFormat};
