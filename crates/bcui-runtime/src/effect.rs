#![forbid(unsafe_code)]

//! Side effects requested by reducers.
//!
//! The store never performs I/O. Reducers return [`Effect`]s describing the
//! round-trips the transport layer should make; their responses come back
//! as new actions.

use bcui_core::PendingDataItem;

/// A side effect to execute outside the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch a page of records. `bc_url` excludes the BC's own cursor.
    FetchData {
        bc_name: String,
        bc_url: String,
        depth: Option<u32>,
        page: u32,
    },
    /// Fetch row metadata for the BC's current record.
    FetchRowMeta { bc_name: String, bc_url: String },
    /// Refetch row metadata with the pending overlay so the server can
    /// compute forced values. The response is a `ForceActiveRmUpdate`.
    FetchForcedRowMeta {
        bc_name: String,
        bc_url: String,
        cursor: String,
        pending: PendingDataItem,
    },
    /// Invoke an operation on the current record, submitting its overlay.
    InvokeOperation {
        bc_name: String,
        bc_url: String,
        cursor: Option<String>,
        operation_type: String,
        pending: PendingDataItem,
    },
}

impl Effect {
    /// Stable name of the effect kind, used in tracing fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FetchData { .. } => "fetch_data",
            Self::FetchRowMeta { .. } => "fetch_row_meta",
            Self::FetchForcedRowMeta { .. } => "fetch_forced_row_meta",
            Self::InvokeOperation { .. } => "invoke_operation",
        }
    }

    /// The BC the effect concerns.
    #[must_use]
    pub fn bc_name(&self) -> &str {
        match self {
            Self::FetchData { bc_name, .. }
            | Self::FetchRowMeta { bc_name, .. }
            | Self::FetchForcedRowMeta { bc_name, .. }
            | Self::InvokeOperation { bc_name, .. } => bc_name,
        }
    }
}
