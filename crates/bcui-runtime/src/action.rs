#![forbid(unsafe_code)]

//! Action messages accepted by the store.
//!
//! Every state transition is one [`Action`]. User input and server responses
//! are both expressed as actions and applied in dispatch order.

use std::collections::BTreeMap;

use bcui_core::{DataItem, PendingDataItem, RowMeta, ViewError};

use crate::state::ViewDescriptor;

/// One level of a cross-BC hierarchy picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyLevel {
    pub bc_name: String,
    /// Selecting at this level deselects prior selections here and below.
    pub radio: bool,
    /// (De)selecting at this level (de)selects every record of the next level.
    pub group_select: bool,
}

impl HierarchyLevel {
    #[must_use]
    pub fn new(bc_name: impl Into<String>) -> Self {
        Self {
            bc_name: bc_name.into(),
            radio: false,
            group_select: false,
        }
    }

    #[must_use]
    pub fn radio(mut self) -> Self {
        self.radio = true;
        self
    }

    #[must_use]
    pub fn group_select(mut self) -> Self {
        self.group_select = true;
        self
    }
}

/// Where a selection happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationScope {
    /// A flat list of one BC.
    Single,
    /// A depth level of a same-BC recursive hierarchy. Depth 1 is the BC's
    /// main collection.
    SameBc { depth: u32 },
    /// One level of a parent/child chain of distinct BCs, root-first.
    Hierarchy {
        levels: Vec<HierarchyLevel>,
        level: usize,
    },
    /// A same-BC hierarchy whose records carry explicit `level`/`parentId`.
    Full { depth: u32 },
}

/// How a selection propagates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Radio within the level (Single, SameBc, Full).
    pub radio: bool,
    /// Radio across the whole ancestor chain (Hierarchy).
    pub radio_all: bool,
    /// Cascade to the next depth (SameBc, Full).
    pub group_select: bool,
}

impl SelectionPolicy {
    #[must_use]
    pub fn checkbox() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn radio() -> Self {
        Self {
            radio: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_group_select(mut self) -> Self {
        self.group_select = true;
        self
    }

    #[must_use]
    pub fn with_radio_all(mut self) -> Self {
        self.radio_all = true;
        self
    }
}

/// A state transition request.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // --- view lifecycle -----------------------------------------------------
    SelectView {
        view: ViewDescriptor,
    },
    BcSelectRecord {
        bc_name: String,
        cursor: String,
    },
    BcSelectDepthRecord {
        bc_name: String,
        depth: u32,
        cursor: String,
    },
    BcFetchDataSuccess {
        bc_name: String,
        data: Vec<DataItem>,
        /// `None` or 1 for the main collection.
        depth: Option<u32>,
        has_next: bool,
    },
    BcLoadMore {
        bc_name: String,
    },
    BcLoadMoreSuccess {
        bc_name: String,
        data: Vec<DataItem>,
        has_next: bool,
    },
    BcFetchRowMetaSuccess {
        bc_name: String,
        bc_url: String,
        row_meta: RowMeta,
    },

    // --- pending changes ----------------------------------------------------
    ChangeDataItem {
        bc_name: String,
        cursor: String,
        data_item: PendingDataItem,
    },
    ChangeDataItems {
        bc_name: String,
        cursors: Vec<String>,
        data_items: Vec<PendingDataItem>,
    },
    ForceActiveRmUpdate {
        bc_name: String,
        bc_url: String,
        cursor: String,
        current_record_data: PendingDataItem,
        row_meta: RowMeta,
    },
    BcCancelPendingChanges {
        /// `None` cancels every BC.
        bc_names: Option<Vec<String>>,
    },
    ClearValidationFails,

    // --- operations ---------------------------------------------------------
    SendOperation {
        bc_name: String,
        operation_type: String,
    },
    SendOperationSuccess {
        bc_name: String,
        cursor: String,
        data_item: Option<DataItem>,
    },
    BcSaveDataFail {
        bc_name: String,
        bc_url: String,
        errors: BTreeMap<String, String>,
    },

    // --- associations -------------------------------------------------------
    ChangeAssociation {
        bc_name: String,
        id: String,
        selected: bool,
        assoc_value_key: Option<String>,
        scope: AssociationScope,
        policy: SelectionPolicy,
    },
    DropAllAssociations {
        bc_names: Vec<String>,
    },
    DropAllAssociationsSameBc {
        bc_name: String,
        depth_from: u32,
    },
    DropAllAssociationsFull {
        bc_name: String,
        depth: u32,
        drop_descendants: bool,
    },
    ChangeChildrenAssociations {
        bc_name: String,
        selected: bool,
        assoc_value_key: Option<String>,
    },
    ChangeChildrenAssociationsSameBc {
        bc_name: String,
        depth: u32,
        selected: bool,
        assoc_value_key: Option<String>,
    },
    ChangeDescendantsAssociationsFull {
        bc_name: String,
        parent_id: String,
        depth: u32,
        selected: bool,
        assoc_value_key: Option<String>,
    },

    // --- errors -------------------------------------------------------------
    ShowViewError {
        error: ViewError,
    },
    CloseViewError,
}

impl Action {
    /// Stable name of the action kind, used in tracing fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SelectView { .. } => "select_view",
            Self::BcSelectRecord { .. } => "bc_select_record",
            Self::BcSelectDepthRecord { .. } => "bc_select_depth_record",
            Self::BcFetchDataSuccess { .. } => "bc_fetch_data_success",
            Self::BcLoadMore { .. } => "bc_load_more",
            Self::BcLoadMoreSuccess { .. } => "bc_load_more_success",
            Self::BcFetchRowMetaSuccess { .. } => "bc_fetch_row_meta_success",
            Self::ChangeDataItem { .. } => "change_data_item",
            Self::ChangeDataItems { .. } => "change_data_items",
            Self::ForceActiveRmUpdate { .. } => "force_active_rm_update",
            Self::BcCancelPendingChanges { .. } => "bc_cancel_pending_changes",
            Self::ClearValidationFails => "clear_validation_fails",
            Self::SendOperation { .. } => "send_operation",
            Self::SendOperationSuccess { .. } => "send_operation_success",
            Self::BcSaveDataFail { .. } => "bc_save_data_fail",
            Self::ChangeAssociation { .. } => "change_association",
            Self::DropAllAssociations { .. } => "drop_all_associations",
            Self::DropAllAssociationsSameBc { .. } => "drop_all_associations_same_bc",
            Self::DropAllAssociationsFull { .. } => "drop_all_associations_full",
            Self::ChangeChildrenAssociations { .. } => "change_children_associations",
            Self::ChangeChildrenAssociationsSameBc { .. } => {
                "change_children_associations_same_bc"
            }
            Self::ChangeDescendantsAssociationsFull { .. } => {
                "change_descendants_associations_full"
            }
            Self::ShowViewError { .. } => "show_view_error",
            Self::CloseViewError => "close_view_error",
        }
    }
}
