#![forbid(unsafe_code)]

//! The root reducer.
//!
//! [`reduce`] routes each [`Action`] to the reducer of its concern. It is a
//! plain function over `&mut ViewState`; the [`crate::Store`] adds
//! versioning, notification and tracing around it.

use bcui_core::RowMeta;
use tracing::{debug, warn};

use crate::action::Action;
use crate::association;
use crate::config::StoreConfig;
use crate::effect::Effect;
use crate::force_active;
use crate::lifecycle;
use crate::pending;
use crate::state::ViewState;

/// Apply `action` to `state` and return the effects it requests.
pub fn reduce(state: &mut ViewState, action: Action, config: &StoreConfig) -> Vec<Effect> {
    match action {
        // --- view lifecycle -------------------------------------------------
        Action::SelectView { view } => lifecycle::select_view(state, view),
        Action::BcSelectRecord { bc_name, cursor } => {
            lifecycle::select_record(state, &bc_name, &cursor)
        }
        Action::BcSelectDepthRecord {
            bc_name,
            depth,
            cursor,
        } => lifecycle::select_depth_record(state, &bc_name, depth, &cursor),
        Action::BcFetchDataSuccess {
            bc_name,
            data,
            depth,
            has_next,
        } => lifecycle::fetch_data_success(state, &bc_name, data, depth, has_next),
        Action::BcLoadMore { bc_name } => lifecycle::load_more(state, &bc_name),
        Action::BcLoadMoreSuccess {
            bc_name,
            data,
            has_next,
        } => {
            lifecycle::load_more_success(state, &bc_name, data, has_next);
            Vec::new()
        }
        Action::BcFetchRowMetaSuccess {
            bc_name,
            bc_url,
            row_meta,
        } => {
            state
                .row_meta
                .entry(bc_name)
                .or_default()
                .insert(bc_url, row_meta);
            Vec::new()
        }

        // --- pending changes ------------------------------------------------
        Action::ChangeDataItem {
            bc_name,
            cursor,
            data_item,
        } => pending::apply_edit(
            state,
            &bc_name,
            &cursor,
            data_item,
            &config.validation.required_message,
        ),
        Action::ChangeDataItems {
            bc_name,
            cursors,
            data_items,
        } => {
            pending::apply_bulk_edit(state, &bc_name, cursors, data_items);
            Vec::new()
        }
        Action::ForceActiveRmUpdate {
            bc_name,
            bc_url,
            cursor,
            current_record_data,
            row_meta,
        } => {
            force_active::reconcile_forced_values(
                state,
                &bc_name,
                &bc_url,
                &cursor,
                &current_record_data,
                row_meta,
            );
            Vec::new()
        }
        Action::BcCancelPendingChanges { bc_names } => {
            pending::cancel_pending_changes(state, bc_names.as_deref());
            Vec::new()
        }
        Action::ClearValidationFails => {
            state.pending_validation_fails.clear_all();
            Vec::new()
        }

        // --- operations -----------------------------------------------------
        Action::SendOperation {
            bc_name,
            operation_type,
        } => send_operation(state, bc_name, operation_type),
        Action::SendOperationSuccess {
            bc_name,
            cursor,
            data_item,
        } => {
            pending::reset_record(state, &bc_name, &cursor);
            if let Some(item) = data_item {
                lifecycle::replace_record(state, &bc_name, item);
            }
            state.pending_validation_fails.clear_cursor(&bc_name, &cursor);
            Vec::new()
        }
        Action::BcSaveDataFail {
            bc_name,
            bc_url,
            errors,
        } => {
            debug!(
                target: "bcui.reducer",
                bc = %bc_name,
                bc_url = %bc_url,
                fields = errors.len(),
                "save rejected"
            );
            state
                .row_meta
                .entry(bc_name)
                .or_default()
                .entry(bc_url)
                .or_insert_with(RowMeta::default)
                .merge_errors(errors);
            Vec::new()
        }

        // --- associations ---------------------------------------------------
        Action::ChangeAssociation {
            bc_name,
            id,
            selected,
            assoc_value_key,
            scope,
            policy,
        } => {
            association::change_association(
                state,
                &bc_name,
                &id,
                selected,
                assoc_value_key.as_deref(),
                &scope,
                policy,
            );
            Vec::new()
        }
        Action::DropAllAssociations { bc_names } => {
            association::drop_all_associations(state, &bc_names);
            Vec::new()
        }
        Action::DropAllAssociationsSameBc {
            bc_name,
            depth_from,
        } => {
            association::drop_all_associations_same_bc(state, &bc_name, depth_from);
            Vec::new()
        }
        Action::DropAllAssociationsFull {
            bc_name,
            depth,
            drop_descendants,
        } => {
            association::drop_all_associations_full(state, &bc_name, depth, drop_descendants);
            Vec::new()
        }
        Action::ChangeChildrenAssociations {
            bc_name,
            selected,
            assoc_value_key,
        } => {
            association::change_children_associations(
                state,
                &bc_name,
                selected,
                assoc_value_key.as_deref(),
            );
            Vec::new()
        }
        Action::ChangeChildrenAssociationsSameBc {
            bc_name,
            depth,
            selected,
            assoc_value_key,
        } => {
            association::change_children_associations_same_bc(
                state,
                &bc_name,
                depth,
                selected,
                assoc_value_key.as_deref(),
            );
            Vec::new()
        }
        Action::ChangeDescendantsAssociationsFull {
            bc_name,
            parent_id,
            depth,
            selected,
            assoc_value_key,
        } => {
            association::change_descendants_associations_full(
                state,
                &bc_name,
                &parent_id,
                depth,
                selected,
                assoc_value_key.as_deref(),
            );
            Vec::new()
        }

        // --- errors ---------------------------------------------------------
        Action::ShowViewError { error } => {
            state.view_error = Some(error);
            Vec::new()
        }
        Action::CloseViewError => {
            state.view_error = None;
            Vec::new()
        }
    }
}

/// Invoke an operation unless validation fails are pending for the BC.
fn send_operation(state: &ViewState, bc_name: String, operation_type: String) -> Vec<Effect> {
    if state.pending_validation_fails.has_pending(&bc_name) {
        warn!(
            target: "bcui.reducer",
            bc = %bc_name,
            operation = %operation_type,
            "operation blocked by pending validation fails"
        );
        return Vec::new();
    }
    let Some(bc_url) = state.bcs.build_url(&bc_name, true) else {
        warn!(target: "bcui.reducer", bc = %bc_name, "operation on unknown bc");
        return Vec::new();
    };
    let cursor = state.bcs.cursor(&bc_name).map(str::to_string);
    let pending = cursor
        .as_deref()
        .and_then(|cursor| state.pending(&bc_name, cursor))
        .cloned()
        .unwrap_or_default();
    vec![Effect::InvokeOperation {
        bc_name,
        bc_url,
        cursor,
        operation_type,
        pending,
    }]
}
