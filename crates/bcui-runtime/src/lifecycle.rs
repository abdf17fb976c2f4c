#![forbid(unsafe_code)]

//! Cursor and data lifecycle.
//!
//! Selecting a record invalidates every descendant BC: their cursors are
//! dropped, they are marked loading and the direct children are refetched
//! under the new path. A fetch that lands without the current cursor moves
//! the cursor to the first record and cascades the same way.

use std::ops::Bound;

use bcui_core::DataItem;
use tracing::{debug, warn};

use crate::effect::Effect;
use crate::state::{ViewDescriptor, ViewState};

/// Load a new view, discarding everything tracked for the previous one.
///
/// The validation fail format survives. Root BCs are fetched.
pub fn select_view(state: &mut ViewState, view: ViewDescriptor) -> Vec<Effect> {
    let format = state.pending_validation_fails.format();
    *state = ViewState::new(format);
    state.view_name = Some(view.name);
    state.bcs = view.bcs.into_iter().collect();

    let roots = state.bcs.roots();
    for root in &roots {
        if let Some(bc) = state.bcs.get_mut(root) {
            bc.loading = true;
        }
    }
    roots
        .into_iter()
        .filter_map(|root| fetch_page(state, &root, None, 1))
        .collect()
}

/// Move the cursor of `bc_name` and refetch what hangs below it.
pub fn select_record(state: &mut ViewState, bc_name: &str, cursor: &str) -> Vec<Effect> {
    let Some(bc) = state.bcs.get_mut(bc_name) else {
        warn!(target: "bcui.lifecycle", bc = %bc_name, "select on unknown bc");
        return Vec::new();
    };
    bc.cursor = Some(cursor.to_string());
    debug!(target: "bcui.lifecycle", bc = %bc_name, cursor = %cursor, "cursor moved");
    cursor_changed(state, bc_name)
}

/// Store a fetched page.
///
/// Depth `None` or 1 replaces the main collection and settles the cursor;
/// deeper pages replace the depth collection.
pub fn fetch_data_success(
    state: &mut ViewState,
    bc_name: &str,
    data: Vec<DataItem>,
    depth: Option<u32>,
    has_next: bool,
) -> Vec<Effect> {
    if let Some(depth) = depth.filter(|depth| *depth > 1) {
        state
            .depth_data
            .entry(depth)
            .or_default()
            .insert(bc_name.to_string(), data);
        return Vec::new();
    }

    let Some(bc) = state.bcs.get_mut(bc_name) else {
        warn!(target: "bcui.lifecycle", bc = %bc_name, "data for unknown bc dropped");
        return Vec::new();
    };
    bc.loading = false;
    bc.has_next = has_next;
    let previous = bc.cursor.clone();
    let kept = previous
        .as_deref()
        .filter(|cursor| data.iter().any(|item| item.id == *cursor));
    let next = kept
        .map(str::to_string)
        .or_else(|| data.first().map(|item| item.id.clone()));
    let changed = next != previous;
    bc.cursor = next;
    state.data.insert(bc_name.to_string(), data);

    if changed {
        cursor_changed(state, bc_name)
    } else {
        Vec::new()
    }
}

/// Request the next page of `bc_name`.
pub fn load_more(state: &mut ViewState, bc_name: &str) -> Vec<Effect> {
    let Some(bc) = state.bcs.get_mut(bc_name) else {
        warn!(target: "bcui.lifecycle", bc = %bc_name, "load more on unknown bc");
        return Vec::new();
    };
    bc.page += 1;
    bc.loading = true;
    let page = bc.page;
    fetch_page(state, bc_name, None, page).into_iter().collect()
}

/// Append a further page to the main collection.
pub fn load_more_success(state: &mut ViewState, bc_name: &str, data: Vec<DataItem>, has_next: bool) {
    if let Some(bc) = state.bcs.get_mut(bc_name) {
        bc.loading = false;
        bc.has_next = has_next;
    }
    state
        .data
        .entry(bc_name.to_string())
        .or_default()
        .extend(data);
}

/// Expand a record of a same-BC hierarchy at `depth` and fetch its children.
///
/// Deeper cursors and collections are discarded. Nothing is fetched below
/// the deepest representable depth.
pub fn select_depth_record(
    state: &mut ViewState,
    bc_name: &str,
    depth: u32,
    cursor: &str,
) -> Vec<Effect> {
    if depth <= 1 {
        let Some(bc) = state.bcs.get_mut(bc_name) else {
            warn!(target: "bcui.lifecycle", bc = %bc_name, depth, "depth select on unknown bc");
            return Vec::new();
        };
        bc.cursor = Some(cursor.to_string());
    }
    let cursors = state.depth_cursors.entry(bc_name.to_string()).or_default();
    cursors.retain(|d, _| *d < depth);
    if depth > 1 {
        cursors.insert(depth, cursor.to_string());
    }
    for (_, by_bc) in state
        .depth_data
        .range_mut((Bound::Excluded(depth), Bound::Unbounded))
    {
        by_bc.remove(bc_name);
    }
    state.depth_data.retain(|_, by_bc| !by_bc.is_empty());

    let Some(child_depth) = depth.checked_add(1) else {
        warn!(target: "bcui.lifecycle", bc = %bc_name, depth, "no depth below the deepest level");
        return Vec::new();
    };
    fetch_page(state, bc_name, Some(child_depth), 1)
        .into_iter()
        .collect()
}

/// Replace the record with the same id wherever it is loaded.
pub fn replace_record(state: &mut ViewState, bc_name: &str, item: DataItem) {
    let collections = state.data.get_mut(bc_name).into_iter().chain(
        state
            .depth_data
            .values_mut()
            .filter_map(|by_bc| by_bc.get_mut(bc_name)),
    );
    let mut replaced = false;
    for records in collections {
        if let Some(slot) = records.iter_mut().find(|record| record.id == item.id) {
            *slot = item.clone();
            replaced = true;
        }
    }
    if !replaced {
        warn!(target: "bcui.lifecycle", bc = %bc_name, id = %item.id, "saved record not loaded");
    }
}

/// Invalidate the descendants of `bc_name` after its cursor moved.
fn cursor_changed(state: &mut ViewState, bc_name: &str) -> Vec<Effect> {
    let has_cursor = state.bcs.cursor(bc_name).is_some();
    for descendant in state.bcs.descendants_of(bc_name) {
        if let Some(bc) = state.bcs.get_mut(&descendant) {
            bc.cursor = None;
            bc.page = 1;
            bc.loading = has_cursor;
        }
        if !has_cursor {
            state.data.remove(&descendant);
        }
    }
    if !has_cursor {
        return Vec::new();
    }

    let mut effects = Vec::new();
    if let Some(bc_url) = state.bcs.build_url(bc_name, true) {
        effects.push(Effect::FetchRowMeta {
            bc_name: bc_name.to_string(),
            bc_url,
        });
    }
    for child in state.bcs.children_of(bc_name) {
        effects.extend(fetch_page(state, &child, None, 1));
    }
    effects
}

fn fetch_page(state: &ViewState, bc_name: &str, depth: Option<u32>, page: u32) -> Option<Effect> {
    let bc_url = state.bcs.build_url(bc_name, false)?;
    Some(Effect::FetchData {
        bc_name: bc_name.to_string(),
        bc_url,
        depth,
        page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcui_core::testing::{bc_table, record};
    use bcui_core::{BusinessComponent, ValidationFailsFormat};
    use serde_json::json;

    fn three_level() -> ViewState {
        let mut state = ViewState::default();
        state.bcs = bc_table(&[
            ("client", None, Some("1")),
            ("contract", Some("client"), Some("10")),
            ("payment", Some("contract"), Some("100")),
        ]);
        state
    }

    fn data(ids: &[&str]) -> Vec<DataItem> {
        ids.iter().map(|id| record(id, json!({}))).collect()
    }

    #[test]
    fn select_view_resets_state_and_fetches_roots() {
        let mut state = ViewState::new(ValidationFailsFormat::Target);
        state.pending_mut("old", "1").insert("x".into(), json!(1));
        let effects = select_view(
            &mut state,
            ViewDescriptor {
                name: "clients".into(),
                bcs: vec![
                    BusinessComponent::new("client"),
                    BusinessComponent::new("contract").with_parent("client"),
                ],
            },
        );
        assert!(state.pending_data_changes.is_empty());
        assert_eq!(state.pending_validation_fails.format(), ValidationFailsFormat::Target);
        assert_eq!(state.view_name.as_deref(), Some("clients"));
        assert!(state.bcs.get("client").unwrap().loading);
        assert_eq!(
            effects,
            vec![Effect::FetchData {
                bc_name: "client".into(),
                bc_url: "client".into(),
                depth: None,
                page: 1,
            }]
        );
    }

    #[test]
    fn select_record_invalidates_descendants() {
        let mut state = three_level();
        let effects = select_record(&mut state, "client", "2");
        assert_eq!(state.bcs.cursor("client"), Some("2"));
        assert_eq!(state.bcs.cursor("contract"), None);
        assert_eq!(state.bcs.cursor("payment"), None);
        assert!(state.bcs.get("payment").unwrap().loading);
        assert_eq!(
            effects,
            vec![
                Effect::FetchRowMeta {
                    bc_name: "client".into(),
                    bc_url: "client/2".into(),
                },
                Effect::FetchData {
                    bc_name: "contract".into(),
                    bc_url: "client/2/contract".into(),
                    depth: None,
                    page: 1,
                },
            ]
        );
    }

    #[test]
    fn select_record_on_unknown_bc_is_a_no_op() {
        let mut state = three_level();
        let before = state.clone();
        assert!(select_record(&mut state, "nope", "1").is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn fetch_keeps_cursor_present_in_data() {
        let mut state = three_level();
        let effects = fetch_data_success(&mut state, "contract", data(&["9", "10"]), None, true);
        assert!(effects.is_empty());
        assert_eq!(state.bcs.cursor("contract"), Some("10"));
        assert!(state.bcs.get("contract").unwrap().has_next);
    }

    #[test]
    fn fetch_falls_back_to_first_record_and_cascades() {
        let mut state = three_level();
        let effects = fetch_data_success(&mut state, "contract", data(&["20", "21"]), None, false);
        assert_eq!(state.bcs.cursor("contract"), Some("20"));
        assert_eq!(state.bcs.cursor("payment"), None);
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[1].bc_name(), "payment");
    }

    #[test]
    fn empty_fetch_clears_cursor_and_descendant_data() {
        let mut state = three_level();
        state.data.insert("payment".into(), data(&["100"]));
        let effects = fetch_data_success(&mut state, "contract", Vec::new(), None, false);
        assert!(effects.is_empty());
        assert_eq!(state.bcs.cursor("contract"), None);
        assert!(!state.data.contains_key("payment"));
    }

    #[test]
    fn load_more_appends_next_page() {
        let mut state = three_level();
        fetch_data_success(&mut state, "payment", data(&["100"]), None, true);
        let effects = load_more(&mut state, "payment");
        assert_eq!(
            effects,
            vec![Effect::FetchData {
                bc_name: "payment".into(),
                bc_url: "client/1/contract/10/payment".into(),
                depth: None,
                page: 2,
            }]
        );
        load_more_success(&mut state, "payment", data(&["101"]), false);
        assert_eq!(state.records("payment", 1).len(), 2);
        assert!(!state.bcs.get("payment").unwrap().loading);
    }

    #[test]
    fn depth_select_drops_deeper_levels() {
        let mut state = ViewState::default();
        state.bcs = bc_table(&[("tree", None, Some("a"))]);
        fetch_data_success(&mut state, "tree", data(&["b"]), Some(2), false);
        fetch_data_success(&mut state, "tree", data(&["c"]), Some(3), false);
        select_depth_record(&mut state, "tree", 3, "c");

        let effects = select_depth_record(&mut state, "tree", 2, "b");
        assert_eq!(state.depth_cursors["tree"].get(&2).map(String::as_str), Some("b"));
        assert!(!state.depth_cursors["tree"].contains_key(&3));
        assert!(state.records("tree", 3).is_empty());
        assert_eq!(state.records("tree", 2).len(), 1);
        assert_eq!(
            effects,
            vec![Effect::FetchData {
                bc_name: "tree".into(),
                bc_url: "tree".into(),
                depth: Some(3),
                page: 1,
            }]
        );
    }

    #[test]
    fn depth_select_at_deepest_level_keeps_its_records() {
        let mut state = ViewState::default();
        state.bcs = bc_table(&[("tree", None, Some("a"))]);
        fetch_data_success(&mut state, "tree", data(&["z"]), Some(u32::MAX), false);
        let effects = select_depth_record(&mut state, "tree", u32::MAX, "z");
        assert!(effects.is_empty());
        assert_eq!(
            state.depth_cursors["tree"].get(&u32::MAX).map(String::as_str),
            Some("z")
        );
        assert_eq!(state.records("tree", u32::MAX).len(), 1);
    }

    #[test]
    fn replace_record_swaps_by_id() {
        let mut state = three_level();
        state.data.insert("client".into(), data(&["1", "2"]));
        replace_record(&mut state, "client", record("2", json!({"name": "saved"})));
        assert_eq!(state.data["client"][1].value("name"), Some(json!("saved")));
        assert_eq!(state.data["client"].len(), 2);
    }
}
