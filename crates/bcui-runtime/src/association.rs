#![forbid(unsafe_code)]

//! Association (multi/single select) propagation across hierarchies.
//!
//! A record is selected when its overlay says `_associate: true`, or, with no
//! overlay flag, when the fetched record says so. Every transition writes an
//! overlay `{ id, _associate, _value }` under the record's id; fetched
//! records are never touched.
//!
//! # Scopes
//!
//! | Scope       | Records of a level                                  |
//! |-------------|-----------------------------------------------------|
//! | `Single`    | `data[bc]`                                          |
//! | `SameBc`    | depth 1: `data[bc]`, depth ≥ 2: `depth_data[d][bc]` |
//! | `Hierarchy` | `data[level.bc_name]`, one BC per level             |
//! | `Full`      | `data[bc]` filtered by the record's `level`         |
//!
//! Records of different depths of a same-BC hierarchy share one BC name,
//! so depth membership is taken from the per-depth collections, never from
//! positions.
//!
//! # Radio exclusivity
//!
//! Selecting under a radio level first deselects everything selected at
//! that level and below. With `radio_all`, levels are walked from the root
//! down to the selecting level and every radio level met is cleared too.

use ahash::AHashSet;
use bcui_core::{AssociatedItem, DataItem, DataValue, overlay_association};
use tracing::{debug, warn};

use crate::action::{AssociationScope, HierarchyLevel, SelectionPolicy};
use crate::state::ViewState;

/// Effective selection of a record: overlay flag first, then the fetched flag.
#[must_use]
pub fn is_associated(state: &ViewState, bc_name: &str, record: &DataItem) -> bool {
    state
        .pending(bc_name, &record.id)
        .and_then(overlay_association)
        .unwrap_or_else(|| record.is_associated())
}

/// Select or deselect one record, applying radio and group rules of the
/// scope first.
///
/// Returns `false` (and changes nothing) when the record cannot be found,
/// or when a hierarchy scope names a level of another BC.
pub fn change_association(
    state: &mut ViewState,
    bc_name: &str,
    id: &str,
    selected: bool,
    assoc_value_key: Option<&str>,
    scope: &AssociationScope,
    policy: SelectionPolicy,
) -> bool {
    let depth = match scope {
        AssociationScope::SameBc { depth } => *depth,
        _ => 1,
    };
    if let AssociationScope::Hierarchy { levels, level } = scope
        && let Some(current) = levels.get(*level)
        && current.bc_name != bc_name
    {
        warn!(
            target: "bcui.association",
            bc = %bc_name,
            level,
            level_bc = %current.bc_name,
            "hierarchy level belongs to another bc"
        );
        return false;
    }
    let Some(record) = state
        .records(bc_name, depth)
        .iter()
        .find(|record| record.id == id)
        .cloned()
    else {
        warn!(
            target: "bcui.association",
            bc = %bc_name,
            id = %id,
            depth,
            "association target not found"
        );
        return false;
    };

    match scope {
        AssociationScope::Single => {
            if selected && policy.radio {
                drop_all_associations(state, &[bc_name.to_string()]);
            }
        }
        AssociationScope::SameBc { depth } => {
            if selected && policy.radio {
                drop_all_associations_same_bc(state, bc_name, *depth);
            }
            if policy.group_select
                && expanded_cursor(state, bc_name, *depth) == Some(id)
                && let Some(child_depth) = depth.checked_add(1)
            {
                change_children_associations_same_bc(
                    state,
                    bc_name,
                    child_depth,
                    selected,
                    assoc_value_key,
                );
            }
        }
        AssociationScope::Full { depth } => {
            if selected && policy.radio {
                drop_all_associations_full(state, bc_name, *depth, true);
            }
            if policy.group_select {
                change_descendants_associations_full(
                    state,
                    bc_name,
                    id,
                    *depth,
                    selected,
                    assoc_value_key,
                );
            }
        }
        AssociationScope::Hierarchy { levels, level } => {
            let Some(current) = levels.get(*level) else {
                warn!(
                    target: "bcui.association",
                    bc = %bc_name,
                    level,
                    levels = levels.len(),
                    "hierarchy level out of range"
                );
                return false;
            };
            if selected {
                let targets = radio_targets(levels, *level, policy.radio_all);
                drop_all_associations(state, &targets);
            }
            if current.group_select
                && let Some(next) = levels.get(level + 1)
            {
                change_children_associations(state, &next.bc_name, selected, assoc_value_key);
            }
        }
    }

    let value = assoc_value(&record, assoc_value_key);
    write_association(state, bc_name, id, selected, value);
    debug!(
        target: "bcui.association",
        bc = %bc_name,
        id = %id,
        selected,
        "association changed"
    );
    true
}

/// Deselect every selected record of each BC, including records that are
/// only known through their overlay. Returns the number of deselections.
pub fn drop_all_associations(state: &mut ViewState, bc_names: &[String]) -> usize {
    let mut dropped = 0;
    for bc_name in bc_names {
        let mut ids: Vec<String> = associated_ids(state, bc_name, state.records(bc_name, 1));
        ids.extend(overlay_selected_ids(state, bc_name));
        dropped += deselect_all(state, bc_name, ids);
    }
    dropped
}

/// Deselect every selected record of a same-BC hierarchy at depth
/// `depth_from` or deeper. Shallower depths are left alone.
pub fn drop_all_associations_same_bc(state: &mut ViewState, bc_name: &str, depth_from: u32) -> usize {
    let mut ids = Vec::new();
    if depth_from <= 1 {
        ids.extend(associated_ids(state, bc_name, state.records(bc_name, 1)));
        ids.extend(overlay_selected_ids(state, bc_name));
    }
    let deeper: Vec<u32> = state
        .depth_data
        .keys()
        .copied()
        .filter(|depth| *depth >= depth_from.max(2))
        .collect();
    for depth in deeper {
        ids.extend(associated_ids(state, bc_name, state.records(bc_name, depth)));
    }
    deselect_all(state, bc_name, ids)
}

/// Deselect selected records of a full hierarchy at `depth`, or at `depth`
/// and deeper when `drop_descendants` is set.
pub fn drop_all_associations_full(
    state: &mut ViewState,
    bc_name: &str,
    depth: u32,
    drop_descendants: bool,
) -> usize {
    let ids: Vec<String> = state
        .records(bc_name, 1)
        .iter()
        .filter(|record| {
            let level = record.level();
            (level == depth || (drop_descendants && level >= depth))
                && is_associated(state, bc_name, record)
        })
        .map(|record| record.id.clone())
        .collect();
    deselect_all(state, bc_name, ids)
}

/// (De)select every record of a BC.
pub fn change_children_associations(
    state: &mut ViewState,
    bc_name: &str,
    selected: bool,
    assoc_value_key: Option<&str>,
) -> usize {
    let targets = value_pairs(state.records(bc_name, 1), assoc_value_key);
    write_all(state, bc_name, targets, selected)
}

/// (De)select every record of one depth of a same-BC hierarchy.
pub fn change_children_associations_same_bc(
    state: &mut ViewState,
    bc_name: &str,
    depth: u32,
    selected: bool,
    assoc_value_key: Option<&str>,
) -> usize {
    let targets = value_pairs(state.records(bc_name, depth), assoc_value_key);
    write_all(state, bc_name, targets, selected)
}

/// (De)select every transitive descendant of `parent_id` in a full
/// hierarchy. Only records deeper than `depth` are considered.
pub fn change_descendants_associations_full(
    state: &mut ViewState,
    bc_name: &str,
    parent_id: &str,
    depth: u32,
    selected: bool,
    assoc_value_key: Option<&str>,
) -> usize {
    let records = state.records(bc_name, 1);
    let mut visited: AHashSet<&str> = AHashSet::new();
    let mut frontier = vec![parent_id];
    let mut descendants = Vec::new();
    while let Some(parent) = frontier.pop() {
        for record in records {
            if record.level() > depth
                && record.parent_id().as_deref() == Some(parent)
                && visited.insert(record.id.as_str())
            {
                frontier.push(record.id.as_str());
                descendants.push(record);
            }
        }
    }
    let targets: Vec<(String, Option<DataValue>)> = descendants
        .into_iter()
        .map(|record| (record.id.clone(), assoc_value(record, assoc_value_key)))
        .collect();
    write_all(state, bc_name, targets, selected)
}

/// BCs cleared when selecting at `level` of a cross-BC hierarchy.
fn radio_targets(levels: &[HierarchyLevel], level: usize, radio_all: bool) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    if radio_all {
        for (index, candidate) in levels.iter().enumerate().take(level + 1) {
            if candidate.radio || index == level {
                targets.push(candidate.bc_name.clone());
            }
        }
    } else if levels[level].radio {
        targets.push(levels[level].bc_name.clone());
    }
    if !targets.is_empty() {
        targets.extend(levels.iter().skip(level + 1).map(|l| l.bc_name.clone()));
    }
    targets
}

/// The record whose children are loaded at `depth + 1`.
fn expanded_cursor<'a>(state: &'a ViewState, bc_name: &str, depth: u32) -> Option<&'a str> {
    if depth <= 1 {
        state.bcs.cursor(bc_name)
    } else {
        state
            .depth_cursors
            .get(bc_name)?
            .get(&depth)
            .map(String::as_str)
    }
}

fn assoc_value(record: &DataItem, key: Option<&str>) -> Option<DataValue> {
    key.and_then(|key| record.value(key))
}

fn associated_ids(state: &ViewState, bc_name: &str, records: &[DataItem]) -> Vec<String> {
    records
        .iter()
        .filter(|record| is_associated(state, bc_name, record))
        .map(|record| record.id.clone())
        .collect()
}

fn overlay_selected_ids(state: &ViewState, bc_name: &str) -> Vec<String> {
    state
        .pending_data_changes
        .get(bc_name)
        .map(|by_cursor| {
            by_cursor
                .iter()
                .filter(|(_, overlay)| overlay_association(overlay) == Some(true))
                .map(|(cursor, _)| cursor.clone())
                .collect()
        })
        .unwrap_or_default()
}

fn value_pairs(records: &[DataItem], key: Option<&str>) -> Vec<(String, Option<DataValue>)> {
    records
        .iter()
        .map(|record| (record.id.clone(), assoc_value(record, key)))
        .collect()
}

fn deselect_all(state: &mut ViewState, bc_name: &str, ids: Vec<String>) -> usize {
    let mut seen = AHashSet::new();
    let mut count = 0;
    for id in ids {
        if seen.insert(id.clone()) {
            write_association(state, bc_name, &id, false, None);
            count += 1;
        }
    }
    count
}

fn write_all(
    state: &mut ViewState,
    bc_name: &str,
    targets: Vec<(String, Option<DataValue>)>,
    selected: bool,
) -> usize {
    let count = targets.len();
    for (id, value) in targets {
        write_association(state, bc_name, &id, selected, value);
    }
    count
}

fn write_association(
    state: &mut ViewState,
    bc_name: &str,
    id: &str,
    selected: bool,
    value: Option<DataValue>,
) {
    AssociatedItem::new(id, selected)
        .with_value(value)
        .merge_into(state.pending_mut(bc_name, id));
}
