#![forbid(unsafe_code)]

//! Business components and the path keys derived from their cursors.
//!
//! A [`BcTable`] holds every business component (BC) of the current view,
//! keyed by name. Each BC optionally names a parent, forming a tree. The
//! URL builder walks that tree upward to produce a path key such as
//! `client/7/contact/12`, which identifies a record together with its full
//! ancestor cursor chain. Row metadata is cached under these keys.
//!
//! # Invariants
//!
//! 1. BC names are unique within a table.
//! 2. The `parent_name` chain is acyclic. This is a caller invariant: the URL
//!    builder performs no cycle detection and loops forever on a cycle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A named filter group available for a BC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub name: String,
    pub url: String,
}

/// One business component of the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessComponent {
    /// Unique key within the view.
    pub name: String,
    /// Owning BC, if any.
    #[serde(default)]
    pub parent_name: Option<String>,
    /// Id of the currently selected record.
    #[serde(default)]
    pub cursor: Option<String>,
    /// Template path of the BC on the server.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub loading: bool,
    #[serde(default)]
    pub has_next: bool,
    /// 1-based page of the last fetch.
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub filter_groups: Vec<FilterGroup>,
}

fn first_page() -> u32 {
    1
}

impl BusinessComponent {
    /// Create a root BC with no cursor.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            url: name.clone(),
            name,
            parent_name: None,
            cursor: None,
            loading: false,
            has_next: false,
            page: first_page(),
            filter_groups: Vec::new(),
        }
    }

    /// Set the parent BC.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_name = Some(parent.into());
        self
    }

    /// Set the current cursor.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Set the server template path.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// All business components of a view, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BcTable {
    bcs: BTreeMap<String, BusinessComponent>,
}

impl BcTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a BC, keyed by its name.
    pub fn insert(&mut self, bc: BusinessComponent) {
        self.bcs.insert(bc.name.clone(), bc);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BusinessComponent> {
        self.bcs.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut BusinessComponent> {
        self.bcs.get_mut(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bcs.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bcs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bcs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BusinessComponent> {
        self.bcs.values()
    }

    /// Current cursor of a BC, if the BC exists and has one.
    #[must_use]
    pub fn cursor(&self, name: &str) -> Option<&str> {
        self.bcs.get(name).and_then(|bc| bc.cursor.as_deref())
    }

    /// Names of BCs without a parent.
    #[must_use]
    pub fn roots(&self) -> Vec<String> {
        self.bcs
            .values()
            .filter(|bc| bc.parent_name.is_none())
            .map(|bc| bc.name.clone())
            .collect()
    }

    /// Names of BCs whose parent is `name`.
    #[must_use]
    pub fn children_of(&self, name: &str) -> Vec<String> {
        self.bcs
            .values()
            .filter(|bc| bc.parent_name.as_deref() == Some(name))
            .map(|bc| bc.name.clone())
            .collect()
    }

    /// All transitive descendants of `name`, breadth-first.
    #[must_use]
    pub fn descendants_of(&self, name: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut frontier = self.children_of(name);
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for child in frontier {
                next.extend(self.children_of(&child));
                out.push(child);
            }
            frontier = next;
        }
        out
    }

    /// Build the path key of a BC. See [`build_url`].
    #[must_use]
    pub fn build_url(&self, bc_name: &str, include_self: bool) -> Option<String> {
        build_url(bc_name, include_self, self)
    }

    /// Build the path key of a specific record of a BC. See
    /// [`build_url_for_cursor`].
    #[must_use]
    pub fn build_url_for_cursor(&self, bc_name: &str, cursor: &str) -> Option<String> {
        build_url_for_cursor(bc_name, cursor, self)
    }
}

impl FromIterator<BusinessComponent> for BcTable {
    fn from_iter<I: IntoIterator<Item = BusinessComponent>>(iter: I) -> Self {
        let mut table = Self::new();
        for bc in iter {
            table.insert(bc);
        }
        table
    }
}

/// Build the hierarchical path key of `bc_name`.
///
/// The BC's own segment is `{name}/{cursor}` when `include_self` is set and
/// the BC has a cursor, otherwise just `{name}`. Every ancestor contributes
/// `{ancestor}/{ancestor_cursor}` regardless of `include_self`. Segments are
/// joined root-first.
///
/// An ancestor without a cursor keeps its cursor slot with an empty segment
/// (`{ancestor}/`), so every ancestor spans exactly two segments. Without
/// the slot, `a` above `b/c` and `a/b` above `c` would share a key.
///
/// Returns `None` if `bc_name` is not in the table.
///
/// The parent chain must be acyclic; a cycle makes this loop forever.
///
/// ```
/// use bcui_core::bc::{BcTable, BusinessComponent, build_url};
///
/// let table: BcTable = [
///     BusinessComponent::new("client").with_cursor("7"),
///     BusinessComponent::new("contact").with_parent("client").with_cursor("12"),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(build_url("contact", false, &table).as_deref(), Some("client/7/contact"));
/// assert_eq!(build_url("contact", true, &table).as_deref(), Some("client/7/contact/12"));
/// assert_eq!(build_url("missing", true, &table), None);
/// ```
#[must_use]
pub fn build_url(bc_name: &str, include_self: bool, table: &BcTable) -> Option<String> {
    let bc = table.get(bc_name)?;
    let self_cursor = if include_self { bc.cursor.as_deref() } else { None };
    Some(walk_path(bc, self_cursor, table))
}

/// Build the path key of `bc_name` as if its cursor were `cursor`.
///
/// Ancestors still contribute their current cursors. Returns `None` if the
/// BC is not in the table.
#[must_use]
pub fn build_url_for_cursor(bc_name: &str, cursor: &str, table: &BcTable) -> Option<String> {
    let bc = table.get(bc_name)?;
    Some(walk_path(bc, Some(cursor), table))
}

fn walk_path(bc: &BusinessComponent, self_cursor: Option<&str>, table: &BcTable) -> String {
    let mut segments = vec![segment(&bc.name, self_cursor)];
    let mut parent = bc.parent_name.as_deref();
    while let Some(parent_name) = parent {
        let Some(ancestor) = table.get(parent_name) else {
            warn!(
                target: "bcui.bc",
                bc = %bc.name,
                parent = %parent_name,
                "parent bc missing from table; path truncated"
            );
            break;
        };
        segments.push(format!(
            "{}/{}",
            ancestor.name,
            ancestor.cursor.as_deref().unwrap_or_default()
        ));
        parent = ancestor.parent_name.as_deref();
    }
    segments.reverse();
    segments.join("/")
}

fn segment(name: &str, cursor: Option<&str>) -> String {
    match cursor {
        Some(cursor) => format!("{name}/{cursor}"),
        None => name.to_string(),
    }
}
