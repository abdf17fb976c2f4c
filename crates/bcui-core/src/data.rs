#![forbid(unsafe_code)]

//! Records fetched for a BC and the overlays written on top of them.
//!
//! Field values are plain JSON values. A [`DataItem`] is never mutated in
//! place once it belongs to a collection: fetches and saves replace the
//! whole record so that consumers can detect changes by comparison.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single field value.
pub type DataValue = Value;

/// Field name → value overlay of unsaved edits for one record.
pub type PendingDataItem = BTreeMap<String, DataValue>;

/// Association flag field.
pub const ASSOCIATE_KEY: &str = "_associate";
/// Value submitted for an association.
pub const ASSOCIATE_VALUE_KEY: &str = "_value";
/// Depth of a record in a full (explicit depth + parent) hierarchy.
pub const LEVEL_KEY: &str = "level";
/// Parent record id in a full hierarchy.
pub const PARENT_ID_KEY: &str = "parentId";

/// A record of a BC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataItem {
    pub id: String,
    /// Server-assigned optimistic concurrency version.
    #[serde(default)]
    pub vstamp: i64,
    #[serde(flatten)]
    pub fields: BTreeMap<String, DataValue>,
}

impl DataItem {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vstamp: 0,
            fields: BTreeMap::new(),
        }
    }

    /// Builder: set a field.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Value of a field, including the `id` and `vstamp` pseudo-fields.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<DataValue> {
        match key {
            "id" => Some(Value::String(self.id.clone())),
            "vstamp" => Some(Value::from(self.vstamp)),
            _ => self.fields.get(key).cloned(),
        }
    }

    /// The record as a flat field map, `id` and `vstamp` included.
    #[must_use]
    pub fn to_record_map(&self) -> PendingDataItem {
        let mut map = self.fields.clone();
        map.insert("id".into(), Value::String(self.id.clone()));
        map.insert("vstamp".into(), Value::from(self.vstamp));
        map
    }

    /// Baseline association flag as fetched from the server.
    #[must_use]
    pub fn is_associated(&self) -> bool {
        self.fields
            .get(ASSOCIATE_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Hierarchy depth; records without a level are top-level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.fields
            .get(LEVEL_KEY)
            .and_then(Value::as_u64)
            .and_then(|level| u32::try_from(level).ok())
            .unwrap_or(1)
    }

    /// Parent record id in a full hierarchy.
    #[must_use]
    pub fn parent_id(&self) -> Option<String> {
        match self.fields.get(PARENT_ID_KEY)? {
            Value::String(id) => Some(id.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// A selection override for one record: `{ id, _associate, _value }`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociatedItem {
    pub id: String,
    pub associate: bool,
    pub value: Option<DataValue>,
}

impl AssociatedItem {
    #[must_use]
    pub fn new(id: impl Into<String>, associate: bool) -> Self {
        Self {
            id: id.into(),
            associate,
            value: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: Option<DataValue>) -> Self {
        self.value = value;
        self
    }

    /// Merge this override into an existing overlay. A missing value keeps
    /// the overlay's previous `_value`.
    pub fn merge_into(&self, overlay: &mut PendingDataItem) {
        overlay.insert("id".into(), Value::String(self.id.clone()));
        overlay.insert(ASSOCIATE_KEY.into(), Value::Bool(self.associate));
        if let Some(value) = &self.value {
            overlay.insert(ASSOCIATE_VALUE_KEY.into(), value.clone());
        }
    }
}

/// Whether a value counts as "not filled in" for required-field checks.
///
/// Absent, `null`, empty strings and empty arrays are empty.
#[must_use]
pub fn is_empty_value(value: Option<&DataValue>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Association flag from an overlay, if the overlay sets one.
#[must_use]
pub fn overlay_association(overlay: &PendingDataItem) -> Option<bool> {
    overlay.get(ASSOCIATE_KEY).and_then(Value::as_bool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattened_fields_roundtrip_through_json() {
        let item: DataItem =
            serde_json::from_value(json!({"id": "1", "vstamp": 3, "name": "Ann", "_associate": true}))
                .unwrap();
        assert_eq!(item.id, "1");
        assert_eq!(item.vstamp, 3);
        assert_eq!(item.fields.get("name"), Some(&json!("Ann")));
        assert!(item.is_associated());
        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["name"], json!("Ann"));
    }

    #[test]
    fn pseudo_fields_are_readable() {
        let item = DataItem::new("9").with("x", 1);
        assert_eq!(item.value("id"), Some(json!("9")));
        assert_eq!(item.value("vstamp"), Some(json!(0)));
        assert_eq!(item.value("x"), Some(json!(1)));
        assert_eq!(item.value("y"), None);
        assert_eq!(item.to_record_map().len(), 3);
    }

    #[test]
    fn level_and_parent_defaults() {
        let root = DataItem::new("a");
        assert_eq!(root.level(), 1);
        assert_eq!(root.parent_id(), None);
        let child = DataItem::new("b").with(LEVEL_KEY, 2).with(PARENT_ID_KEY, 5);
        assert_eq!(child.level(), 2);
        assert_eq!(child.parent_id().as_deref(), Some("5"));
    }

    #[test]
    fn empty_values() {
        assert!(is_empty_value(None));
        assert!(is_empty_value(Some(&Value::Null)));
        assert!(is_empty_value(Some(&json!(""))));
        assert!(is_empty_value(Some(&json!([]))));
        assert!(!is_empty_value(Some(&json!(0))));
        assert!(!is_empty_value(Some(&json!(false))));
        assert!(!is_empty_value(Some(&json!("x"))));
    }

    #[test]
    fn association_merge_keeps_previous_value_when_absent() {
        let mut overlay = PendingDataItem::new();
        AssociatedItem::new("1", true)
            .with_value(Some(json!("Ann")))
            .merge_into(&mut overlay);
        AssociatedItem::new("1", false).merge_into(&mut overlay);
        assert_eq!(overlay_association(&overlay), Some(false));
        assert_eq!(overlay.get(ASSOCIATE_VALUE_KEY), Some(&json!("Ann")));
    }
}
