#![forbid(unsafe_code)]

//! Server-computed per-record metadata.
//!
//! Row metadata is fetched for a record identified by its path key (see
//! [`crate::bc::build_url`]) and cached under that key. A `current_value` is
//! only meaningful for the path key it was fetched with.
//!
//! An absent `currentValue` and an explicit `"currentValue": null` differ:
//! the first forces nothing, the second forces the field to `null`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::data::{DataValue, PendingDataItem};

/// An option of a dictionary field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValueOption {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Constraints and server state of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowMetaField {
    pub key: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub required: bool,
    /// Authoritative server value, used to detect forced overrides.
    /// `Some(Value::Null)` is a forced clear; `None` means no value was sent.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_value: Option<DataValue>,
    /// Any edit to this field must trigger a metadata refetch.
    #[serde(default)]
    pub force_active: bool,
    #[serde(default)]
    pub filterable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<FieldValueOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter_values: Vec<FieldValueOption>,
}

impl RowMetaField {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            disabled: false,
            required: false,
            current_value: None,
            force_active: false,
            filterable: false,
            values: Vec::new(),
            filter_values: Vec::new(),
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn force_active(mut self) -> Self {
        self.force_active = true;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    #[must_use]
    pub fn with_current_value(mut self, value: impl Into<DataValue>) -> Self {
        self.current_value = Some(value.into());
        self
    }

    /// Force the field to `null`.
    #[must_use]
    pub fn with_cleared_value(mut self) -> Self {
        self.current_value = Some(DataValue::Null);
        self
    }
}

/// A key that is present always yields `Some`, even when its value is `null`.
/// Absent keys fall back to `#[serde(default)]`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<DataValue>, D::Error>
where
    D: Deserializer<'de>,
{
    DataValue::deserialize(deserializer).map(Some)
}

/// An operation offered for the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMetaAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

/// Metadata of one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowMeta {
    #[serde(default)]
    pub actions: Vec<RowMetaAction>,
    #[serde(default)]
    pub fields: Vec<RowMetaField>,
    /// Field violations reported by the server on a rejected save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl RowMeta {
    #[must_use]
    pub fn new(fields: Vec<RowMetaField>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&RowMetaField> {
        self.fields.iter().find(|field| field.key == key)
    }

    #[must_use]
    pub fn is_required(&self, key: &str) -> bool {
        self.field(key).is_some_and(|field| field.required)
    }

    #[must_use]
    pub fn is_force_active(&self, key: &str) -> bool {
        self.field(key).is_some_and(|field| field.force_active)
    }

    /// Field key → current value, for fields that carry one. An explicit
    /// `null` is included.
    #[must_use]
    pub fn forced_values(&self) -> PendingDataItem {
        self.fields
            .iter()
            .filter_map(|field| {
                field
                    .current_value
                    .as_ref()
                    .map(|value| (field.key.clone(), value.clone()))
            })
            .collect()
    }

    /// Keys of fields flagged `forceActive`.
    #[must_use]
    pub fn force_active_keys(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.force_active)
            .map(|field| field.key.as_str())
            .collect()
    }

    /// Merge server-reported violations, replacing messages for the same field.
    pub fn merge_errors(&mut self, errors: BTreeMap<String, String>) {
        self.errors.get_or_insert_with(BTreeMap::new).extend(errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_server_payload() {
        let meta: RowMeta = serde_json::from_value(json!({
            "actions": [{"type": "save", "text": "Save"}],
            "fields": [
                {"key": "name", "required": true, "currentValue": "Ann"},
                {"key": "kind", "forceActive": true, "values": [{"value": "A"}]},
                {"key": "id", "disabled": true}
            ]
        }))
        .unwrap();
        assert_eq!(meta.actions[0].kind, "save");
        assert!(meta.is_required("name"));
        assert!(!meta.is_required("kind"));
        assert!(meta.is_force_active("kind"));
        assert_eq!(meta.force_active_keys(), vec!["kind"]);
        assert_eq!(meta.forced_values().get("name"), Some(&json!("Ann")));
        assert!(!meta.forced_values().contains_key("kind"));
        assert_eq!(meta.field("kind").unwrap().values[0].value, "A");
    }

    #[test]
    fn explicit_null_current_value_is_forced() {
        let meta: RowMeta = serde_json::from_value(json!({
            "fields": [
                {"key": "city", "currentValue": null},
                {"key": "street"}
            ]
        }))
        .unwrap();
        assert_eq!(meta.field("city").unwrap().current_value, Some(json!(null)));
        assert_eq!(meta.field("street").unwrap().current_value, None);
        let forced = meta.forced_values();
        assert_eq!(forced.get("city"), Some(&json!(null)));
        assert!(!forced.contains_key("street"));

        let back = serde_json::to_value(&meta).unwrap();
        assert_eq!(back["fields"][0]["currentValue"], json!(null));
        assert!(back["fields"][1].get("currentValue").is_none());
    }

    #[test]
    fn merge_errors_creates_and_overwrites() {
        let mut meta = RowMeta::default();
        meta.merge_errors(BTreeMap::from([("a".into(), "bad".into())]));
        meta.merge_errors(BTreeMap::from([
            ("a".into(), "worse".into()),
            ("b".into(), "also".into()),
        ]));
        let errors = meta.errors.unwrap();
        assert_eq!(errors["a"], "worse");
        assert_eq!(errors.len(), 2);
    }
}
