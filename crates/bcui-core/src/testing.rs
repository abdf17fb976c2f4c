#![forbid(unsafe_code)]

//! Fixture builders for tests.
//!
//! Enabled by the `test-helpers` feature.

use serde_json::Value;

use crate::bc::{BcTable, BusinessComponent};
use crate::data::{ASSOCIATE_KEY, DataItem, LEVEL_KEY, PARENT_ID_KEY, PendingDataItem};
use crate::row_meta::{RowMeta, RowMetaField};

/// Build a BC table from `(name, parent, cursor)` triples.
#[must_use]
pub fn bc_table(entries: &[(&str, Option<&str>, Option<&str>)]) -> BcTable {
    entries
        .iter()
        .map(|(name, parent, cursor)| {
            let mut bc = BusinessComponent::new(*name);
            bc.parent_name = parent.map(str::to_string);
            bc.cursor = cursor.map(str::to_string);
            bc
        })
        .collect()
}

/// A record with the given id and fields taken from a JSON object.
#[must_use]
pub fn record(id: &str, fields: Value) -> DataItem {
    let mut item = DataItem::new(id);
    if let Value::Object(map) = fields {
        item.fields.extend(map);
    }
    item
}

/// A record carrying a baseline association flag.
#[must_use]
pub fn assoc_record(id: &str, associated: bool) -> DataItem {
    DataItem::new(id).with(ASSOCIATE_KEY, associated)
}

/// A full-hierarchy record at `level` under `parent`.
#[must_use]
pub fn tree_record(id: &str, level: u32, parent: Option<&str>, associated: bool) -> DataItem {
    let mut item = assoc_record(id, associated).with(LEVEL_KEY, level);
    if let Some(parent) = parent {
        item = item.with(PARENT_ID_KEY, parent);
    }
    item
}

/// An overlay built from a JSON object.
#[must_use]
pub fn overlay(fields: Value) -> PendingDataItem {
    match fields {
        Value::Object(map) => map.into_iter().collect(),
        _ => PendingDataItem::new(),
    }
}

/// Row metadata marking the given keys required.
#[must_use]
pub fn required_meta(keys: &[&str]) -> RowMeta {
    RowMeta::new(keys.iter().map(|key| RowMetaField::new(*key).required()).collect())
}
