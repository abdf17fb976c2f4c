#![forbid(unsafe_code)]

//! Client-detected validation fails in their two persisted formats.
//!
//! | Format   | Shape                                   | Scope of a fail |
//! |----------|-----------------------------------------|-----------------|
//! | `old`    | `{ field: message }`                    | global          |
//! | `target` | `{ bc: { cursor: { field: message } } }` | one BC          |
//!
//! `old` is the default. Both formats are part of the externally visible
//! state, so neither may be rewritten into the other without an explicit
//! migration. [`ValidationFails::from_value`] is the only place where raw
//! JSON is interpreted, and it is told the format rather than guessing it.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};

/// Field → message.
pub type FieldFails = BTreeMap<String, String>;

/// BC → cursor → field → message.
pub type NestedFails = BTreeMap<String, BTreeMap<String, FieldFails>>;

/// Which shape `pendingValidationFails` uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationFailsFormat {
    /// Flat, global map.
    #[default]
    Old,
    /// Nested by BC and cursor.
    Target,
}

impl ValidationFailsFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::Target => "target",
        }
    }

    /// Parse the persisted discriminant. Unknown values are `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "old" => Some(Self::Old),
            "target" => Some(Self::Target),
            _ => None,
        }
    }
}

impl FromStr for ValidationFailsFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| CoreError::UnknownValidationFailsFormat {
            value: s.to_string(),
        })
    }
}

/// Pending validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFails {
    Flat(FieldFails),
    Nested(NestedFails),
}

impl Default for ValidationFails {
    fn default() -> Self {
        Self::empty(ValidationFailsFormat::default())
    }
}

impl ValidationFails {
    /// No fails, in the given format.
    #[must_use]
    pub fn empty(format: ValidationFailsFormat) -> Self {
        match format {
            ValidationFailsFormat::Old => Self::Flat(FieldFails::new()),
            ValidationFailsFormat::Target => Self::Nested(NestedFails::new()),
        }
    }

    #[must_use]
    pub fn format(&self) -> ValidationFailsFormat {
        match self {
            Self::Flat(_) => ValidationFailsFormat::Old,
            Self::Nested(_) => ValidationFailsFormat::Target,
        }
    }

    /// Whether operations on `bc_name` are blocked.
    ///
    /// Nested: at least one cursor of the BC has a non-empty field map.
    /// Flat: any entry at all, whatever `bc_name` is.
    #[must_use]
    pub fn has_pending(&self, bc_name: &str) -> bool {
        match self {
            Self::Flat(fails) => !fails.is_empty(),
            Self::Nested(fails) => fails
                .get(bc_name)
                .is_some_and(|cursors| cursors.values().any(|fields| !fields.is_empty())),
        }
    }

    /// Record a violation.
    pub fn record(&mut self, bc_name: &str, cursor: &str, field: &str, message: &str) {
        match self {
            Self::Flat(fails) => {
                fails.insert(field.to_string(), message.to_string());
            }
            Self::Nested(fails) => {
                fails
                    .entry(bc_name.to_string())
                    .or_default()
                    .entry(cursor.to_string())
                    .or_default()
                    .insert(field.to_string(), message.to_string());
            }
        }
    }

    /// Clear one field's violation. The cursor map stays present, possibly
    /// empty.
    pub fn clear_field(&mut self, bc_name: &str, cursor: &str, field: &str) {
        match self {
            Self::Flat(fails) => {
                fails.remove(field);
            }
            Self::Nested(fails) => {
                fails
                    .entry(bc_name.to_string())
                    .or_default()
                    .entry(cursor.to_string())
                    .or_default()
                    .remove(field);
            }
        }
    }

    /// Clear every violation of one record. Flat fails are global, so they
    /// are all cleared.
    pub fn clear_cursor(&mut self, bc_name: &str, cursor: &str) {
        match self {
            Self::Flat(fails) => fails.clear(),
            Self::Nested(fails) => {
                if let Some(cursors) = fails.get_mut(bc_name)
                    && let Some(fields) = cursors.get_mut(cursor)
                {
                    fields.clear();
                }
            }
        }
    }

    /// Clear every violation of one BC. Flat fails are all cleared.
    pub fn clear_bc(&mut self, bc_name: &str) {
        match self {
            Self::Flat(fails) => fails.clear(),
            Self::Nested(fails) => {
                fails.remove(bc_name);
            }
        }
    }

    /// Clear everything, keeping the format.
    pub fn clear_all(&mut self) {
        *self = Self::empty(self.format());
    }

    /// Message for a field of a record, if any.
    #[must_use]
    pub fn message(&self, bc_name: &str, cursor: &str, field: &str) -> Option<&str> {
        let message = match self {
            Self::Flat(fails) => fails.get(field),
            Self::Nested(fails) => fails.get(bc_name)?.get(cursor)?.get(field),
        };
        message.map(String::as_str)
    }

    /// Interpret persisted JSON in the given format. `null` is empty.
    pub fn from_value(format: ValidationFailsFormat, value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::empty(format));
        }
        let parsed = match format {
            ValidationFailsFormat::Old => serde_json::from_value(value).map(Self::Flat),
            ValidationFailsFormat::Target => serde_json::from_value(value).map(Self::Nested),
        };
        parsed.map_err(|source| CoreError::ValidationFailsShape {
            format: format.as_str(),
            source,
        })
    }

    /// The persisted JSON shape.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let result = match self {
            Self::Flat(fails) => serde_json::to_value(fails),
            Self::Nested(fails) => serde_json::to_value(fails),
        };
        result.unwrap_or(Value::Null)
    }
}
