#![forbid(unsafe_code)]

//! Error types of the data model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation fails do not match the `{format}` format: {source}")]
    ValidationFailsShape {
        format: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown validation fails format: {value}")]
    UnknownValidationFailsFormat { value: String },
}

/// Transport-level detail of a system error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: String,
}

/// The error currently shown for the view. A new error replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewError {
    #[error("business error: {message}")]
    Business { message: String },

    #[error("system error: {}", .message.as_deref().unwrap_or("unexpected failure"))]
    System {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transport: Option<TransportError>,
    },

    #[error("network error")]
    Network,
}

impl ViewError {
    #[must_use]
    pub fn business(message: impl Into<String>) -> Self {
        Self::Business {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn system(message: Option<String>, transport: Option<TransportError>) -> Self {
        Self::System { message, transport }
    }

    /// HTTP status of the underlying transport failure, if known.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::System {
                transport: Some(transport),
                ..
            } => transport.status,
            _ => None,
        }
    }
}
