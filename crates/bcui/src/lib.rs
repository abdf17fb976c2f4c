#![forbid(unsafe_code)]

//! bcui public facade crate.
//!
//! Re-exports the data model and the store, offers a prelude, and a
//! top-level error type covering both.

use std::fmt;
#[cfg(feature = "config-files")]
use std::path::Path;

// --- Core re-exports -------------------------------------------------------

pub use bcui_core::{
    AssociatedItem, BcTable, BusinessComponent, DataItem, DataValue, PendingDataItem, RowMeta,
    RowMetaField, TransportError, ValidationFails, ValidationFailsFormat, ViewError, build_url,
};

// --- Runtime re-exports ----------------------------------------------------

pub use bcui_runtime::{
    Action, AssociationScope, Debouncer, Effect, HierarchyLevel, PersistedState, SelectionPolicy,
    Store, StoreConfig, Subscription, ViewDescriptor, ViewState, selectors,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for bcui consumers.
#[derive(Debug)]
pub enum Error {
    /// Data model or persisted-state failure.
    Core(bcui_core::CoreError),
    /// Configuration could not be loaded or is invalid.
    Config(bcui_runtime::ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Core(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<bcui_core::CoreError> for Error {
    fn from(err: bcui_core::CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<bcui_runtime::ConfigError> for Error {
    fn from(err: bcui_runtime::ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Core(bcui_core::CoreError::Json(err))
    }
}

/// Standard result type for bcui APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Setup -----------------------------------------------------------------

/// Load a config file (`.json` as JSON, anything else as TOML), apply
/// `BCUI_*` environment overrides, and validate.
#[cfg(feature = "config-files")]
pub fn load_config(path: impl AsRef<Path>) -> Result<StoreConfig> {
    let path = path.as_ref();
    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => StoreConfig::from_json_file(path)?,
        _ => StoreConfig::from_toml_file(path)?,
    };
    Ok(config.with_env_overrides().validated()?)
}

/// A store restored from a persisted JSON snapshot.
pub fn restore_store(config: StoreConfig, persisted_json: &str) -> Result<Store> {
    let store = Store::new(config);
    store.restore(PersistedState::from_json_str(persisted_json)?)?;
    Ok(store)
}

pub mod prelude {
    pub use crate::{
        Action, AssociationScope, BusinessComponent, DataItem, Effect, Error, PendingDataItem,
        Result, RowMeta, SelectionPolicy, Store, StoreConfig, ViewDescriptor, ViewState,
    };

    pub use crate::{core, runtime};
}

pub use bcui_core as core;
pub use bcui_runtime as runtime;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_store_reads_persisted_json() {
        let store = restore_store(
            StoreConfig::default(),
            r#"{"pendingDataChanges":{"bc":{"1":{"f":"v"}}},"pendingValidationFailsFormat":"target"}"#,
        )
        .unwrap();
        let state = store.snapshot();
        assert_eq!(
            selectors::effective_value(&state, "bc", "1", "f"),
            Some(serde_json::json!("v"))
        );
        assert_eq!(
            state.pending_validation_fails.format(),
            ValidationFailsFormat::Target
        );
    }

    #[test]
    fn restore_store_reports_core_errors() {
        let err = restore_store(StoreConfig::default(), "not json").unwrap_err();
        assert!(matches!(err, Error::Core(_)));
        let err = restore_store(
            StoreConfig::default(),
            r#"{"pendingValidationFails":{"f":[1]}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("old"));
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn load_config_picks_format_by_extension() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("bcui.json");
        std::fs::File::create(&json_path)
            .unwrap()
            .write_all(br#"{"search": {"debounce_ms": 50}}"#)
            .unwrap();
        let toml_path = dir.path().join("bcui.toml");
        std::fs::write(&toml_path, "[search]\ndebounce_ms = 70\n").unwrap();

        assert_eq!(load_config(&json_path).unwrap().search.debounce_ms, 50);
        assert_eq!(load_config(&toml_path).unwrap().search.debounce_ms, 70);
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn load_config_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bcui.toml");
        std::fs::write(&path, "[validation]\nrequired_message = \"\"\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(bcui_runtime::ConfigError::Validation(_))
        ));
    }
}
