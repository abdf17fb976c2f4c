#![forbid(unsafe_code)]

//! Store configuration.
//!
//! [`StoreConfig`] groups every tunable of the runtime. It can be loaded from
//! TOML or JSON at startup and overridden from the environment:
//!
//! ```toml
//! # bcui.toml
//! [validation]
//! format = "target"
//! required_message = "Required"
//!
//! [search]
//! debounce_ms = 300
//!
//! [log]
//! filter = "bcui=debug"
//! json = true
//! ```
//!
//! | Variable                  | Field                    |
//! |---------------------------|--------------------------|
//! | `BCUI_VALIDATION_FORMAT`  | `validation.format`      |
//! | `BCUI_SEARCH_DEBOUNCE_MS` | `search.debounce_ms`     |
//!
//! `StoreConfig::default()` matches the built-in behavior.

#[cfg(feature = "config-files")]
use std::path::Path;
use std::time::Duration;

use bcui_core::ValidationFailsFormat;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Message recorded for an emptied required field.
pub const DEFAULT_REQUIRED_MESSAGE: &str = "This field is mandatory";

/// Quiet period of search inputs.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

const MAX_SEARCH_DEBOUNCE_MS: u64 = 10_000;

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub validation: ValidationConfig,
    pub search: SearchConfig,
    pub log: LogConfig,
}

/// Required-field validation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Shape of pending validation fails. Default: `old` (flat).
    pub format: ValidationFailsFormat,
    pub required_message: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            format: ValidationFailsFormat::default(),
            required_message: DEFAULT_REQUIRED_MESSAGE.to_string(),
        }
    }
}

/// Search input settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl SearchConfig {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
        }
    }
}

/// Subscriber settings used by [`crate::logging::init`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive. `RUST_LOG` wins when set.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "bcui=info".to_string(),
            json: false,
        }
    }
}

impl StoreConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config-files")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-files")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config-files")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Defaults overridden by `BCUI_*` environment variables.
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `BCUI_*` environment overrides on top of `self`.
    ///
    /// Unparseable values are ignored with a warning.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("BCUI_VALIDATION_FORMAT") {
            match val.parse::<ValidationFailsFormat>() {
                Ok(format) => self.validation.format = format,
                Err(err) => warn!(target: "bcui.config", %err, "BCUI_VALIDATION_FORMAT ignored"),
            }
        }

        if let Ok(val) = std::env::var("BCUI_SEARCH_DEBOUNCE_MS")
            && let Ok(ms) = val.parse::<u64>()
        {
            self.search.debounce_ms = ms;
        }

        self
    }

    /// Validate all settings.
    ///
    /// Returns a list of problems. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.validation.required_message.trim().is_empty() {
            errors.push("validation.required_message must not be empty".to_string());
        }
        if self.search.debounce_ms > MAX_SEARCH_DEBOUNCE_MS {
            errors.push(format!(
                "search.debounce_ms must be <= {MAX_SEARCH_DEBOUNCE_MS}, got {}",
                self.search.debounce_ms
            ));
        }
        if self.log.filter.trim().is_empty() {
            errors.push("log.filter must not be empty".to_string());
        }

        errors
    }

    /// `self` if valid, otherwise every problem found.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a store configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-files")]
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config-files")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config-files")]
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_built_in_constants() {
        let config = StoreConfig::default();
        assert_eq!(config.validation.format, ValidationFailsFormat::Old);
        assert_eq!(config.validation.required_message, "This field is mandatory");
        assert_eq!(config.search.debounce(), Duration::from_millis(500));
        assert!(!config.log.json);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            StoreConfig::from_json_str(r#"{"validation": {"format": "target"}}"#).unwrap();
        assert_eq!(config.validation.format, ValidationFailsFormat::Target);
        assert_eq!(config.validation.required_message, DEFAULT_REQUIRED_MESSAGE);
        assert_eq!(config.search.debounce_ms, DEFAULT_SEARCH_DEBOUNCE_MS);
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn toml_sections_load() {
        let config = StoreConfig::from_toml_str(
            r#"
            [validation]
            required_message = "Required"

            [search]
            debounce_ms = 120

            [log]
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.validation.required_message, "Required");
        assert_eq!(config.search.debounce_ms, 120);
        assert!(config.log.json);
        assert_eq!(config.log.filter, "bcui=info");
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn toml_file_roundtrip() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\ndebounce_ms = 42").unwrap();
        let config = StoreConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.search.debounce_ms, 42);
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn missing_file_is_io_error() {
        let err = StoreConfig::from_json_file("/nonexistent/bcui.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn unknown_format_is_json_error() {
        let err = StoreConfig::from_json_str(r#"{"validation": {"format": "new"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn multiple_validation_errors_collected() {
        let mut config = StoreConfig::default();
        config.validation.required_message = "  ".into();
        config.search.debounce_ms = 60_000;
        config.log.filter = String::new();
        let errors = config.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
        let err = config.validated().unwrap_err();
        assert!(err.to_string().starts_with("validation errors: "));
    }
}
