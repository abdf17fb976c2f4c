#![forbid(unsafe_code)]

//! Subscriber installation from [`LogConfig`].
//!
//! Only compiled with the `tracing-json` feature. Applications that install
//! their own subscriber never need it.

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` overrides `config.filter` when set. Fails if the filter does
/// not parse or a global subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)?,
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}
