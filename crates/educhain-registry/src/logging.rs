//! Tracing subscriber setup for processes embedding the registry.

use tracing_subscriber::EnvFilter;

use educhain_core::LoggingConfig;

use crate::error::RegistryError;

/// Install a global fmt subscriber. `RUST_LOG` overrides the configured level.
///
/// Returns `Ok(false)` when a global subscriber was already installed, so
/// repeated calls (one per test, say) are harmless.
pub fn init(config: &LoggingConfig) -> Result<bool, RegistryError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = match config.format.as_str() {
        "text" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok(),
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok(),
        other => {
            return Err(RegistryError::Config(format!(
                "unknown log format '{}', expected text or json",
                other
            )))
        }
    };

    Ok(installed)
}
