//! Structured logging setup.
//!
//! Logs go to stderr so stdout stays free for run outputs.

use crate::config::{EngineConfig, LogFormat};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive for `level`, raised to `debug` when `verbose` is set.
pub fn filter_directive(level: &str, verbose: bool) -> String {
    let level = if verbose && matches!(level, "info" | "warn" | "error") {
        "debug"
    } else {
        level
    };
    format!("playbook_engine={level},playbook={level}")
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
///
/// Does nothing if a subscriber is already installed.
pub fn init_logging(config: &EngineConfig, verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(&config.log_level, verbose)));

    let result = match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
}
