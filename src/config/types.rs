//! Configuration types and defaults for the engine.

use serde::{Deserialize, Serialize};

/// Accepted values for `log_level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Output format of log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines (default).
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

// Default value functions for serde
pub(super) fn default_max_nesting_depth() -> usize {
    32
}

pub(super) fn default_max_template_iterations() -> usize {
    crate::context::DEFAULT_MAX_TEMPLATE_ITERATIONS
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}
