//! EngineConfig struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for a playbook run.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // =========================================================================
    // Execution limits
    // =========================================================================
    /// Deepest allowed nesting of `map` loops before the run is aborted.
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,

    /// Maximum template resolution passes for a single string.
    #[serde(default = "default_max_template_iterations")]
    pub max_template_iterations: usize,

    // =========================================================================
    // Logging
    // =========================================================================
    /// Minimum log level (trace, debug, info, warn, error).
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: default_max_nesting_depth(),
            max_template_iterations: default_max_template_iterations(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}
