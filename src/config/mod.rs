//! Engine configuration.
//!
//! This module defines the `EngineConfig` struct, read from an optional YAML
//! file passed with `--config`. It supports forward-compatible YAML parsing
//! (unknown fields are ignored), sensible defaults for optional fields, and
//! validation of config values.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::EngineConfig;
pub use types::{LOG_LEVELS, LogFormat};
