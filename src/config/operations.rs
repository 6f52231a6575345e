//! Config loading and validation.

use super::model::EngineConfig;
use super::types::LOG_LEVELS;
use crate::error::{EngineError, Result};
use std::path::Path;

impl EngineConfig {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the config file
    ///
    /// # Returns
    ///
    /// * `Ok(EngineConfig)` - Successfully loaded and validated config
    /// * `Err(EngineError::Config)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: EngineConfig = serde_yaml::from_str(yaml)
            .map_err(|e| EngineError::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| EngineError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `max_nesting_depth` must be positive
    /// - `max_template_iterations` must be positive
    /// - `log_level` must be one of trace, debug, info, warn, error
    pub fn validate(&self) -> Result<()> {
        if self.max_nesting_depth == 0 {
            return Err(EngineError::Config(
                "config validation failed: max_nesting_depth must be greater than 0".to_string(),
            ));
        }

        if self.max_template_iterations == 0 {
            return Err(EngineError::Config(
                "config validation failed: max_template_iterations must be greater than 0"
                    .to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "config validation failed: log_level '{}' is not one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}
