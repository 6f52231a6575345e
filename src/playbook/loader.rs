//! Reading playbooks from YAML.
//!
//! The engine never parses source text itself; this is the hand-off used by
//! the CLI and embedding code that keep playbooks on disk.

use super::model::Playbook;
use crate::error::{EngineError, Result};
use std::path::Path;

impl Playbook {
    /// Load and validate a playbook file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Playbook(format!(
                "failed to read playbook '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate a playbook from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let playbook: Playbook = serde_yaml::from_str(yaml)
            .map_err(|e| EngineError::Playbook(format!("failed to parse playbook YAML: {}", e)))?;

        playbook.validate()?;
        Ok(playbook)
    }
}
