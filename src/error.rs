//! Error types for the playbook engine.
//!
//! Uses thiserror for derive macros. Every variant here is fatal: soft
//! failures (unknown actions, missing methods, untraversable `$path`
//! parameters) are logged by the worker and never surface as errors.

use crate::exit_codes;
use thiserror::Error;

/// Error raised by an external capability or a handle method.
///
/// The engine does not inspect these; they propagate unchanged inside
/// [`EngineError::Capability`].
pub type CapabilityError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A `{{name}}` placeholder referenced a variable that is absent or null.
    #[error("unresolved variable '{name}' in template '{template}'")]
    UnresolvedVariable { name: String, template: String },

    /// Template resolution kept changing past the configured iteration bound.
    #[error("template '{template}' did not settle after {iterations} resolution passes")]
    TemplateCycle { template: String, iterations: usize },

    /// A post-processor configuration named a type with no implementation.
    #[error("unknown post-processor type '{0}'")]
    UnknownProcessorType(String),

    /// A post-processor configuration was missing or had a malformed parameter.
    #[error("invalid '{kind}' post-processor config: {reason}")]
    InvalidProcessorConfig { kind: String, reason: String },

    /// A post-processor rejected its input value.
    #[error("'{kind}' post-processor failed: {reason}")]
    Processing { kind: String, reason: String },

    /// The variable named by `map` does not hold a sequence.
    #[error("variable '{variable}' to map over is not a list (found {found})")]
    InvalidLoopSource { variable: String, found: String },

    /// A numeric comparator was applied to a value that is not a number.
    #[error("cannot compare {what} as a number: {value}")]
    NotNumeric { what: String, value: String },

    /// Loop nesting went beyond `max_nesting_depth`.
    #[error("loop nesting depth {depth} exceeds the configured maximum of {max}")]
    NestingTooDeep { depth: usize, max: usize },

    /// A capability or handle method returned an error.
    #[error("action '{action}' failed: {source}")]
    Capability {
        action: String,
        #[source]
        source: CapabilityError,
    },

    /// Engine configuration could not be read, parsed or validated.
    #[error("{0}")]
    Config(String),

    /// The playbook could not be read, parsed or validated.
    #[error("invalid playbook: {0}")]
    Playbook(String),

    /// A fatal error raised while running the named task.
    #[error("task '{task}' failed: {source}")]
    Task {
        task: String,
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// Attach the name of the task being run, unless a nested task already did.
    pub fn in_task(self, task: &str) -> Self {
        match self {
            EngineError::Task { .. } => self,
            other => EngineError::Task {
                task: task.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Name of the innermost task the error was raised in, if any.
    pub fn task_name(&self) -> Option<&str> {
        match self {
            EngineError::Task { task, .. } => Some(task),
            _ => None,
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            EngineError::Config(_) => exit_codes::USER_ERROR,
            EngineError::Playbook(_) => exit_codes::INVALID_PLAYBOOK,
            _ => exit_codes::RUN_FAILURE,
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_task_wraps_once() {
        let err = EngineError::UnknownProcessorType("nope".to_string())
            .in_task("inner")
            .in_task("outer");
        assert_eq!(err.task_name(), Some("inner"));
        assert_eq!(
            err.to_string(),
            "task 'inner' failed: unknown post-processor type 'nope'"
        );
    }

    #[test]
    fn config_error_has_user_exit_code() {
        let err = EngineError::Config("bad".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn playbook_error_has_invalid_playbook_exit_code() {
        let err = EngineError::Playbook("no tasks".to_string());
        assert_eq!(err.exit_code(), exit_codes::INVALID_PLAYBOOK);
    }

    #[test]
    fn run_errors_have_run_failure_exit_code() {
        let err = EngineError::InvalidLoopSource {
            variable: "rows".to_string(),
            found: "string".to_string(),
        }
        .in_task("loop");
        assert_eq!(err.exit_code(), exit_codes::RUN_FAILURE);
    }

    #[test]
    fn capability_error_keeps_source() {
        let source: CapabilityError = "element not found".into();
        let err = EngineError::Capability {
            action: "dom.query".to_string(),
            source,
        };
        assert_eq!(
            err.to_string(),
            "action 'dom.query' failed: element not found"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
