//! Playbook engine: runs declarative task trees against pluggable capabilities.
//!
//! A playbook is an ordered tree of tasks. Each task either invokes an
//! action (a registered [`capability::Capability`] or a method on a value
//! held in the context) or maps a nested task list over a sequence. Results
//! flow through post-processors into named context variables, and the
//! non-underscore bindings surface as the run's outputs.

pub mod capability;
pub mod condition;
pub mod config;
pub mod context;
pub mod error;
pub mod exit_codes;
pub mod invoker;
pub mod logging;
pub mod playbook;
pub mod postprocess;
pub mod template;
pub mod value;
pub mod worker;

#[cfg(test)]
mod test_support;

pub use capability::{Capability, CapabilityProvider, CapabilityRegistry};
pub use config::EngineConfig;
pub use context::ExecutionContext;
pub use error::{EngineError, Result};
pub use playbook::{Playbook, TaskNode};
pub use value::{Handle, Value, Variables};
pub use worker::{Engine, RunReport};
