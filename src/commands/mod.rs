//! Command implementations for the `playbook` binary.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod actions;
mod check;
mod run;

use crate::cli::Command;
use playbook_engine::capability::{BuiltinProvider, CapabilityRegistry};
use playbook_engine::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => run::cmd_run(args),
        Command::Check(args) => check::cmd_check(args),
        Command::Actions => actions::cmd_actions(),
    }
}

/// Capabilities available to playbooks run from the command line.
fn registry() -> CapabilityRegistry {
    CapabilityRegistry::from_provider(&BuiltinProvider)
}
