//! Pause-and-inspect hook for tasks marked `debug: true`.

use crate::context::ExecutionContext;
use crate::playbook::TaskNode;
use std::fmt;

/// Where in a task's execution the hook fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// Parameters are bound; conditions not yet evaluated.
    Start,
    /// Before the child context of loop iteration `n` is created.
    Iteration(usize),
    /// Result is bound and surfaced.
    End,
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checkpoint::Start => write!(f, "start"),
            Checkpoint::Iteration(index) => write!(f, "iteration {}", index),
            Checkpoint::End => write!(f, "end"),
        }
    }
}

/// Called at each checkpoint of a task with `debug` set.
///
/// Implementations may block (e.g. wait for an operator), but must not
/// change the outcome of the run.
pub trait DebugHook {
    fn checkpoint(&self, checkpoint: Checkpoint, task: &TaskNode, ctx: &ExecutionContext);
}

/// The default hook: does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDebugHook;

impl DebugHook for NoopDebugHook {
    fn checkpoint(&self, _checkpoint: Checkpoint, _task: &TaskNode, _ctx: &ExecutionContext) {}
}
