//! Scoped per-task timing.

use std::time::{Duration, Instant};
use tracing::info;

/// Logs the task's elapsed time when dropped, including on error exits.
#[derive(Debug)]
pub(crate) struct TaskTimer<'a> {
    task: &'a str,
    started: Instant,
}

impl<'a> TaskTimer<'a> {
    pub(crate) fn start(task: &'a str) -> Self {
        info!(task, "starting task");
        Self {
            task,
            started: Instant::now(),
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for TaskTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        info!(
            task = self.task,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "finished task in {:.2}s",
            elapsed.as_secs_f64()
        );
    }
}
