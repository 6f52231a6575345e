//! Static playbook checks.

use super::model::{Playbook, TaskNode};
use crate::error::{EngineError, Result};
use crate::postprocess::{PROCESSOR_TYPES, Pipeline};

impl Playbook {
    /// Every structural problem in the task tree, in declaration order.
    ///
    /// Checks:
    /// - task names are non-empty
    /// - `map` and `tasks` are declared together
    /// - leaf tasks have an `action`
    /// - every `post_process` chain builds
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        check_tasks(&self.tasks, "", &mut problems);
        problems
    }

    /// Fail with every problem found, if any.
    pub fn validate(&self) -> Result<()> {
        let problems = self.problems();
        if problems.is_empty() {
            return Ok(());
        }
        Err(EngineError::Playbook(problems.join("; ")))
    }
}

fn check_tasks(tasks: &[TaskNode], parent: &str, problems: &mut Vec<String>) {
    for (index, task) in tasks.iter().enumerate() {
        let label = if task.name.trim().is_empty() {
            problems.push(format!("task #{} under '{}' has no name", index + 1, display(parent)));
            format!("{}#{}", parent, index + 1)
        } else {
            task.name.clone()
        };

        match (&task.map, &task.tasks) {
            (Some(_), None) => {
                problems.push(format!("task '{}' sets 'map' without nested 'tasks'", label));
            }
            (None, Some(_)) => {
                problems.push(format!("task '{}' has nested 'tasks' without 'map'", label));
            }
            (None, None) if task.action.trim().is_empty() => {
                problems.push(format!("task '{}' has no 'action'", label));
            }
            _ => {}
        }

        if let Some(configs) = &task.post_process
            && let Err(e) = Pipeline::build(configs)
        {
            match e {
                EngineError::UnknownProcessorType(_) => problems.push(format!(
                    "task '{}': {} (known types: {})",
                    label,
                    e,
                    PROCESSOR_TYPES.join(", ")
                )),
                _ => problems.push(format!("task '{}': {}", label, e)),
            }
        }

        if let Some(children) = &task.tasks {
            check_tasks(children, &label, problems);
        }
    }
}

fn display(parent: &str) -> &str {
    if parent.is_empty() { "<root>" } else { parent }
}
