//! Playbook and task node definitions.

use crate::condition::Condition;
use crate::postprocess::ProcessorConfig;
use crate::value::{Value, Variables};
use serde::{Deserialize, Deserializer};

/// Binding name for the current loop item when `item_name` is not set.
pub const DEFAULT_ITEM_NAME: &str = "item";

/// A complete playbook.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Playbook {
    /// Top-level tasks, run in order.
    pub tasks: Vec<TaskNode>,

    /// Variables seeded into the root context.
    ///
    /// Every loop iteration starts from a resolved copy of its parent, so a
    /// value templated on a per-item binding (`"n={{item}}"`) fails at the
    /// first loop. Put such templates in the parameters of the nested tasks.
    #[serde(default)]
    pub config: Variables,
}

/// One playbook step.
///
/// Leaf tasks invoke `action`. Tasks with `map` and `tasks` run the nested
/// task list once per item of the mapped sequence. Every key outside the
/// fixed attribute set lands in `params` and is injected into the context
/// before the task runs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskNode {
    /// Human label, used in logs and error messages.
    pub name: String,

    /// Capability name, or `$variable.method`.
    #[serde(default)]
    pub action: String,

    /// Variable to bind the result to. May contain templates.
    /// A leading `_` keeps the binding out of the surfaced outputs.
    #[serde(default)]
    pub output: Option<String>,

    /// Gating conditions, all of which must hold.
    #[serde(default, deserialize_with = "null_as_default")]
    pub when: Vec<Condition>,

    /// Per-item conditions for `map` loops.
    #[serde(default, deserialize_with = "null_as_default")]
    pub filters: Vec<Condition>,

    /// Name of the context variable holding the sequence to iterate.
    #[serde(default)]
    pub map: Option<String>,

    /// Nested tasks run for each item.
    #[serde(default)]
    pub tasks: Option<Vec<TaskNode>>,

    /// Binding name for the current item (default `item`).
    #[serde(default)]
    pub item_name: Option<String>,

    /// Merge each iteration's outputs into the enclosing outputs instead of
    /// collecting them into a list.
    #[serde(default)]
    pub flatten: bool,

    /// Processors applied to the result before binding.
    #[serde(default)]
    pub post_process: Option<Vec<ProcessorConfig>>,

    /// Trigger the debug hook at this task's checkpoints.
    #[serde(default)]
    pub debug: bool,

    /// Remaining task-specific parameters.
    #[serde(flatten)]
    pub params: Variables,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Playbook {
    pub fn new(tasks: Vec<TaskNode>) -> Self {
        Self {
            tasks,
            config: Variables::new(),
        }
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Every task in the tree, depth first, in declaration order.
    pub fn walk(&self) -> Vec<&TaskNode> {
        fn visit<'a>(tasks: &'a [TaskNode], out: &mut Vec<&'a TaskNode>) {
            for task in tasks {
                out.push(task);
                if let Some(children) = &task.tasks {
                    visit(children, out);
                }
            }
        }

        let mut out = Vec::new();
        visit(&self.tasks, &mut out);
        out
    }
}

impl TaskNode {
    /// A leaf task invoking `action`.
    pub fn new(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: action.into(),
            ..Self::default()
        }
    }

    /// A loop task running `tasks` once per item of the variable `source`.
    pub fn map_over(name: impl Into<String>, source: impl Into<String>, tasks: Vec<TaskNode>) -> Self {
        Self {
            name: name.into(),
            map: Some(source.into()),
            tasks: Some(tasks),
            ..Self::default()
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.output = Some(name.into());
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.when.push(condition);
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filters.push(condition);
        self
    }

    pub fn item_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = Some(name.into());
        self
    }

    pub fn flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    pub fn post_process(mut self, processor: ProcessorConfig) -> Self {
        self.post_process.get_or_insert_with(Vec::new).push(processor);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The loop source and nested tasks, when both are set.
    pub fn loop_parts(&self) -> Option<(&str, &[TaskNode])> {
        match (&self.map, &self.tasks) {
            (Some(source), Some(tasks)) => Some((source.as_str(), tasks.as_slice())),
            _ => None,
        }
    }

    pub fn item_binding(&self) -> &str {
        self.item_name.as_deref().unwrap_or(DEFAULT_ITEM_NAME)
    }
}
