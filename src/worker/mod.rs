//! The worker loop: recursive execution of a task tree.
//!
//! For each task, in order: bind parameters, check `when`, then either
//! invoke the action or run the nested tasks once per item of the `map`
//! source in a cloned context. Results go through `post_process` and are
//! bound to `output`. Outputs surface bottom-up as the mapping of every
//! non-underscore binding made at a level.

mod debug;
mod params;
mod timer;


pub use debug::{Checkpoint, DebugHook, NoopDebugHook};

use crate::capability::CapabilityRegistry;
use crate::condition;
use crate::config::EngineConfig;
use crate::context::ExecutionContext;
use crate::error::{EngineError, Result};
use crate::invoker::TaskInvoker;
use crate::playbook::{Playbook, TaskNode};
use crate::postprocess::Pipeline;
use crate::template;
use crate::value::{Value, Variables};
use timer::TaskTimer;
use tracing::{debug, info};

/// Context variable holding the 0-based position of the current loop item.
pub const INDEX_VARIABLE: &str = "INDEX";

/// Outputs of a run plus execution counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub outputs: Variables,
    /// Tasks whose body ran (their `when` held).
    pub tasks_run: usize,
    /// Tasks skipped because a `when` condition failed.
    pub tasks_skipped: usize,
    /// Loop items skipped because a filter failed.
    pub items_filtered: usize,
}

/// State threaded through the recursion.
#[derive(Debug, Default)]
struct RunState {
    depth: usize,
    tasks_run: usize,
    tasks_skipped: usize,
    items_filtered: usize,
}

/// Runs playbooks against a capability registry.
pub struct Engine {
    registry: CapabilityRegistry,
    config: EngineConfig,
    debug_hook: Box<dyn DebugHook>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self {
            registry,
            config: EngineConfig::default(),
            debug_hook: Box::new(NoopDebugHook),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_debug_hook(mut self, hook: impl DebugHook + 'static) -> Self {
        self.debug_hook = Box::new(hook);
        self
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `playbook` and return its surfaced outputs.
    pub fn start(&self, playbook: &Playbook) -> Result<Variables> {
        self.run(playbook).map(|report| report.outputs)
    }

    /// Run `playbook` and return its outputs with execution counters.
    ///
    /// The playbook is validated first, so a bad `post_process` chain fails
    /// the run even on tasks whose result would be null.
    pub fn run(&self, playbook: &Playbook) -> Result<RunReport> {
        playbook.validate()?;

        let mut ctx = ExecutionContext::with_max_template_iterations(self.config.max_template_iterations);
        ctx.inject_all(playbook.config.clone());

        let mut state = RunState::default();
        let outputs = self.run_tasks(&playbook.tasks, &mut ctx, &mut state)?;

        info!(
            outputs = outputs.len(),
            tasks_run = state.tasks_run,
            tasks_skipped = state.tasks_skipped,
            items_filtered = state.items_filtered,
            "playbook finished"
        );

        Ok(RunReport {
            outputs,
            tasks_run: state.tasks_run,
            tasks_skipped: state.tasks_skipped,
            items_filtered: state.items_filtered,
        })
    }

    fn run_tasks(
        &self,
        tasks: &[TaskNode],
        ctx: &mut ExecutionContext,
        state: &mut RunState,
    ) -> Result<Variables> {
        let mut outputs = Variables::new();
        for task in tasks {
            self.run_task(task, ctx, state, &mut outputs)
                .map_err(|e| e.in_task(&task.name))?;
        }
        Ok(outputs)
    }

    fn run_task(
        &self,
        task: &TaskNode,
        ctx: &mut ExecutionContext,
        state: &mut RunState,
        outputs: &mut Variables,
    ) -> Result<()> {
        let _timer = TaskTimer::start(&task.name);

        let bound = params::bind(&task.name, &task.params, ctx);
        let saved = ctx.inject_scoped(bound);

        if task.debug {
            self.debug_hook.checkpoint(Checkpoint::Start, task, ctx);
        }

        if !condition::all_hold(&task.when, ctx)? {
            info!(task = %task.name, "conditions not met, skipping task");
            // A skipped task leaves no trace in the context.
            ctx.restore(saved);
            state.tasks_skipped += 1;
            return Ok(());
        }
        state.tasks_run += 1;

        let mut result = match task.loop_parts() {
            Some((source, children)) => self.run_loop(task, source, children, ctx, state, outputs)?,
            None => TaskInvoker::new(&task.name, &task.action, ctx, &self.registry).invoke()?,
        };

        if let Some(processors) = &task.post_process
            && !result.is_null()
        {
            result = Pipeline::build(processors)?.apply(result)?;
        }

        if let Some(output) = &task.output
            && !result.is_null()
        {
            let name = template::resolve_str(ctx, output)?;
            debug!(task = %task.name, output = %name, kind = result.kind(), "binding task result");
            if !name.starts_with('_') {
                outputs.insert(name.clone(), result.clone());
            }
            ctx.set(name, result);
        }

        if task.debug {
            self.debug_hook.checkpoint(Checkpoint::End, task, ctx);
        }

        Ok(())
    }

    /// Run `children` once per item of `source`. Returns the collected
    /// per-iteration outputs, or null when they were merged into `outputs`.
    fn run_loop(
        &self,
        task: &TaskNode,
        source: &str,
        children: &[TaskNode],
        ctx: &mut ExecutionContext,
        state: &mut RunState,
        outputs: &mut Variables,
    ) -> Result<Value> {
        let items = match ctx.get(source, Value::Null)? {
            Value::List(items) => items,
            other => {
                return Err(EngineError::InvalidLoopSource {
                    variable: source.to_string(),
                    found: other.kind().to_string(),
                });
            }
        };

        let depth = state.depth + 1;
        if depth > self.config.max_nesting_depth {
            return Err(EngineError::NestingTooDeep {
                depth,
                max: self.config.max_nesting_depth,
            });
        }

        debug!(task = %task.name, source, items = items.len(), "mapping over items");

        let mut collected = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            if task.debug {
                self.debug_hook.checkpoint(Checkpoint::Iteration(index), task, ctx);
            }

            let mut child = ctx.clone_scope()?;
            child.set(INDEX_VARIABLE, index);
            child.set(task.item_binding(), item);

            if !condition::all_hold(&task.filters, &child)? {
                debug!(task = %task.name, index, "item filtered out");
                state.items_filtered += 1;
                continue;
            }

            state.depth = depth;
            let iteration = self.run_tasks(children, &mut child, state);
            state.depth = depth - 1;
            let iteration = iteration?;

            if task.flatten {
                outputs.extend(iteration);
            } else {
                collected.push(Value::Map(iteration));
            }
        }

        if task.flatten {
            Ok(Value::Null)
        } else {
            Ok(Value::List(collected))
        }
    }
}
