//! Implementation of the `playbook run` command.

use crate::cli::RunArgs;
use playbook_engine::config::EngineConfig;
use playbook_engine::context::ExecutionContext;
use playbook_engine::error::{EngineError, Result};
use playbook_engine::logging::init_logging;
use playbook_engine::playbook::{Playbook, TaskNode};
use playbook_engine::value::{Value, Variables};
use playbook_engine::worker::{Checkpoint, DebugHook, Engine};
use std::io::{BufRead, Write};
use tracing::info;

pub fn cmd_run(args: RunArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    init_logging(&config, args.verbose);

    let mut playbook = Playbook::load(&args.playbook)?;
    playbook.config.extend(parse_overrides(&args.set)?);

    let mut engine = Engine::new(super::registry()).with_config(config);
    if args.pause {
        engine = engine.with_debug_hook(StdinPause);
    }

    info!(playbook = %args.playbook.display(), "running playbook");
    let report = engine.run(&playbook)?;

    let rendered = serde_json::to_string_pretty(&Value::Map(report.outputs))
        .map_err(|e| EngineError::Playbook(format!("failed to render outputs: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}

/// Parse `KEY=VALUE` overrides. Values are read as YAML scalars or
/// collections; anything that does not parse stays a string.
fn parse_overrides(pairs: &[String]) -> Result<Variables> {
    pairs
        .iter()
        .map(|pair| {
            let (key, raw) = pair.split_once('=').ok_or_else(|| {
                EngineError::Config(format!("invalid --set '{}': expected KEY=VALUE", pair))
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(EngineError::Config(format!(
                    "invalid --set '{}': key must not be empty",
                    pair
                )));
            }
            let value = if raw.trim().is_empty() {
                Value::from(raw)
            } else {
                serde_yaml::from_str::<Value>(raw).unwrap_or_else(|_| Value::from(raw))
            };
            Ok((key.to_string(), value))
        })
        .collect()
}

/// Blocks on stdin at every debug checkpoint.
struct StdinPause;

impl DebugHook for StdinPause {
    fn checkpoint(&self, checkpoint: Checkpoint, task: &TaskNode, ctx: &ExecutionContext) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[debug] task '{}' at {}; variables: {}",
            task.name,
            checkpoint,
            ctx.keys().join(", ")
        );
        let _ = write!(stderr, "press Enter to continue...");
        let _ = stderr.flush();

        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
    }
}
