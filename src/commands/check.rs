//! Implementation of the `playbook check` command.
//!
//! Loading already runs the structural checks; on top of that every leaf
//! action is looked up in the registry. Unknown actions only yield null at
//! run time, so they are reported as warnings and do not fail the check.

use crate::cli::CheckArgs;
use playbook_engine::capability::CapabilityRegistry;
use playbook_engine::config::EngineConfig;
use playbook_engine::error::Result;
use playbook_engine::logging::init_logging;
use playbook_engine::playbook::Playbook;
use tracing::warn;

pub fn cmd_check(args: CheckArgs) -> Result<()> {
    init_logging(&EngineConfig::default(), false);

    let playbook = Playbook::load(&args.playbook)?;
    let registry = super::registry();

    let unknown = unknown_actions(&playbook, &registry);
    for (task, action) in &unknown {
        warn!(task = %task, action = %action, "action is not provided by any capability");
    }

    println!(
        "{}: {} tasks, {} unknown actions",
        args.playbook.display(),
        playbook.walk().len(),
        unknown.len()
    );
    Ok(())
}

/// `(task, action)` pairs naming a capability the registry does not have.
/// Variable-method actions are resolved at run time and never reported.
fn unknown_actions(playbook: &Playbook, registry: &CapabilityRegistry) -> Vec<(String, String)> {
    playbook
        .walk()
        .into_iter()
        .filter(|task| {
            !task.action.is_empty() && !task.action.starts_with('$') && !registry.contains(&task.action)
        })
        .map(|task| (task.name.clone(), task.action.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_only_unregistered_capabilities() {
        let playbook = Playbook::from_yaml(
            r#"
tasks:
  - name: pause
    action: wait
    duration: 0
  - name: open
    action: browser.open
  - name: cards
    map: cards
    tasks:
      - name: text
        action: $item.text
      - name: save
        action: export.csv
"#,
        )
        .unwrap();

        let unknown = unknown_actions(&playbook, &super::super::registry());
        assert_eq!(
            unknown,
            vec![
                ("open".to_string(), "browser.open".to_string()),
                ("save".to_string(), "export.csv".to_string()),
            ]
        );
    }
}
