//! Implementation of the `playbook actions` command.

use playbook_engine::error::Result;

pub fn cmd_actions() -> Result<()> {
    for name in super::registry().names() {
        println!("{}", name);
    }
    Ok(())
}
