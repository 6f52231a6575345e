//! CLI argument parsing for the `playbook` binary.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Run declarative task playbooks.
///
/// A playbook is a YAML tree of tasks: each task invokes an action or maps
/// nested tasks over a list, and named results are printed as JSON.
#[derive(Parser, Debug)]
#[command(name = "playbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a playbook and print its outputs.
    ///
    /// Outputs are written to stdout as pretty-printed JSON; logs go to stderr.
    Run(RunArgs),

    /// Validate a playbook without running it.
    ///
    /// Reports structural problems and actions that no capability provides.
    Check(CheckArgs),

    /// List the registered capability names.
    Actions,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the playbook file.
    pub playbook: PathBuf,

    /// Engine config file (YAML).
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Override a playbook config variable (KEY=VALUE, VALUE parsed as YAML).
    /// May be repeated.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Wait for Enter at the checkpoints of tasks marked `debug: true`.
    #[arg(long)]
    pub pause: bool,

    /// Enable debug logging.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

/// Arguments for the `check` command.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to the playbook file.
    pub playbook: PathBuf,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_run_minimal() {
        let cli = Cli::try_parse_from(["playbook", "run", "scrape.yaml"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.playbook, PathBuf::from("scrape.yaml"));
            assert!(args.config.is_none());
            assert!(args.set.is_empty());
            assert!(!args.pause);
            assert!(!args.verbose);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_with_all_options() {
        let cli = Cli::try_parse_from([
            "playbook",
            "run",
            "scrape.yaml",
            "--config",
            "engine.yaml",
            "--set",
            "base=https://example.com",
            "--set",
            "pages=[1, 2]",
            "--pause",
            "-v",
        ])
        .unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.config, Some(PathBuf::from("engine.yaml")));
            assert_eq!(args.set, vec!["base=https://example.com", "pages=[1, 2]"]);
            assert!(args.pause);
            assert!(args.verbose);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_check() {
        let cli = Cli::try_parse_from(["playbook", "check", "scrape.yaml"]).unwrap();
        assert!(matches!(cli.command, Command::Check(_)));
    }

    #[test]
    fn parse_actions() {
        let cli = Cli::try_parse_from(["playbook", "actions"]).unwrap();
        assert!(matches!(cli.command, Command::Actions));
    }

    #[test]
    fn run_requires_playbook() {
        assert!(Cli::try_parse_from(["playbook", "run"]).is_err());
    }
}
