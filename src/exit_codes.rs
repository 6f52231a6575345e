//! Exit code constants for the `playbook` CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable files, invalid engine config)
//! - 2: Invalid playbook (parse or static validation failure)
//! - 3: Run failure (a fatal error aborted the playbook)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, missing files, or an invalid engine config.
pub const USER_ERROR: i32 = 1;

/// The playbook could not be parsed or failed static validation.
pub const INVALID_PLAYBOOK: i32 = 2;

/// A fatal error aborted the playbook run.
pub const RUN_FAILURE: i32 = 3;
