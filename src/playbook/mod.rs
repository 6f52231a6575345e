//! The playbook: an ordered tree of tasks plus top-level configuration.
//!
//! This module provides:
//! - Model: [`Playbook`] and [`TaskNode`], deserializable from YAML/JSON
//! - Loader: reading a playbook file (the only place source text is parsed)
//! - Validation: static checks run before execution

mod loader;
mod model;
mod validate;


pub use model::{DEFAULT_ITEM_NAME, Playbook, TaskNode};
