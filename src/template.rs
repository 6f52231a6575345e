//! Placeholder resolution for `{{ name }}` templates.
//!
//! # Syntax
//!
//! - `{{name}}` - Substitutes the string form of variable `name`
//! - `{{ a.b }}` - Dotted paths read nested mappings; whitespace is trimmed
//!
//! # Error Handling
//!
//! Placeholders naming an absent (or null) variable are an error, never an
//! empty substitution. Resolution is repeated so a variable whose value is
//! itself a template gets expanded too; it stops as soon as a pass changes
//! nothing, and fails with [`EngineError::TemplateCycle`] if the string is
//! still changing after the context's iteration bound.

use crate::context::ExecutionContext;
use crate::error::{EngineError, Result};
use crate::value::Value;
use regex::Regex;
use std::sync::LazyLock;

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("Invalid placeholder regex"));

/// Whether `text` contains at least one placeholder.
pub fn has_placeholders(text: &str) -> bool {
    PLACEHOLDER_REGEX.is_match(text)
}

/// Resolve templates in `value`. Non-string values are returned unchanged.
pub fn resolve(ctx: &ExecutionContext, value: &Value) -> Result<Value> {
    match value {
        Value::String(text) => resolve_str(ctx, text).map(Value::String),
        other => Ok(other.clone()),
    }
}

/// Resolve every placeholder in `template` against `ctx`.
pub fn resolve_str(ctx: &ExecutionContext, template: &str) -> Result<String> {
    let max_iterations = ctx.max_template_iterations();
    let mut current = template.to_string();

    for _ in 0..max_iterations {
        if !has_placeholders(&current) {
            return Ok(current);
        }
        let next = substitute_once(ctx, &current, template)?;
        if next == current {
            return Ok(current);
        }
        current = next;
    }

    if has_placeholders(&current) && substitute_once(ctx, &current, template)? != current {
        return Err(EngineError::TemplateCycle {
            template: template.to_string(),
            iterations: max_iterations,
        });
    }
    Ok(current)
}

fn substitute_once(ctx: &ExecutionContext, current: &str, template: &str) -> Result<String> {
    let mut rendered = String::with_capacity(current.len());
    let mut last_end = 0;

    for caps in PLACEHOLDER_REGEX.captures_iter(current) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let name = caps[1].trim();
        let value = match ctx.get_raw(name) {
            Some(value) if !value.is_null() => value,
            _ => {
                return Err(EngineError::UnresolvedVariable {
                    name: name.to_string(),
                    template: template.to_string(),
                });
            }
        };
        rendered.push_str(&current[last_end..whole.start()]);
        rendered.push_str(&value.to_display_string());
        last_end = whole.end();
    }

    rendered.push_str(&current[last_end..]);
    Ok(rendered)
}
