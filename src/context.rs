//! Execution context: the variable store a task list runs against.
//!
//! One root context is seeded from the playbook config. Each loop iteration
//! gets its own context built from the parent's resolved snapshot, so writes
//! made while running an iteration never reach the parent.
//!
//! Reads always go through the template resolver: a stored
//! `"{{base}}/page"` is returned as `"https://example.com/page"`.

use crate::error::Result;
use crate::template;
use crate::value::{Value, Variables};
use tracing::debug;

/// Default bound on template resolution passes.
pub const DEFAULT_MAX_TEMPLATE_ITERATIONS: usize = 16;

/// Prior state of keys overwritten by [`ExecutionContext::inject_scoped`].
pub type SavedBindings = Vec<(String, Option<Value>)>;

/// Hierarchical key/value store with dotted-path reads.
#[derive(Debug)]
pub struct ExecutionContext {
    variables: Variables,
    max_template_iterations: usize,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::with_max_template_iterations(DEFAULT_MAX_TEMPLATE_ITERATIONS)
    }

    pub fn with_max_template_iterations(max_template_iterations: usize) -> Self {
        Self {
            variables: Variables::new(),
            max_template_iterations: max_template_iterations.max(1),
        }
    }

    pub fn max_template_iterations(&self) -> usize {
        self.max_template_iterations
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Read `path` (`a.b.c`), resolving templates in the result.
    ///
    /// Returns `default` when any segment is missing or an intermediate value
    /// is not a mapping. Fails only if the value found holds a placeholder
    /// that cannot be resolved.
    pub fn get(&self, path: &str, default: Value) -> Result<Value> {
        match self.get_raw(path) {
            Some(value) => template::resolve(self, value),
            None => Ok(default),
        }
    }

    /// Read `path` without template resolution.
    pub fn get_raw(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.variables.get(segments.next()?)?;
        for segment in segments {
            current = current.as_map()?.get(segment)?;
        }
        Some(current)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    pub fn delete(&mut self, key: &str) -> Option<Value> {
        let removed = self.variables.remove(key);
        if removed.is_some() {
            debug!(key, "deleted variable");
        }
        removed
    }

    /// Set every entry of `variables`, overwriting existing keys.
    pub fn inject_all(&mut self, variables: Variables) -> &mut Self {
        for (key, value) in variables {
            debug!(key = %key, kind = value.kind(), "injected variable");
            self.variables.insert(key, value);
        }
        self
    }

    /// Like [`inject_all`](Self::inject_all), returning the bindings it
    /// replaced so [`restore`](Self::restore) can undo it.
    pub fn inject_scoped(&mut self, variables: Variables) -> SavedBindings {
        variables
            .into_iter()
            .map(|(key, value)| {
                debug!(key = %key, kind = value.kind(), "injected variable");
                let previous = self.variables.insert(key.clone(), value);
                (key, previous)
            })
            .collect()
    }

    /// Put back bindings saved by [`inject_scoped`](Self::inject_scoped).
    /// Keys that did not exist before are removed.
    pub fn restore(&mut self, saved: SavedBindings) {
        for (key, previous) in saved {
            match previous {
                Some(value) => {
                    self.variables.insert(key, value);
                }
                None => {
                    self.variables.remove(&key);
                }
            }
        }
    }

    /// Every variable with templates resolved, as handed to capabilities.
    pub fn snapshot(&self) -> Result<Variables> {
        self.variables
            .iter()
            .map(|(key, value)| Ok((key.clone(), template::resolve(self, value)?)))
            .collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.variables.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// A fresh context holding a copy of this context's resolved snapshot.
    ///
    /// Handle values are shared (they are opaque references), everything else
    /// is an independent copy. Every variable is resolved here, before the
    /// caller binds anything into the new scope: a stored template naming a
    /// variable that only the child will define fails with
    /// [`EngineError::UnresolvedVariable`](crate::error::EngineError::UnresolvedVariable).
    pub fn clone_scope(&self) -> Result<ExecutionContext> {
        Ok(ExecutionContext {
            variables: self.snapshot()?,
            max_template_iterations: self.max_template_iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    fn nested() -> ExecutionContext {
        let mut ctx = ExecutionContext::new();
        let mut b = Variables::new();
        b.insert("c".to_string(), Value::Int(7));
        let mut a = Variables::new();
        a.insert("b".to_string(), Value::Map(b));
        a.insert("leaf".to_string(), Value::from("text"));
        ctx.set("a", Value::Map(a));
        ctx
    }

    #[test]
    fn restore_undoes_scoped_injection() {
        let mut ctx = ExecutionContext::new();
        ctx.set("kept", "old");
        let mut params = Variables::new();
        params.insert("kept".to_string(), Value::from("new"));
        params.insert("added".to_string(), Value::from("{{missing}}"));

        let saved = ctx.inject_scoped(params);
        assert_eq!(ctx.get_raw("kept"), Some(&Value::from("new")));
        assert!(ctx.contains("added"));

        ctx.restore(saved);
        assert_eq!(ctx.get_raw("kept"), Some(&Value::from("old")));
        assert!(!ctx.contains("added"));
        assert!(ctx.snapshot().is_ok());
    }

    #[test]
    fn get_traverses_nested_maps() {
        let ctx = nested();
        assert_eq!(ctx.get("a.b.c", Value::Null).unwrap(), Value::Int(7));
    }

    #[test]
    fn get_returns_default_on_partial_paths() {
        let ctx = nested();
        let default = Value::from("fallback");
        for path in ["missing", "a.missing", "a.b.missing", "a.leaf.c", "a.b.c.d"] {
            assert_eq!(
                ctx.get(path, default.clone()).unwrap(),
                default,
                "path {path}"
            );
        }
    }

    #[test]
    fn get_resolves_templates() {
        let mut ctx = ExecutionContext::new();
        ctx.set("base", "https://example.com");
        ctx.set("url", "{{ base }}/page");
        assert_eq!(
            ctx.get("url", Value::Null).unwrap(),
            Value::from("https://example.com/page")
        );
    }

    #[test]
    fn get_fails_on_unresolved_template() {
        let mut ctx = ExecutionContext::new();
        ctx.set("url", "{{missing}}/page");
        let err = ctx.get("url", Value::Null).unwrap_err();
        assert!(matches!(err, EngineError::UnresolvedVariable { ref name, .. } if name == "missing"));
    }

    #[test]
    fn inject_all_chains_and_overwrites() {
        let mut ctx = ExecutionContext::new();
        ctx.set("x", 1);
        let mut vars = Variables::new();
        vars.insert("x".to_string(), Value::Int(2));
        vars.insert("y".to_string(), Value::Int(3));
        ctx.inject_all(vars).set("z", 4);
        assert_eq!(ctx.keys(), vec!["x", "y", "z"]);
        assert_eq!(ctx.get("x", Value::Null).unwrap(), Value::Int(2));
    }

    #[test]
    fn delete_removes_key() {
        let mut ctx = ExecutionContext::new();
        ctx.set("x", 1);
        assert_eq!(ctx.delete("x"), Some(Value::Int(1)));
        assert_eq!(ctx.delete("x"), None);
        assert!(!ctx.contains("x"));
    }

    #[test]
    fn snapshot_resolves_every_key() {
        let mut ctx = ExecutionContext::new();
        ctx.set("name", "world");
        ctx.set("greeting", "hello {{name}}");
        let snapshot = ctx.snapshot().unwrap();
        assert_eq!(snapshot["greeting"], Value::from("hello world"));
    }

    #[test]
    fn clone_scope_is_isolated_from_parent() {
        let mut parent = nested();
        parent.set("counter", 1);

        let mut child = parent.clone_scope().unwrap();
        child.set("counter", 2);
        child.set("new_key", "only in child");
        child.delete("a");

        assert_eq!(parent.get("counter", Value::Null).unwrap(), Value::Int(1));
        assert!(!parent.contains("new_key"));
        assert_eq!(parent.get("a.b.c", Value::Null).unwrap(), Value::Int(7));
    }

    #[test]
    fn clone_scope_copies_resolved_values() {
        let mut parent = ExecutionContext::new();
        parent.set("host", "example.com");
        parent.set("url", "https://{{host}}");
        let mut child = parent.clone_scope().unwrap();
        child.set("host", "other.org");
        assert_eq!(
            child.get("url", Value::Null).unwrap(),
            Value::from("https://example.com")
        );
    }
}
