//! Binding of a task's extra parameters.
//!
//! String parameters starting with `$` are references into the context:
//! `$listing.url` reads `listing`, then its `url` entry (or attribute, for
//! handles). A reference that cannot be followed is logged and bound as null.

use crate::context::ExecutionContext;
use crate::value::{Value, Variables};
use tracing::warn;

/// Resolve `$` references in `params` against `ctx`.
pub(crate) fn bind(task: &str, params: &Variables, ctx: &ExecutionContext) -> Variables {
    params
        .iter()
        .map(|(key, value)| {
            let bound = match value.as_str().and_then(|s| s.strip_prefix('$')) {
                Some(path) => follow(task, key, path, ctx),
                None => value.clone(),
            };
            (key.clone(), bound)
        })
        .collect()
}

fn follow(task: &str, key: &str, path: &str, ctx: &ExecutionContext) -> Value {
    let mut segments = path.split('.');
    let root = segments.next().unwrap_or_default();

    let mut current = match ctx.get_raw(root) {
        Some(value) if !value.is_null() => value.clone(),
        _ => {
            warn!(task, parameter = key, variable = root, "variable not found in context for parameter");
            return Value::Null;
        }
    };

    for segment in segments {
        let next = match &current {
            Value::Map(map) => map.get(segment).cloned(),
            Value::Handle(handle) => handle.attribute(segment),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => {
                warn!(task, parameter = key, segment, path, "could not resolve parameter reference");
                return Value::Null;
            }
        }
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CapabilityError;
    use crate::value::Handle;

    #[derive(Debug)]
    struct Row;

    impl Handle for Row {
        fn type_name(&self) -> &str {
            "row"
        }

        fn has_method(&self, _method: &str) -> bool {
            false
        }

        fn call(&self, _method: &str, _params: &Variables) -> Result<Value, CapabilityError> {
            Ok(Value::Null)
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            (name == "id").then(|| Value::Int(42))
        }
    }

    fn ctx() -> ExecutionContext {
        let mut ctx = ExecutionContext::new();
        let mut listing = Variables::new();
        listing.insert("url".to_string(), Value::from("/flat/1"));
        listing.insert("row".to_string(), Value::handle(Row));
        ctx.set("listing", Value::Map(listing));
        ctx.set("selector", ".card");
        ctx
    }

    fn bind_one(value: impl Into<Value>) -> Value {
        let mut params = Variables::new();
        params.insert("p".to_string(), value.into());
        bind("test", &params, &ctx()).remove("p").unwrap()
    }

    #[test]
    fn literals_are_kept() {
        assert_eq!(bind_one("plain"), Value::from("plain"));
        assert_eq!(bind_one(3), Value::Int(3));
        assert_eq!(bind_one("{{selector}}"), Value::from("{{selector}}"));
    }

    #[test]
    fn whole_variable_reference() {
        assert_eq!(bind_one("$selector"), Value::from(".card"));
    }

    #[test]
    fn mapping_segments() {
        assert_eq!(bind_one("$listing.url"), Value::from("/flat/1"));
    }

    #[test]
    fn attribute_segments_on_handles() {
        assert_eq!(bind_one("$listing.row.id"), Value::Int(42));
        assert_eq!(bind_one("$listing.row.missing"), Value::Null);
    }

    #[test]
    fn unresolved_references_become_null() {
        assert_eq!(bind_one("$ghost"), Value::Null);
        assert_eq!(bind_one("$listing.price"), Value::Null);
        assert_eq!(bind_one("$selector.length"), Value::Null);
    }
}
