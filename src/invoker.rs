//! Dispatch of a task's `action`.
//!
//! - `$variable.method` calls `method` on the handle stored in `variable`.
//! - anything else names a capability in the registry.
//!
//! Both receive the context's resolved snapshot. A missing variable, method
//! or capability is a soft failure: it is logged and the task yields null.

use crate::capability::CapabilityRegistry;
use crate::context::ExecutionContext;
use crate::error::{EngineError, Result};
use crate::value::Value;
use tracing::{debug, warn};

/// Parsed form of an `action` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRef<'a> {
    /// `$variable.method`; `method` is `None` when the dot is missing.
    VariableMethod {
        variable: &'a str,
        method: Option<&'a str>,
    },
    Capability(&'a str),
}

impl<'a> ActionRef<'a> {
    pub fn parse(action: &'a str) -> Self {
        match action.strip_prefix('$') {
            Some(reference) => match reference.split_once('.') {
                Some((variable, method)) => ActionRef::VariableMethod {
                    variable,
                    method: Some(method),
                },
                None => ActionRef::VariableMethod {
                    variable: reference,
                    method: None,
                },
            },
            None => ActionRef::Capability(action),
        }
    }
}

/// Resolves one task's action and executes it.
pub struct TaskInvoker<'a> {
    task_name: &'a str,
    action: &'a str,
    ctx: &'a ExecutionContext,
    registry: &'a CapabilityRegistry,
}

impl<'a> TaskInvoker<'a> {
    pub fn new(
        task_name: &'a str,
        action: &'a str,
        ctx: &'a ExecutionContext,
        registry: &'a CapabilityRegistry,
    ) -> Self {
        Self {
            task_name,
            action,
            ctx,
            registry,
        }
    }

    pub fn invoke(&self) -> Result<Value> {
        match ActionRef::parse(self.action) {
            ActionRef::VariableMethod { variable, method } => {
                self.invoke_variable_method(variable, method)
            }
            ActionRef::Capability(name) => self.invoke_capability(name),
        }
    }

    fn invoke_variable_method(&self, variable: &str, method: Option<&str>) -> Result<Value> {
        let task = self.task_name;
        let target = match self.ctx.get_raw(variable) {
            Some(value) if !value.is_null() => value,
            _ => {
                warn!(task, variable, "variable not found for method call");
                return Ok(Value::Null);
            }
        };
        let Some(method) = method else {
            warn!(task, action = self.action, "action has no method name after the variable");
            return Ok(Value::Null);
        };
        let handle = match target {
            Value::Handle(handle) if handle.has_method(method) => handle,
            _ => {
                warn!(task, variable, method, kind = target.kind(), "method not found on variable");
                return Ok(Value::Null);
            }
        };

        debug!(task, variable, method, "calling variable method");
        let params = self.ctx.snapshot()?;
        handle
            .call(method, &params)
            .map_err(|source| EngineError::Capability {
                action: self.action.to_string(),
                source,
            })
    }

    fn invoke_capability(&self, name: &str) -> Result<Value> {
        let Some(capability) = self.registry.get(name) else {
            warn!(task = self.task_name, action = name, "task action not found");
            return Ok(Value::Null);
        };

        debug!(task = self.task_name, action = name, "invoking capability");
        let params = self.ctx.snapshot()?;
        capability
            .execute(&params)
            .map_err(|source| EngineError::Capability {
                action: name.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use crate::error::CapabilityError;
    use crate::test_support::capture_logs;
    use crate::value::{Handle, Variables};

    #[derive(Debug)]
    struct Number(i64);

    impl Handle for Number {
        fn type_name(&self) -> &str {
            "number"
        }

        fn has_method(&self, method: &str) -> bool {
            matches!(method, "double" | "explode")
        }

        fn call(&self, method: &str, _params: &Variables) -> std::result::Result<Value, CapabilityError> {
            match method {
                "double" => Ok(Value::Int(self.0 * 2)),
                _ => Err("boom".into()),
            }
        }
    }

    struct EchoGreeting;

    impl Capability for EchoGreeting {
        fn action_name(&self) -> &str {
            "greet"
        }

        fn execute(&self, params: &Variables) -> std::result::Result<Value, CapabilityError> {
            Ok(params.get("greeting").cloned().unwrap_or_default())
        }
    }

    fn setup() -> (ExecutionContext, CapabilityRegistry) {
        let mut ctx = ExecutionContext::new();
        ctx.set("base", Value::handle(Number(10)));
        ctx.set("plain", 10);
        ctx.set("name", "Ada");
        ctx.set("greeting", "hello {{name}}");
        let mut registry = CapabilityRegistry::new();
        registry.register(EchoGreeting);
        (ctx, registry)
    }

    fn invoke(action: &str) -> Result<Value> {
        let (ctx, registry) = setup();
        TaskInvoker::new("test", action, &ctx, &registry).invoke()
    }

    #[test]
    fn parses_action_references() {
        assert_eq!(ActionRef::parse("dom.get"), ActionRef::Capability("dom.get"));
        assert_eq!(
            ActionRef::parse("$el.text"),
            ActionRef::VariableMethod {
                variable: "el",
                method: Some("text")
            }
        );
        assert_eq!(
            ActionRef::parse("$el"),
            ActionRef::VariableMethod {
                variable: "el",
                method: None
            }
        );
    }

    #[test]
    fn calls_method_on_handle() {
        assert_eq!(invoke("$base.double").unwrap(), Value::Int(20));
    }

    #[test]
    fn capability_receives_resolved_snapshot() {
        assert_eq!(invoke("greet").unwrap(), Value::from("hello Ada"));
    }

    #[test]
    fn unknown_capability_yields_null() {
        assert_eq!(invoke("no.such.capability").unwrap(), Value::Null);
    }

    #[test]
    fn soft_failures_are_logged_as_warnings() {
        let (result, logs) = capture_logs(|| invoke("no.such.capability"));
        assert_eq!(result.unwrap(), Value::Null);
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("task action not found"), "{logs}");

        let (_, logs) = capture_logs(|| invoke("$ghost.double"));
        assert!(logs.contains("variable not found for method call"), "{logs}");
    }

    #[test]
    fn missing_variable_yields_null() {
        assert_eq!(invoke("$ghost.double").unwrap(), Value::Null);
    }

    #[test]
    fn missing_method_yields_null() {
        assert_eq!(invoke("$base.triple").unwrap(), Value::Null);
        assert_eq!(invoke("$plain.double").unwrap(), Value::Null);
        assert_eq!(invoke("$base").unwrap(), Value::Null);
    }

    #[test]
    fn method_errors_propagate() {
        let err = invoke("$base.explode").unwrap_err();
        assert_eq!(err.to_string(), "action '$base.explode' failed: boom");
    }
}
