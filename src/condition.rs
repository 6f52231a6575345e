//! Predicates over a single context variable.
//!
//! Used for task gating (`when`) and per-item loop gating (`filters`).
//! Every comparator set on a condition must hold; a condition with no
//! comparators is always true.

use crate::context::ExecutionContext;
use crate::error::{EngineError, Result};
use crate::template;
use crate::value::Value;
use serde::Deserialize;

/// A condition on one variable, with optional comparators.
///
/// ```yaml
/// when:
///   - variable: page_count
///     greater_than: "{{ min_pages }}"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Condition {
    /// Dotted path of the variable under test.
    pub variable: String,
    #[serde(default)]
    pub is_defined: Option<bool>,
    #[serde(default)]
    pub equals: Option<Value>,
    #[serde(default)]
    pub not_equals: Option<Value>,
    #[serde(default)]
    pub greater_than: Option<Value>,
    #[serde(default)]
    pub less_than: Option<Value>,
}

impl Condition {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            ..Self::default()
        }
    }

    pub fn is_defined(mut self, defined: bool) -> Self {
        self.is_defined = Some(defined);
        self
    }

    pub fn equals(mut self, value: impl Into<Value>) -> Self {
        self.equals = Some(value.into());
        self
    }

    pub fn not_equals(mut self, value: impl Into<Value>) -> Self {
        self.not_equals = Some(value.into());
        self
    }

    pub fn greater_than(mut self, value: impl Into<Value>) -> Self {
        self.greater_than = Some(value.into());
        self
    }

    pub fn less_than(mut self, value: impl Into<Value>) -> Self {
        self.less_than = Some(value.into());
        self
    }

    /// Evaluate against `ctx`. Comparators are checked in declaration order
    /// and evaluation stops at the first one that does not hold.
    pub fn evaluate(&self, ctx: &ExecutionContext) -> Result<bool> {
        let value = ctx.get(&self.variable, Value::Null)?;

        if let Some(defined) = self.is_defined
            && defined == value.is_null()
        {
            return Ok(false);
        }

        if let Some(expected) = &self.equals
            && value != template::resolve(ctx, expected)?
        {
            return Ok(false);
        }

        if let Some(unexpected) = &self.not_equals
            && value == template::resolve(ctx, unexpected)?
        {
            return Ok(false);
        }

        if let Some(bound) = &self.greater_than {
            let bound = template::resolve(ctx, bound)?;
            let holds = self.number(&value)? > number(&bound, "greater_than bound")?;
            if !holds {
                return Ok(false);
            }
        }

        if let Some(bound) = &self.less_than {
            let bound = template::resolve(ctx, bound)?;
            let holds = self.number(&value)? < number(&bound, "less_than bound")?;
            if !holds {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn number(&self, value: &Value) -> Result<f64> {
        number(value, &format!("variable '{}'", self.variable))
    }
}

/// Evaluate every condition, short-circuiting on the first false one.
pub fn all_hold(conditions: &[Condition], ctx: &ExecutionContext) -> Result<bool> {
    for condition in conditions {
        if !condition.evaluate(ctx)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn number(value: &Value, what: &str) -> Result<f64> {
    value.as_f64().ok_or_else(|| EngineError::NotNumeric {
        what: what.to_string(),
        value: value.to_display_string(),
    })
}
