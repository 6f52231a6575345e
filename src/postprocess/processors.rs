//! Built-in post-processor implementations.
//!
//! String-oriented processors convert non-string input with
//! [`Value::to_display_string`] first.

use super::{PostProcessor, ProcessorConfig};
use crate::error::{EngineError, Result};
use crate::value::Value;
use regex::Regex;
use std::sync::LazyLock;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("Invalid slug regex"));

static SLUG_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("Invalid slug separator regex"));

fn into_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_display_string(),
    }
}

fn compile(config: &ProcessorConfig, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| config.invalid(format!("invalid pattern '{pattern}': {e}")))
}

fn failure(kind: &str, reason: impl Into<String>) -> EngineError {
    EngineError::Processing {
        kind: kind.to_string(),
        reason: reason.into(),
    }
}

/// First match of `pattern`, or one of its capture groups.
#[derive(Debug)]
pub struct RegexExtractProcessor {
    pattern: Regex,
    group: usize,
}

impl RegexExtractProcessor {
    pub(crate) fn from_config(config: &ProcessorConfig) -> Result<Self> {
        let pattern = compile(config, &config.required_str("pattern")?)?;
        let group = config.int_or("group", 0)?;
        let group = usize::try_from(group)
            .ok()
            .filter(|g| *g < pattern.captures_len())
            .ok_or_else(|| {
                config.invalid(format!(
                    "group {group} does not exist in pattern '{}'",
                    pattern.as_str()
                ))
            })?;
        Ok(Self { pattern, group })
    }
}

impl PostProcessor for RegexExtractProcessor {
    fn kind(&self) -> &'static str {
        "regex_extract"
    }

    fn process(&self, value: Value) -> Result<Value> {
        let text = into_string(value);
        Ok(self
            .pattern
            .captures(&text)
            .and_then(|caps| caps.get(self.group))
            .map_or(Value::Null, |m| Value::from(m.as_str())))
    }
}

/// Literal substring replacement.
#[derive(Debug)]
pub struct ReplaceProcessor {
    pub old: String,
    pub new: String,
}

impl PostProcessor for ReplaceProcessor {
    fn kind(&self) -> &'static str {
        "replace"
    }

    fn process(&self, value: Value) -> Result<Value> {
        Ok(Value::String(into_string(value).replace(&self.old, &self.new)))
    }
}

/// Target type of a `cast`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastTarget {
    Int,
    Float,
    Str,
    Bool,
}

impl CastTarget {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "str" => Some(Self::Str),
            "bool" => Some(Self::Bool),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct CastProcessor {
    pub to: CastTarget,
}

impl CastProcessor {
    pub(crate) fn from_config(config: &ProcessorConfig) -> Result<Self> {
        let to = config.required_str("to")?;
        let to = CastTarget::from_str(&to).ok_or_else(|| {
            config.invalid(format!("cannot cast to '{to}' (expected int, float, str or bool)"))
        })?;
        Ok(Self { to })
    }

    fn to_int(value: &Value) -> Result<Value> {
        match value {
            Value::Int(i) => Ok(Value::Int(*i)),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::Float(f) if f.is_finite() && f.abs() < i64::MAX as f64 => {
                Ok(Value::Int(f.trunc() as i64))
            }
            Value::Float(f) => Err(failure("cast", format!("float {f} is out of range for int"))),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| failure("cast", format!("invalid literal for int: '{s}'"))),
            other => Err(failure("cast", format!("cannot cast {} to int", other.kind()))),
        }
    }

    fn to_float(value: &Value) -> Result<Value> {
        match value {
            Value::Int(_) | Value::Float(_) | Value::Bool(_) | Value::String(_) => value
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| {
                    failure(
                        "cast",
                        format!("invalid literal for float: '{}'", value.to_display_string()),
                    )
                }),
            other => Err(failure("cast", format!("cannot cast {} to float", other.kind()))),
        }
    }
}

impl PostProcessor for CastProcessor {
    fn kind(&self) -> &'static str {
        "cast"
    }

    fn process(&self, value: Value) -> Result<Value> {
        match self.to {
            CastTarget::Int => Self::to_int(&value),
            CastTarget::Float => Self::to_float(&value),
            CastTarget::Str => Ok(Value::String(into_string(value))),
            CastTarget::Bool => Ok(Value::Bool(value.is_truthy())),
        }
    }
}

/// Trim whitespace, or the given set of characters.
#[derive(Debug)]
pub struct StripProcessor {
    pub chars: Option<String>,
}

impl PostProcessor for StripProcessor {
    fn kind(&self) -> &'static str {
        "strip"
    }

    fn process(&self, value: Value) -> Result<Value> {
        let text = into_string(value);
        let stripped = match &self.chars {
            Some(chars) => text.trim_matches(|c: char| chars.contains(c)),
            None => text.trim(),
        };
        Ok(Value::from(stripped))
    }
}

#[derive(Debug)]
pub struct LowerProcessor;

impl PostProcessor for LowerProcessor {
    fn kind(&self) -> &'static str {
        "lower"
    }

    fn process(&self, value: Value) -> Result<Value> {
        Ok(Value::String(into_string(value).to_lowercase()))
    }
}

#[derive(Debug)]
pub struct UpperProcessor;

impl PostProcessor for UpperProcessor {
    fn kind(&self) -> &'static str {
        "upper"
    }

    fn process(&self, value: Value) -> Result<Value> {
        Ok(Value::String(into_string(value).to_uppercase()))
    }
}

/// Split on `separator` and keep the part at `index` (negative counts from the end).
#[derive(Debug)]
pub struct SplitProcessor {
    pub separator: String,
    pub index: i64,
}

impl SplitProcessor {
    pub(crate) fn from_config(config: &ProcessorConfig) -> Result<Self> {
        let separator = config.required_str("separator")?;
        if separator.is_empty() {
            return Err(config.invalid("separator must not be empty"));
        }
        Ok(Self {
            separator,
            index: config.int_or("index", 0)?,
        })
    }
}

impl PostProcessor for SplitProcessor {
    fn kind(&self) -> &'static str {
        "split"
    }

    fn process(&self, value: Value) -> Result<Value> {
        let text = into_string(value);
        let parts: Vec<&str> = text.split(self.separator.as_str()).collect();
        let position = if self.index < 0 {
            i64::try_from(parts.len()).ok().map(|len| len + self.index)
        } else {
            Some(self.index)
        };
        position
            .and_then(|p| usize::try_from(p).ok())
            .and_then(|p| parts.get(p))
            .map(|part| Value::from(*part))
            .ok_or_else(|| {
                failure(
                    "split",
                    format!(
                        "index {} out of range for {} parts split on '{}'",
                        self.index,
                        parts.len(),
                        self.separator
                    ),
                )
            })
    }
}

/// Regex substitution of every match. The replacement uses `$1` / `${name}`
/// group references.
#[derive(Debug)]
pub struct RegexReplaceProcessor {
    pattern: Regex,
    replacement: String,
}

impl RegexReplaceProcessor {
    pub(crate) fn from_config(config: &ProcessorConfig) -> Result<Self> {
        Ok(Self {
            pattern: compile(config, &config.required_str("pattern")?)?,
            replacement: config.required_str("replacement")?,
        })
    }
}

impl PostProcessor for RegexReplaceProcessor {
    fn kind(&self) -> &'static str {
        "regex_replace"
    }

    fn process(&self, value: Value) -> Result<Value> {
        let text = into_string(value);
        Ok(Value::String(
            self.pattern
                .replace_all(&text, self.replacement.as_str())
                .into_owned(),
        ))
    }
}

/// Drop non-word characters and join words with single hyphens. Case is kept.
#[derive(Debug)]
pub struct SlugifyProcessor;

impl PostProcessor for SlugifyProcessor {
    fn kind(&self) -> &'static str {
        "slugify"
    }

    fn process(&self, value: Value) -> Result<Value> {
        let text = into_string(value);
        let cleaned = NON_SLUG_CHARS.replace_all(&text, "");
        let joined = SLUG_SEPARATORS.replace_all(&cleaned, "-");
        Ok(Value::from(joined.trim_matches('-')))
    }
}

/// Map a list of mappings to the value at `key`, dropping entries without it.
#[derive(Debug)]
pub struct PluckArrayProcessor {
    pub key: String,
}

impl PostProcessor for PluckArrayProcessor {
    fn kind(&self) -> &'static str {
        "pluck_array"
    }

    fn process(&self, value: Value) -> Result<Value> {
        let items = match value {
            Value::List(items) => items,
            other => {
                return Err(failure(
                    "pluck_array",
                    format!("expected a list, got {}", other.kind()),
                ));
            }
        };
        Ok(Value::List(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Map(mut map) => map.remove(&self.key),
                    _ => None,
                })
                .collect(),
        ))
    }
}
