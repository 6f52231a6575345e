//! Post-processing of task results.
//!
//! A task may declare a chain of processors that transform its result before
//! it is bound to `output`:
//!
//! ```yaml
//! post_process:
//!   - type: strip
//!   - type: regex_extract
//!     pattern: '(\d+) rooms'
//!     group: 1
//!   - type: cast
//!     to: int
//! ```
//!
//! Processors are built from their configuration by [`create`]; an unknown
//! `type` fails at construction. A [`Pipeline`] applies them in order.

mod processors;


use crate::error::{EngineError, Result};
use crate::value::{Value, Variables};
use serde::Deserialize;
use std::fmt;

pub use processors::{
    CastProcessor, CastTarget, LowerProcessor, PluckArrayProcessor, RegexExtractProcessor,
    RegexReplaceProcessor, ReplaceProcessor, SlugifyProcessor, SplitProcessor, StripProcessor,
    UpperProcessor,
};

/// Every processor type [`create`] knows about.
pub const PROCESSOR_TYPES: &[&str] = &[
    "regex_extract",
    "replace",
    "cast",
    "strip",
    "lower",
    "upper",
    "split",
    "regex_replace",
    "slugify",
    "pluck_array",
];

/// A stateless single-value transformer.
pub trait PostProcessor: fmt::Debug {
    /// The `type` this processor was configured with.
    fn kind(&self) -> &'static str;

    fn process(&self, value: Value) -> Result<Value>;
}

/// Declared configuration of one processor: a `type` plus its parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub params: Variables,
}

impl ProcessorConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: Variables::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    fn invalid(&self, reason: impl Into<String>) -> EngineError {
        EngineError::InvalidProcessorConfig {
            kind: self.kind.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn required_str(&self, key: &str) -> Result<String> {
        match self.params.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) if !other.is_null() => Ok(other.to_display_string()),
            _ => Err(self.invalid(format!("missing required parameter '{key}'"))),
        }
    }

    pub(crate) fn optional_str(&self, key: &str) -> Option<String> {
        self.params
            .get(key)
            .filter(|v| !v.is_null())
            .map(Value::to_display_string)
    }

    pub(crate) fn int_or(&self, key: &str, default: i64) -> Result<i64> {
        match self.params.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Int(i)) => Ok(*i),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| self.invalid(format!("parameter '{key}' must be an integer"))),
            Some(_) => Err(self.invalid(format!("parameter '{key}' must be an integer"))),
        }
    }
}

/// Build the processor described by `config`.
pub fn create(config: &ProcessorConfig) -> Result<Box<dyn PostProcessor>> {
    let processor: Box<dyn PostProcessor> = match config.kind.as_str() {
        "regex_extract" => Box::new(RegexExtractProcessor::from_config(config)?),
        "replace" => Box::new(ReplaceProcessor {
            old: config.required_str("old")?,
            new: config.required_str("new")?,
        }),
        "cast" => Box::new(CastProcessor::from_config(config)?),
        "strip" => Box::new(StripProcessor {
            chars: config.optional_str("chars"),
        }),
        "lower" => Box::new(LowerProcessor),
        "upper" => Box::new(UpperProcessor),
        "split" => Box::new(SplitProcessor::from_config(config)?),
        "regex_replace" => Box::new(RegexReplaceProcessor::from_config(config)?),
        "slugify" => Box::new(SlugifyProcessor),
        "pluck_array" => Box::new(PluckArrayProcessor {
            key: config.required_str("key")?,
        }),
        other => return Err(EngineError::UnknownProcessorType(other.to_string())),
    };
    Ok(processor)
}

/// An ordered chain of processors.
///
/// Each output feeds the next processor, except null: a step yielding null
/// ends the chain, so `regex_extract` then `cast` gives null for text with
/// no match instead of a cast error.
#[derive(Debug, Default)]
pub struct Pipeline {
    processors: Vec<Box<dyn PostProcessor>>,
}

impl Pipeline {
    /// Build every processor up front; the first bad config fails the whole chain.
    pub fn build(configs: &[ProcessorConfig]) -> Result<Self> {
        let processors = configs.iter().map(create).collect::<Result<Vec<_>>>()?;
        Ok(Self { processors })
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Run `value` through every processor in order.
    ///
    /// A processor yielding null (a regex that did not match) ends the chain
    /// with null rather than feeding the string `"null"` onward.
    pub fn apply(&self, value: Value) -> Result<Value> {
        let mut current = value;
        for processor in &self.processors {
            if current.is_null() {
                break;
            }
            current = processor.process(current)?;
        }
        Ok(current)
    }
}
