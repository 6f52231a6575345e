//! Context values.
//!
//! Everything stored in an [`ExecutionContext`](crate::context::ExecutionContext)
//! is a [`Value`]: a closed set of scalar, sequence and mapping variants plus
//! an opaque [`Handle`] variant for objects handed out by capabilities (a
//! browser element, a driver session, ...). Only handles expose methods, which
//! is what `$variable.method` actions dispatch to.

use crate::error::CapabilityError;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A flat mapping of variable names to values.
pub type Variables = BTreeMap<String, Value>;

/// An opaque object exposing a fixed table of named methods.
///
/// Implemented by capability providers for the objects their capabilities
/// return. The engine never looks inside a handle; it only asks whether a
/// method exists and calls it with the resolved variable snapshot.
pub trait Handle: fmt::Debug + Send + Sync {
    /// Short name of the handle's type, used in logs and serialization.
    fn type_name(&self) -> &str;

    /// Whether `method` is part of this handle's method table.
    fn has_method(&self, method: &str) -> bool;

    /// Call `method` with the current variable snapshot.
    fn call(&self, method: &str, params: &Variables) -> Result<Value, CapabilityError>;

    /// Attribute-style access used when traversing `$var.attr` parameters.
    fn attribute(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// A value held by the execution context.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Variables),
    Handle(Arc<dyn Handle>),
}

impl Value {
    /// Wrap a handle implementation.
    pub fn handle<H: Handle + 'static>(handle: H) -> Self {
        Value::Handle(Arc::new(handle))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Variables> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Handle(_) => "handle",
        }
    }

    /// Coerce to a float. Numeric strings are accepted after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(m) => !m.is_empty(),
            Value::Handle(_) => true,
        }
    }

    /// String conversion used by templates and string post-processors.
    ///
    /// Strings are returned verbatim; sequences and mappings render as JSON.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::String(s) => s.clone(),
            Value::Handle(h) => format!("<handle:{}>", h.type_name()),
            Value::List(_) | Value::Map(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }
}

// Integral floats keep a trailing ".0" so a cast to str stays distinguishable from an int.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                self.as_f64() == other.as_f64()
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Handle(a), Value::Handle(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        i64::try_from(i).map_or(Value::Float(i as f64), Value::Int)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Variables> for Value {
    fn from(map: Variables) -> Self {
        Value::Map(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Handle(h) => serializer.serialize_str(&format!("<handle:{}>", h.type_name())),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Element;

    impl Handle for Element {
        fn type_name(&self) -> &str {
            "element"
        }

        fn has_method(&self, method: &str) -> bool {
            method == "text"
        }

        fn call(&self, _method: &str, _params: &Variables) -> Result<Value, CapabilityError> {
            Ok(Value::from("hello"))
        }
    }

    #[test]
    fn int_and_float_compare_numerically() {
        assert_eq!(Value::Int(3), Value::Float(3.0));
        assert_ne!(Value::Int(3), Value::from("3"));
    }

    #[test]
    fn handles_compare_by_identity() {
        let a = Value::handle(Element);
        let b = Value::handle(Element);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn as_f64_coerces_numeric_strings() {
        assert_eq!(Value::from(" 3.5 ").as_f64(), Some(3.5));
        assert_eq!(Value::from("abc").as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
        assert_eq!(Value::Bool(true).as_f64(), Some(1.0));
    }

    #[test]
    fn display_string_renders_containers_as_json() {
        let list = Value::List(vec![Value::Int(1), Value::from("a")]);
        assert_eq!(list.to_display_string(), r#"[1,"a"]"#);
        assert_eq!(Value::Float(2.0).to_display_string(), "2.0");
        assert_eq!(Value::Float(2.5).to_display_string(), "2.5");
        assert_eq!(Value::handle(Element).to_display_string(), "<handle:element>");
    }

    #[test]
    fn deserializes_from_yaml() {
        let value: Value = serde_yaml::from_str("a: 1\nb: [x, 2.5, true, null]").unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map["a"], Value::Int(1));
        assert_eq!(
            map["b"],
            Value::List(vec![
                Value::from("x"),
                Value::Float(2.5),
                Value::Bool(true),
                Value::Null
            ])
        );
    }

    #[test]
    fn serializes_handles_as_placeholders() {
        let mut map = Variables::new();
        map.insert("el".to_string(), Value::handle(Element));
        map.insert("n".to_string(), Value::Int(4));
        let json = serde_json::to_string(&Value::Map(map)).unwrap();
        assert_eq!(json, r#"{"el":"<handle:element>","n":4}"#);
    }

    #[test]
    fn truthiness_follows_emptiness() {
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::handle(Element).is_truthy());
    }
}
