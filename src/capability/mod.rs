//! External capabilities the engine dispatches actions to.
//!
//! A capability is anything invocable by name with the resolved variable
//! snapshot: a browser primitive, an HTTP fetch, a file export. The engine
//! only knows the uniform [`Capability`] contract and a name-keyed
//! [`CapabilityRegistry`]; providers decide how capabilities are built.

mod builtin;

pub use builtin::{BuiltinProvider, LogMessage, Wait};

use crate::error::CapabilityError;
use crate::value::{Value, Variables};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A uniformly invocable operation.
pub trait Capability: Send + Sync {
    /// Stable action name used for dispatch (e.g. `"dom.get_elements"`).
    fn action_name(&self) -> &str;

    /// Run with the resolved variable snapshot. `Value::Null` means no result.
    fn execute(&self, params: &Variables) -> Result<Value, CapabilityError>;
}

/// Source of a set of capabilities, e.g. one per automation backend.
pub trait CapabilityProvider {
    fn capabilities(&self) -> Vec<Arc<dyn Capability>>;
}

/// Capabilities keyed by action name.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding everything `provider` offers.
    pub fn from_provider(provider: &dyn CapabilityProvider) -> Self {
        let mut registry = Self::new();
        registry.extend_from(provider);
        registry
    }

    pub fn extend_from(&mut self, provider: &dyn CapabilityProvider) -> &mut Self {
        for capability in provider.capabilities() {
            self.register_arc(capability);
        }
        self
    }

    /// Register `capability` under its action name, replacing any previous one.
    pub fn register<C: Capability + 'static>(&mut self, capability: C) -> &mut Self {
        self.register_arc(Arc::new(capability))
    }

    pub fn register_arc(&mut self, capability: Arc<dyn Capability>) -> &mut Self {
        self.capabilities
            .insert(capability.action_name().to_string(), capability);
        self
    }

    pub fn get(&self, action: &str) -> Option<&Arc<dyn Capability>> {
        self.capabilities.get(action)
    }

    pub fn contains(&self, action: &str) -> bool {
        self.capabilities.contains_key(action)
    }

    /// Registered action names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.capabilities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, i64);

    impl Capability for Fixed {
        fn action_name(&self) -> &str {
            self.0
        }

        fn execute(&self, _params: &Variables) -> Result<Value, CapabilityError> {
            Ok(Value::Int(self.1))
        }
    }

    struct Pair;

    impl CapabilityProvider for Pair {
        fn capabilities(&self) -> Vec<Arc<dyn Capability>> {
            vec![Arc::new(Fixed("b.two", 2)), Arc::new(Fixed("a.one", 1))]
        }
    }

    #[test]
    fn registry_from_provider_lists_sorted_names() {
        let registry = CapabilityRegistry::from_provider(&Pair);
        assert_eq!(registry.names(), vec!["a.one", "b.two"]);
        assert!(registry.contains("a.one"));
        assert!(!registry.contains("c.three"));
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = CapabilityRegistry::new();
        registry.register(Fixed("x", 1)).register(Fixed("x", 2));
        assert_eq!(registry.len(), 1);
        let result = registry.get("x").unwrap().execute(&Variables::new()).unwrap();
        assert_eq!(result, Value::Int(2));
    }

    #[test]
    fn debug_shows_action_names() {
        let registry = CapabilityRegistry::from_provider(&Pair);
        assert_eq!(
            format!("{registry:?}"),
            r#"CapabilityRegistry { actions: ["a.one", "b.two"] }"#
        );
    }
}
