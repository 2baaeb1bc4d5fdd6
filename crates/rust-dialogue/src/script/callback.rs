//! Answer callbacks.
//!
//! A choice answer may carry a side effect that runs when the answer is
//! picked. In Rust code the callback is attached directly; node data loaded
//! from JSON or TOML names it instead, and the name is resolved against a
//! [`CallbackRegistry`] while the data is validated.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{DialogueError, Result};

/// A side effect run when an answer is chosen.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Named callbacks available to untyped node data.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<String, Callback>,
}

impl CallbackRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.insert(name.into(), Arc::new(callback));
    }

    /// Chain: register a callback (builder pattern).
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register(name, callback);
        self
    }

    /// Look up a callback by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Callback> {
        self.callbacks.get(name).cloned()
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Check if no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Resolve the raw `callback` field of an answer.
    ///
    /// `null` means no callback. A string must name a registered callback.
    /// Anything else is not invocable.
    pub fn resolve(&self, answer: &str, field: &Value) -> Result<Option<Callback>> {
        match field {
            Value::Null => Ok(None),
            Value::String(name) => self.get(name).map(Some).ok_or_else(|| {
                DialogueError::invalid_callback(
                    answer,
                    format!("no callback registered under '{name}'"),
                )
            }),
            other => Err(DialogueError::invalid_callback(
                answer,
                format!("expected a callback name, got {}", json_kind(other)),
            )),
        }
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.callbacks.keys().collect();
        names.sort();
        f.debug_struct("CallbackRegistry")
            .field("callbacks", &names)
            .finish()
    }
}

/// Human-readable name of a JSON value's type.
pub(crate) const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn registry_resolves_names() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let registry = CallbackRegistry::new().with("count", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let callback = registry
            .resolve("Yes", &Value::String("count".into()))
            .unwrap()
            .unwrap();
        callback();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn registry_null_is_no_callback() {
        let registry = CallbackRegistry::new();
        assert!(registry.resolve("Yes", &Value::Null).unwrap().is_none());
    }

    #[test]
    fn registry_rejects_unknown_names() {
        let registry = CallbackRegistry::new();
        let Err(err) = registry.resolve("Yes", &Value::String("missing".into())) else {
            panic!("unknown callback names must be rejected");
        };
        assert!(matches!(err, DialogueError::InvalidCallback { .. }));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn registry_rejects_non_invocable_values() {
        let registry = CallbackRegistry::new();
        let err = registry.resolve("Yes", &Value::from(42)).err().unwrap();
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn registry_debug_lists_names() {
        let registry = CallbackRegistry::new().with("b", || {}).with("a", || {});
        assert_eq!(format!("{registry:?}"), r#"CallbackRegistry { callbacks: ["a", "b"] }"#);
        assert_eq!(registry.len(), 2);
    }
}
