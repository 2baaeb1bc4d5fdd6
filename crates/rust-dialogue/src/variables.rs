//! Captured variables and placeholder substitution.

use std::collections::HashMap;
use std::collections::hash_map;

use serde::{Deserialize, Serialize};

/// Mapping of captured variable names to their last captured value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableStore {
    values: HashMap<String, String>,
}

impl VariableStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a variable.
    pub fn capture(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Get a captured value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Number of captured variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over captured variables in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.values.iter()
    }

    /// Copy of the captured values.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values.clone()
    }

    /// Replace every `${name}` placeholder of a captured variable.
    ///
    /// Each variable is replaced in one pass. Placeholders that appear only
    /// after an earlier replacement may or may not be expanded, depending on
    /// iteration order; placeholders of uncaptured variables are left as is.
    #[must_use]
    pub fn substitute(&self, template: &str) -> String {
        if self.values.is_empty() || !template.contains("${") {
            return template.to_string();
        }

        let mut result = template.to_string();
        for (name, value) in &self.values {
            result = result.replace(&format!("${{{name}}}"), value);
        }
        result
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a VariableStore {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
