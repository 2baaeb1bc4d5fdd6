//! The node store.
//!
//! [`NodeStore`] owns the immutable, ordered node sequence of one script and
//! resolves identifiers to nodes. Everything is validated when the store is
//! built: node shapes, and that every continuation names an existing node.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use super::callback::{CallbackRegistry, json_kind};
use super::node::{Node, QuestionKind};
use super::raw::RawNode;
use crate::config::file::ConfigFormat;
use crate::error::{DialogueError, Result};

/// Matches a `${name}` placeholder and captures the name.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").unwrap_or_else(|e| unreachable!("placeholder regex: {e}"))
});

/// Names of every `${name}` placeholder in `template`, in order of appearance.
pub fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
}

/// The ordered node sequence of a script.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    nodes: Vec<Node>,
}

impl NodeStore {
    /// Build a store from typed nodes.
    ///
    /// Fails with `InvalidNodeShape` for malformed nodes and `NodeNotFound`
    /// for a continuation that names no node. Duplicate ids are accepted; the
    /// first occurrence wins on lookup.
    pub fn new(nodes: Vec<Node>) -> Result<Self> {
        for node in &nodes {
            node.validate()?;
        }

        let ids: HashSet<&str> = nodes.iter().map(Node::id).collect();
        if ids.len() != nodes.len() {
            let mut seen = HashSet::new();
            for node in &nodes {
                if !seen.insert(node.id()) {
                    warn!(node.id = %node.id(), "Duplicate node id, first occurrence wins");
                }
            }
        }

        for node in &nodes {
            if let Some(missing) = node.successors().find(|next| !ids.contains(next)) {
                debug!(node.id = %node.id(), next = %missing, "Dangling continuation");
                return Err(DialogueError::node_not_found(missing));
            }
        }

        let store = Self { nodes };
        for name in store.unresolvable_placeholders() {
            warn!(variable = %name, "Placeholder is never captured by an input question");
        }
        debug!(nodes = store.len(), "Node store ready");
        Ok(store)
    }

    /// Build a store from a JSON value, which must be an array of nodes.
    pub fn from_json(value: Value, callbacks: &CallbackRegistry) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(DialogueError::invalid_data_shape(format!(
                "expected an array of nodes, got {}",
                json_kind(&value)
            )));
        };

        let nodes = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| RawNode::from_value(index, item)?.into_node(callbacks))
            .collect::<Result<Vec<_>>>()?;
        Self::new(nodes)
    }

    /// Build a store from JSON text.
    pub fn from_json_str(content: &str, callbacks: &CallbackRegistry) -> Result<Self> {
        Self::from_json(serde_json::from_str(content)?, callbacks)
    }

    /// Build a store from TOML text holding a `[[nodes]]` array of tables.
    pub fn from_toml_str(content: &str, callbacks: &CallbackRegistry) -> Result<Self> {
        let table: toml::Table = toml::from_str(content)?;
        let nodes = table.get("nodes").ok_or_else(|| {
            DialogueError::invalid_data_shape("expected a top-level 'nodes' array")
        })?;
        Self::from_json(serde_json::to_value(nodes)?, callbacks)
    }

    /// Load a script file, choosing the format from its extension.
    pub fn load(path: &Path, callbacks: &CallbackRegistry) -> Result<Self> {
        let content = DialogueError::with_io_context(
            std::fs::read_to_string(path),
            format!("reading script file {}", path.display()),
        )?;

        match ConfigFormat::from_path(path) {
            Some(ConfigFormat::Toml) => Self::from_toml_str(&content, callbacks),
            Some(ConfigFormat::Json) => Self::from_json_str(&content, callbacks),
            None => Err(DialogueError::invalid_data_shape(format!(
                "unknown script format: {}",
                path.display()
            ))),
        }
    }

    /// Resolve an identifier. The first node carrying it wins.
    pub fn find_by_id(&self, id: &str) -> Result<&Node> {
        self.nodes
            .iter()
            .find(|n| n.id() == id)
            .ok_or_else(|| DialogueError::node_not_found(id))
    }

    /// The first node of the script.
    #[must_use]
    pub fn first(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the store holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over the nodes in script order.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// Variable names captured by input questions of this script.
    #[must_use]
    pub fn captured_variables(&self) -> HashSet<&str> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Question(q) => match &q.kind {
                    QuestionKind::Input(input) => Some(input.variable.as_str()),
                    QuestionKind::Choice(_) => None,
                },
                Node::Message(_) => None,
            })
            .collect()
    }

    /// Placeholder names that no input question of this script captures.
    ///
    /// They stay literal unless the caller seeds the variable.
    #[must_use]
    pub fn unresolvable_placeholders(&self) -> Vec<&str> {
        let captured = self.captured_variables();
        let mut missing: Vec<&str> = self
            .nodes
            .iter()
            .flat_map(|n| placeholders(n.template()))
            .filter(|name| !captured.contains(name))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }
}

impl<'a> IntoIterator for &'a NodeStore {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
