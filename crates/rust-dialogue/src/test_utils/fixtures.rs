//! Canned scripts.

use std::collections::BTreeMap;

use crate::script::{Answer, CallbackRegistry, InputSpec, MessageNode, Node, NodeStore, QuestionNode};

/// A message chain: `intro` → `middle` → `outro`.
pub const LINEAR: &str = "linear";
/// Name capture and substitution: `ask` (input `name`) → `greet`.
pub const GREETING: &str = "greeting";
/// A choice question `q` branching to `yes` or ending on `No`.
pub const BRANCHING: &str = "branching";

/// The same branching script as JSON, with the legacy `nextQuestion` key.
pub const BRANCHING_JSON: &str = r#"[
    {
        "id": "q",
        "question": "Continue?",
        "answers": [
            {"text": "Yes", "nextQuestion": "yes"},
            {"text": "No"}
        ]
    },
    {"id": "yes", "text": "Great, continuing."}
]"#;

/// A greeting script as TOML.
pub const GREETING_TOML: &str = r#"
[[nodes]]
id = "ask"
question = "What is your name?"
input = { variable = "name" }
next = "greet"

[[nodes]]
id = "greet"
text = "Nice to meet you, ${name}!"
"#;

/// Named scripts for tests.
#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    scripts: BTreeMap<String, Vec<Node>>,
}

impl Fixtures {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a script.
    pub fn add(&mut self, name: impl Into<String>, nodes: Vec<Node>) {
        self.scripts.insert(name.into(), nodes);
    }

    /// Nodes of a script.
    #[must_use]
    pub fn nodes(&self, name: &str) -> Option<&[Node]> {
        self.scripts.get(name).map(Vec::as_slice)
    }

    /// A validated store of a script.
    ///
    /// # Panics
    ///
    /// Panics if the script is unknown or invalid.
    #[must_use]
    pub fn store(&self, name: &str) -> NodeStore {
        let nodes = self
            .nodes(name)
            .unwrap_or_else(|| panic!("no fixture script named '{name}'"));
        NodeStore::new(nodes.to_vec()).expect("fixture script is valid")
    }

    /// Script names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.scripts.keys().map(String::as_str).collect()
    }

    /// Number of scripts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// The standard scripts.
    #[must_use]
    pub fn scripts() -> Self {
        let mut fixtures = Self::new();

        fixtures.add(
            LINEAR,
            vec![
                MessageNode::new("intro", "Hello!").then("middle").into(),
                MessageNode::new("middle", "This is a scripted chat.").then("outro").into(),
                MessageNode::new("outro", "Goodbye.").into(),
            ],
        );

        fixtures.add(
            GREETING,
            vec![
                QuestionNode::input("ask", "What is your name?", InputSpec::new("name").then("greet"))
                    .into(),
                MessageNode::new("greet", "Nice to meet you, ${name}!").into(),
            ],
        );

        fixtures.add(
            BRANCHING,
            vec![
                QuestionNode::choice(
                    "q",
                    "Continue?",
                    [Answer::new("Yes").then("yes"), Answer::new("No")],
                )
                .into(),
                MessageNode::new("yes", "Great, continuing.").into(),
            ],
        );

        fixtures
    }

    /// The branching script loaded from [`BRANCHING_JSON`].
    ///
    /// # Panics
    ///
    /// Panics if the JSON is invalid.
    #[must_use]
    pub fn branching_from_json() -> NodeStore {
        NodeStore::from_json_str(BRANCHING_JSON, &CallbackRegistry::new())
            .expect("fixture JSON is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_scripts_are_valid() {
        let fixtures = Fixtures::scripts();
        assert_eq!(fixtures.names(), vec![BRANCHING, GREETING, LINEAR]);
        for name in fixtures.names() {
            assert!(!fixtures.store(name).is_empty());
        }
    }

    #[test]
    fn json_matches_typed_script() {
        let typed = Fixtures::scripts().store(BRANCHING);
        let loaded = Fixtures::branching_from_json();
        assert_eq!(typed.iter().collect::<Vec<_>>(), loaded.iter().collect::<Vec<_>>());
    }

    #[test]
    fn toml_greeting_loads() {
        let store = NodeStore::from_toml_str(GREETING_TOML, &CallbackRegistry::new()).unwrap();
        assert_eq!(store.len(), 2);
    }
}
