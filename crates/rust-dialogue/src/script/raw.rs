//! Untyped node data.
//!
//! Scripts written as JSON or TOML arrive as loosely shaped objects. They are
//! deserialized into [`RawNode`] and converted into a [`Node`] in one
//! validation pass, so nothing downstream ever checks field presence.

use serde::Deserialize;
use serde_json::Value;

use super::callback::{CallbackRegistry, json_kind};
use super::node::{Answer, InputSpec, MessageNode, Node, QuestionNode};
use crate::error::{DialogueError, Result};

/// A node as written in a script file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNode {
    /// Node identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Message text.
    #[serde(default)]
    pub text: Option<String>,
    /// Question text.
    #[serde(default)]
    pub question: Option<String>,
    /// Continuation of a message or input question.
    #[serde(default, alias = "nextQuestion")]
    pub next: Option<String>,
    /// Choice answers.
    #[serde(default)]
    pub answers: Option<Vec<RawAnswer>>,
    /// Free-text capture.
    #[serde(default)]
    pub input: Option<RawInput>,
}

/// A choice answer as written in a script file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAnswer {
    /// Answer text.
    pub text: String,
    /// Continuation when selected.
    #[serde(default, alias = "nextQuestion")]
    pub next: Option<String>,
    /// Name of a registered callback.
    #[serde(default)]
    pub callback: Value,
}

/// Free-text capture as written in a script file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawInput {
    /// Variable the reply is captured under.
    pub variable: String,
}

impl RawNode {
    /// Parse one element of a script array.
    pub fn from_value(index: usize, value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(DialogueError::invalid_node(
                format!("#{index}"),
                format!("expected an object, got {}", json_kind(&value)),
            ));
        }
        serde_json::from_value(value).map_err(|e| {
            DialogueError::invalid_node(format!("#{index}"), e.to_string())
        })
    }

    /// Convert into a validated [`Node`], resolving callbacks by name.
    pub fn into_node(self, callbacks: &CallbackRegistry) -> Result<Node> {
        let id = self.id.unwrap_or_default();
        if id.is_empty() {
            return Err(DialogueError::invalid_node(id, "missing node id"));
        }

        let node = match (self.text, self.question) {
            (Some(_), Some(_)) => {
                return Err(DialogueError::invalid_node(
                    id,
                    "a node has either 'text' (message) or 'question', not both",
                ));
            }
            (None, None) => {
                return Err(DialogueError::invalid_node(
                    id,
                    "a node needs 'text' (message) or 'question'",
                ));
            }
            (Some(text), None) => {
                if self.answers.is_some() || self.input.is_some() {
                    return Err(DialogueError::invalid_node(
                        id,
                        "a message cannot carry 'answers' or 'input'",
                    ));
                }
                Node::Message(MessageNode {
                    id,
                    text,
                    next: self.next,
                })
            }
            (None, Some(question)) => match (self.answers, self.input) {
                (Some(_), Some(_)) => {
                    return Err(DialogueError::invalid_node(
                        id,
                        "a question has either 'answers' or 'input', not both",
                    ));
                }
                (None, None) => {
                    return Err(DialogueError::invalid_node(
                        id,
                        "a question needs 'answers' or 'input'",
                    ));
                }
                (Some(answers), None) => {
                    if self.next.is_some() {
                        return Err(DialogueError::invalid_node(
                            id,
                            "a choice question continues through its answers, not 'next'",
                        ));
                    }
                    let answers = answers
                        .into_iter()
                        .map(|raw| {
                            let callback = callbacks.resolve(&raw.text, &raw.callback)?;
                            Ok(Answer {
                                text: raw.text,
                                next: raw.next,
                                callback,
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Node::Question(QuestionNode::choice(id, question, answers))
                }
                (None, Some(input)) => {
                    let mut spec = InputSpec::new(input.variable);
                    spec.next = self.next;
                    Node::Question(QuestionNode::input(id, question, spec))
                }
            },
        };

        node.validate()?;
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::script::node::QuestionKind;

    fn convert(value: Value) -> Result<Node> {
        RawNode::from_value(0, value)?.into_node(&CallbackRegistry::new())
    }

    #[test]
    fn converts_message() {
        let node = convert(json!({"id": "a", "text": "Hi", "next": "b"})).unwrap();
        assert_eq!(node, Node::Message(MessageNode::new("a", "Hi").then("b")));
    }

    #[test]
    fn converts_choice_with_legacy_next_field() {
        let node = convert(json!({
            "id": "q",
            "question": "Go?",
            "answers": [{"text": "A", "nextQuestion": "n2"}, {"text": "B"}]
        }))
        .unwrap();

        let Node::Question(question) = node else {
            panic!("expected a question");
        };
        assert_eq!(question.answers()[0].next.as_deref(), Some("n2"));
        assert!(question.answers()[1].next.is_none());
    }

    #[test]
    fn converts_input() {
        let node = convert(json!({
            "id": "name",
            "question": "Your name?",
            "input": {"variable": "name"},
            "next": "greet"
        }))
        .unwrap();

        let Node::Question(question) = node else {
            panic!("expected a question");
        };
        assert_eq!(
            question.kind,
            QuestionKind::Input(InputSpec::new("name").then("greet"))
        );
    }

    #[test]
    fn rejects_neither_and_both_shapes() {
        assert!(convert(json!({"id": "x"})).is_err());
        assert!(convert(json!({"id": "x", "text": "a", "question": "b"})).is_err());
        assert!(convert(json!({"id": "x", "question": "b"})).is_err());
        assert!(
            convert(json!({
                "id": "x",
                "question": "b",
                "answers": [{"text": "A"}],
                "input": {"variable": "v"}
            }))
            .is_err()
        );
        assert!(convert(json!({"id": "x", "text": "a", "input": {"variable": "v"}})).is_err());
    }

    #[test]
    fn rejects_missing_id() {
        let err = convert(json!({"text": "a"})).unwrap_err();
        assert!(err.to_string().contains("missing node id"));
    }

    #[test]
    fn rejects_scalar_elements() {
        let err = RawNode::from_value(3, json!("hello")).unwrap_err();
        assert!(err.to_string().contains("#3"));
        assert!(err.to_string().contains("a string"));
    }

    #[test]
    fn rejects_non_invocable_callback() {
        let err = convert(json!({
            "id": "q",
            "question": "Sure?",
            "answers": [{"text": "Yes", "callback": true}]
        }))
        .unwrap_err();
        assert!(matches!(err, DialogueError::InvalidCallback { .. }));
    }

    #[test]
    fn resolves_registered_callback() {
        let registry = CallbackRegistry::new().with("log", || {});
        let node = RawNode::from_value(
            0,
            json!({
                "id": "q",
                "question": "Sure?",
                "answers": [{"text": "Yes", "callback": "log"}]
            }),
        )
        .unwrap()
        .into_node(&registry)
        .unwrap();

        let Node::Question(question) = node else {
            panic!("expected a question");
        };
        assert!(question.answers()[0].callback.is_some());
    }
}
