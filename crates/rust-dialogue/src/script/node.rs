//! Dialogue node definitions.
//!
//! A [`Node`] is exactly one scripted turn: a [`MessageNode`] the bot says,
//! or a [`QuestionNode`] it asks. A question is either a multiple-choice
//! question whose [`Answer`]s carry their own continuation, or a free-text
//! question whose reply is captured into a variable ([`InputSpec`]).
//! The shapes are enforced by the types; [`Node::validate`] checks the rest.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::callback::Callback;
use crate::error::{DialogueError, Result};
use crate::variables::VariableStore;

/// A message the bot says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageNode {
    /// Node identifier.
    pub id: String,
    /// Template text; `${name}` placeholders are substituted on presentation.
    pub text: String,
    /// Node to continue with, if any.
    pub next: Option<String>,
}

impl MessageNode {
    /// Create a message with no continuation.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            next: None,
        }
    }

    /// Set the next node.
    #[must_use]
    pub fn then(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    /// Copy of this message with placeholders substituted.
    #[must_use]
    pub fn substituted(&self, variables: &VariableStore) -> Self {
        Self {
            text: variables.substitute(&self.text),
            ..self.clone()
        }
    }
}

/// One selectable answer of a choice question.
#[derive(Clone)]
pub struct Answer {
    /// Answer text; a reply must equal it exactly to select it.
    pub text: String,
    /// Node to continue with when selected.
    pub next: Option<String>,
    /// Side effect to run when selected.
    pub callback: Option<Callback>,
}

impl Answer {
    /// Create an answer with no continuation.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            next: None,
            callback: None,
        }
    }

    /// Set the next node.
    #[must_use]
    pub fn then(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    /// Attach a callback.
    #[must_use]
    pub fn on_select<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Attach an already shared callback.
    #[must_use]
    pub fn with_callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }
}

impl fmt::Debug for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Answer")
            .field("text", &self.text)
            .field("next", &self.next)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl PartialEq for Answer {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.next == other.next
            && self.callback.is_some() == other.callback.is_some()
    }
}

/// Free-text capture settings of an input question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    /// Variable the reply is captured under.
    pub variable: String,
    /// Node to continue with after the reply.
    pub next: Option<String>,
}

impl InputSpec {
    /// Capture the reply under `variable`.
    #[must_use]
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            next: None,
        }
    }

    /// Set the next node.
    #[must_use]
    pub fn then(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }
}

/// How a question is answered.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    /// Pick one of the listed answers.
    Choice(Vec<Answer>),
    /// Reply with free text.
    Input(InputSpec),
}

/// A question the bot asks.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionNode {
    /// Node identifier.
    pub id: String,
    /// Template question text.
    pub question: String,
    /// Choice or input.
    pub kind: QuestionKind,
}

impl QuestionNode {
    /// Create a multiple-choice question.
    #[must_use]
    pub fn choice<I>(id: impl Into<String>, question: impl Into<String>, answers: I) -> Self
    where
        I: IntoIterator<Item = Answer>,
    {
        Self {
            id: id.into(),
            question: question.into(),
            kind: QuestionKind::Choice(answers.into_iter().collect()),
        }
    }

    /// Create a free-text question.
    #[must_use]
    pub fn input(id: impl Into<String>, question: impl Into<String>, input: InputSpec) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            kind: QuestionKind::Input(input),
        }
    }

    /// Add an answer to a choice question. Ignored for input questions.
    #[must_use]
    pub fn answer(mut self, answer: Answer) -> Self {
        if let QuestionKind::Choice(answers) = &mut self.kind {
            answers.push(answer);
        }
        self
    }

    /// Set the continuation of an input question. Ignored for choice
    /// questions, which continue through their answers.
    #[must_use]
    pub fn then(mut self, next: impl Into<String>) -> Self {
        if let QuestionKind::Input(input) = &mut self.kind {
            input.next = Some(next.into());
        }
        self
    }

    /// The answers of a choice question; empty for input questions.
    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        match &self.kind {
            QuestionKind::Choice(answers) => answers,
            QuestionKind::Input(_) => &[],
        }
    }

    /// Copy of this question with placeholders substituted in the question
    /// text. Answer texts are left as written so replies still match them.
    #[must_use]
    pub fn substituted(&self, variables: &VariableStore) -> Self {
        Self {
            question: variables.substitute(&self.question),
            ..self.clone()
        }
    }
}

/// One scripted turn of the dialogue.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A message.
    Message(MessageNode),
    /// A question.
    Question(QuestionNode),
}

impl Node {
    /// Start a message node.
    #[must_use]
    pub fn message(id: impl Into<String>, text: impl Into<String>) -> MessageNode {
        MessageNode::new(id, text)
    }

    /// Start a free-text question capturing into `variable`.
    #[must_use]
    pub fn input(
        id: impl Into<String>,
        question: impl Into<String>,
        variable: impl Into<String>,
    ) -> QuestionNode {
        QuestionNode::input(id, question, InputSpec::new(variable))
    }

    /// Start a choice question with no answers yet.
    #[must_use]
    pub fn choice(id: impl Into<String>, question: impl Into<String>) -> QuestionNode {
        QuestionNode::choice(id, question, Vec::new())
    }

    /// Node identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Message(m) => &m.id,
            Self::Question(q) => &q.id,
        }
    }

    /// The template text presented for this node.
    #[must_use]
    pub fn template(&self) -> &str {
        match self {
            Self::Message(m) => &m.text,
            Self::Question(q) => &q.question,
        }
    }

    /// Check if this is a question.
    #[must_use]
    pub const fn is_question(&self) -> bool {
        matches!(self, Self::Question(_))
    }

    /// Every node id this node can continue with.
    pub fn successors(&self) -> impl Iterator<Item = &str> {
        let ids: Vec<&str> = match self {
            Self::Message(m) => m.next.as_deref().into_iter().collect(),
            Self::Question(q) => match &q.kind {
                QuestionKind::Choice(answers) => {
                    answers.iter().filter_map(|a| a.next.as_deref()).collect()
                }
                QuestionKind::Input(input) => input.next.as_deref().into_iter().collect(),
            },
        };
        ids.into_iter()
    }

    /// Check the invariants the types cannot express.
    pub fn validate(&self) -> Result<()> {
        let id = self.id();
        if id.is_empty() {
            return Err(DialogueError::invalid_node(id, "node id must not be empty"));
        }

        let Self::Question(question) = self else {
            return Ok(());
        };

        match &question.kind {
            QuestionKind::Input(input) => {
                if input.variable.is_empty() {
                    return Err(DialogueError::invalid_node(
                        id,
                        "input variable must not be empty",
                    ));
                }
            }
            QuestionKind::Choice(answers) => {
                if answers.is_empty() {
                    return Err(DialogueError::invalid_node(
                        id,
                        "choice question must offer at least one answer",
                    ));
                }
                let mut seen = HashSet::new();
                for answer in answers {
                    if !seen.insert(answer.text.as_str()) {
                        return Err(DialogueError::invalid_node(
                            id,
                            format!("answer '{}' is listed more than once", answer.text),
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

impl From<MessageNode> for Node {
    fn from(node: MessageNode) -> Self {
        Self::Message(node)
    }
}

impl From<QuestionNode> for Node {
    fn from(node: QuestionNode) -> Self {
        Self::Question(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_builder() {
        let node = MessageNode::new("intro", "Hello").then("ask");
        assert_eq!(node.next.as_deref(), Some("ask"));

        let node = Node::from(node);
        assert_eq!(node.id(), "intro");
        assert_eq!(node.template(), "Hello");
        assert!(!node.is_question());
    }

    #[test]
    fn successors_of_choice_skip_terminal_answers() {
        let node = Node::from(QuestionNode::choice(
            "go",
            "Go?",
            [Answer::new("A").then("n2"), Answer::new("B")],
        ));
        assert_eq!(node.successors().collect::<Vec<_>>(), vec!["n2"]);
    }

    #[test]
    fn validate_rejects_duplicate_answers() {
        let node = Node::from(QuestionNode::choice(
            "go",
            "Go?",
            [Answer::new("A").then("x"), Answer::new("A").then("y")],
        ));
        let err = node.validate().unwrap_err();
        assert!(matches!(err, DialogueError::InvalidNodeShape { .. }));
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn validate_rejects_empty_choice_and_variable() {
        let empty = Node::from(QuestionNode::choice("q", "?", Vec::new()));
        assert!(empty.validate().is_err());

        let unnamed = Node::from(QuestionNode::input("q", "?", InputSpec::new("")));
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_id() {
        assert!(Node::from(MessageNode::new("", "hi")).validate().is_err());
    }

    #[test]
    fn substituted_question_keeps_answer_texts() {
        let mut vars = VariableStore::new();
        vars.capture("name", "Bob");

        let node = QuestionNode::choice("q", "Ready, ${name}?", [Answer::new("${name}")]);
        let shown = node.substituted(&vars);
        assert_eq!(shown.question, "Ready, Bob?");
        assert_eq!(shown.answers()[0].text, "${name}");
    }

    #[test]
    fn node_shortcuts() {
        let choice = Node::choice("q", "Go?")
            .answer(Answer::new("A").then("n2"))
            .answer(Answer::new("B"));
        assert_eq!(choice.answers().len(), 2);

        let input = Node::input("ask", "Name?", "name").then("greet");
        assert_eq!(input.kind, QuestionKind::Input(InputSpec::new("name").then("greet")));

        let message = Node::message("m", "Hi").then("ask");
        assert_eq!(message.next.as_deref(), Some("ask"));
    }

    #[test]
    fn answer_debug_hides_callback() {
        let answer = Answer::new("Yes").on_select(|| {});
        let debug = format!("{answer:?}");
        assert!(debug.contains("callback: true"));
    }
}
