//! Conversation state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::script::QuestionNode;
use crate::variables::VariableStore;

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredEntry {
    /// Question text as it was presented.
    pub question: String,
    /// The reply, as given.
    pub answer: String,
}

impl AnsweredEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Not started, or cancelled.
    #[default]
    Idle,
    /// Typing a node; its reveal timer is outstanding.
    Presenting,
    /// A question is revealed and waits for `answer`.
    AwaitingAnswer,
    /// Manual mode: a continuation waits for `next`.
    AdvancePending,
    /// Automatic mode: waiting out the inter-turn delay.
    Delaying,
    /// A node without continuation was reached.
    Finished,
}

impl Phase {
    /// Check if a timer is outstanding in this phase.
    #[must_use]
    pub const fn is_timed(self) -> bool {
        matches!(self, Self::Presenting | Self::Delaying)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Presenting => "presenting",
            Self::AwaitingAnswer => "awaiting-answer",
            Self::AdvancePending => "advance-pending",
            Self::Delaying => "delaying",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Mutable state of one conversation.
///
/// Only the engine mutates it, and never again once `finished` is set.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    pub(crate) current_node: Option<QuestionNode>,
    pub(crate) pending_next_id: Option<String>,
    pub(crate) finished: bool,
    pub(crate) transcript: Vec<AnsweredEntry>,
    pub(crate) variables: VariableStore,
}

impl EngineState {
    /// The question being presented or awaiting an answer.
    #[must_use]
    pub const fn current_node(&self) -> Option<&QuestionNode> {
        self.current_node.as_ref()
    }

    /// The continuation waiting for `next` (manual mode only).
    #[must_use]
    pub fn pending_next_id(&self) -> Option<&str> {
        self.pending_next_id.as_deref()
    }

    /// Check if the conversation has finished.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Every answered question, in order.
    #[must_use]
    pub fn transcript(&self) -> &[AnsweredEntry] {
        &self.transcript
    }

    /// Captured variables.
    #[must_use]
    pub const fn variables(&self) -> &VariableStore {
        &self.variables
    }

    /// The transcript as pretty-printed JSON.
    pub fn transcript_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.transcript)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_empty() {
        let state = EngineState::default();
        assert!(state.current_node().is_none());
        assert!(state.pending_next_id().is_none());
        assert!(!state.is_finished());
        assert!(state.transcript().is_empty());
        assert!(state.variables().is_empty());
    }

    #[test]
    fn transcript_serializes() {
        let state = EngineState {
            transcript: vec![AnsweredEntry::new("Name?", "Bob")],
            ..EngineState::default()
        };
        let json = state.transcript_json().unwrap();
        let back: Vec<AnsweredEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state.transcript);
        assert!(json.contains("\"question\": \"Name?\""));
    }

    #[test]
    fn phase_names() {
        assert_eq!(Phase::AwaitingAnswer.to_string(), "awaiting-answer");
        assert!(Phase::Delaying.is_timed());
        assert!(!Phase::AdvancePending.is_timed());
    }
}
