//! Conversation lifecycle events.
//!
//! The engine reports everything observable through [`FlowEvent`]s handed to
//! an [`EventSink`]. The default sink is the in-process [`EventBus`]; a
//! [`ChannelSink`] forwards events to an async consumer instead.

pub mod bus;
pub mod sink;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::engine::AnsweredEntry;
use crate::error::DialogueError;
use crate::script::{MessageNode, QuestionNode};

pub use bus::{EventBus, EventHandler, SubscriptionId};
pub use sink::{ChannelSink, EventSink, event_channel, event_stream};

/// Something observable that happened in a conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    /// The bot started "typing" the next node.
    Typing {
        /// How long until the node is revealed.
        wait: Duration,
    },
    /// A message was revealed, with placeholders substituted.
    Message(MessageNode),
    /// A question was revealed, with placeholders substituted.
    Question(QuestionNode),
    /// A question was answered.
    Answered(AnsweredEntry),
    /// The transcript after an answer.
    Update(Vec<AnsweredEntry>),
    /// Pause before the next node.
    Delay {
        /// Length of the pause.
        delay: Duration,
    },
    /// The conversation reached a node with no continuation.
    Finished {
        /// Every answered question, in order.
        transcript: Vec<AnsweredEntry>,
        /// Captured variables.
        variables: HashMap<String, String>,
    },
}

impl FlowEvent {
    /// The kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Typing { .. } => EventKind::Typing,
            Self::Message(_) => EventKind::Message,
            Self::Question(_) => EventKind::Question,
            Self::Answered(_) => EventKind::Answered,
            Self::Update(_) => EventKind::Update,
            Self::Delay { .. } => EventKind::Delay,
            Self::Finished { .. } => EventKind::Finished,
        }
    }

    /// Revealed text of a message or question event.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Message(m) => Some(&m.text),
            Self::Question(q) => Some(&q.question),
            _ => None,
        }
    }
}

/// Event kinds, named as subscribers know them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `typing`
    Typing,
    /// `message`
    Message,
    /// `question`
    Question,
    /// `answered`
    Answered,
    /// `update`
    Update,
    /// `delay`
    Delay,
    /// `finished`
    Finished,
}

impl EventKind {
    /// Every kind, in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::Typing,
        Self::Message,
        Self::Question,
        Self::Answered,
        Self::Update,
        Self::Delay,
        Self::Finished,
    ];

    /// The subscriber-facing name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Typing => "typing",
            Self::Message => "message",
            Self::Question => "question",
            Self::Answered => "answered",
            Self::Update => "update",
            Self::Delay => "delay",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = DialogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DialogueError::config(format!("unknown event kind '{s}'")))
    }
}
