//! Convenient re-exports for common rust-dialogue usage.
//!
//! ```rust
//! use rust_dialogue::prelude::*;
//!
//! let config = FlowConfig::new().speed(8.0).auto_next(false);
//! assert!(config.validate().is_ok());
//! ```

// Configuration
pub use crate::config::FlowConfig;

// Error handling
pub use crate::error::{DialogueError, Result};

// Macros (re-exported from rust-dialogue-macros)
pub use crate::script;

// Scripts
pub use crate::script::{
    Answer, CallbackRegistry, InputSpec, MessageNode, Node, NodeStore, QuestionNode,
};

// Engine
pub use crate::engine::{AnsweredEntry, FlowEngine, Phase};
pub use crate::schedule::{Clock, SystemClock, VirtualClock};

// Events
pub use crate::event::{EventKind, EventSink, FlowEvent};

// Async driver
pub use crate::driver::Conversation;
