//! The conversation state machine.
//!
//! [`FlowEngine`] replays a [`NodeStore`](crate::NodeStore): each node is
//! "typed" for a while, revealed, and then either waits for an answer or
//! continues on its own. Progress is driven by [`FlowEngine::tick`], which
//! fires the typing and delay timers once they are due.
//!
//! Phases move as follows:
//!
//! - `Idle` → `Presenting` on `init`.
//! - `Presenting` → `AwaitingAnswer` when a question is revealed.
//! - `Presenting` or `AwaitingAnswer` → `Delaying` (automatic mode) or
//!   `AdvancePending` (manual mode) when a message is revealed or a question
//!   answered and the node has a continuation.
//! - `Delaying` → `Presenting` when the delay elapses; `AdvancePending` →
//!   `Presenting` on `next`.
//! - Anything → `Idle` on `cancel`, unless finished.
//!
//! Any node without a continuation finishes the conversation.

mod flow;
mod state;

pub use flow::FlowEngine;
pub use state::{AnsweredEntry, EngineState, Phase};
