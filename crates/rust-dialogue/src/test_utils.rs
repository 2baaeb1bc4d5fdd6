//! Helpers for testing code built on rust-dialogue.
//!
//! [`EngineHarness`] runs an engine on virtual time and records every event,
//! so a whole conversation can be replayed and inspected without sleeping.

pub mod fixtures;
mod harness;
mod recording;

pub use fixtures::Fixtures;
pub use harness::EngineHarness;
pub use recording::RecordingSink;
