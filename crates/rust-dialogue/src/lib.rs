//! rust-dialogue: scripted, branching dialogue engine
//!
//! This crate replays a fixed script of messages and questions to a user the
//! way a chat bot would: each turn is "typed" for a while before it appears,
//! answers pick the branch to continue with, free-text replies are captured
//! into variables and substituted into later text.
//!
//! # Features
//!
//! - **Sans-IO engine**: [`FlowEngine`] arms timers on a [`Scheduler`] and
//!   fires them from `tick`, so tests run on a [`VirtualClock`]
//! - **Async driver**: [`Conversation`] runs an engine on tokio
//! - **Validated scripts**: built in Rust, with the [`script!`] macro, or
//!   loaded from JSON/TOML
//! - **Events**: per-kind subscriptions, channel sinks and streams
//! - **Subscriber setup** for binaries (feature: `subscriber`)
//!
//! # Example
//!
//! ```rust
//! use rust_dialogue::prelude::*;
//!
//! let store = NodeStore::new(script! {
//!     input "ask": "Your name?" as "name" => "greet";
//!     message "greet": "Hi ${name}!";
//! })
//! .unwrap();
//!
//! let clock = VirtualClock::new();
//! let mut engine = FlowEngine::with_clock(store, FlowConfig::default(), clock.clone()).unwrap();
//! engine.subscribe(EventKind::Message, |event| println!("bot: {}", event.text().unwrap_or("")));
//!
//! engine.init(None).unwrap();
//! clock.advance(engine.time_until_next().unwrap());
//! engine.tick().unwrap();
//! engine.answer("Ada").unwrap();
//! ```

// Lets `script!` expansions name this crate from inside it.
extern crate self as rust_dialogue;

// Re-export macros
pub use rust_dialogue_macros::script;

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod event;
pub mod prelude;
pub mod schedule;
pub mod script;
pub mod timing;
pub mod variables;

/// Subscriber installation.
#[cfg(feature = "subscriber")]
pub mod logging;

pub use config::FlowConfig;
pub use config::env::EnvConfig;
pub use config::file::{ConfigFormat, ConfigLoader};
pub use driver::{Conversation, TokioClock};
pub use engine::{AnsweredEntry, EngineState, FlowEngine, Phase};
pub use error::{DialogueError, Result};
pub use event::{
    ChannelSink, EventBus, EventKind, EventSink, FlowEvent, SubscriptionId, event_channel,
    event_stream,
};
pub use schedule::{Clock, Scheduler, SystemClock, TimerHandle, VirtualClock};
pub use script::{
    Answer, Callback, CallbackRegistry, InputSpec, MessageNode, Node, NodeStore, QuestionKind,
    QuestionNode,
};
pub use timing::{inter_turn_delay, typing_wait};
pub use variables::VariableStore;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::{EngineHarness, Fixtures, RecordingSink};
