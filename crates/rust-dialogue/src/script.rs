//! Dialogue scripts.
//!
//! A script is the ordered node sequence a conversation replays. Nodes are
//! built in Rust (directly or through the `script!` macro) or loaded from
//! JSON/TOML data, and collected into a validated [`NodeStore`].
//!
//! # Example
//!
//! ```rust
//! use rust_dialogue::script::{Answer, Node, NodeStore};
//!
//! let store = NodeStore::new(vec![
//!     Node::input("ask", "Your name?", "name").then("go").into(),
//!     Node::choice("go", "Ready, ${name}?")
//!         .answer(Answer::new("Yes").then("bye"))
//!         .answer(Answer::new("No"))
//!         .into(),
//!     Node::message("bye", "See you, ${name}").into(),
//! ])
//! .unwrap();
//!
//! assert_eq!(store.len(), 3);
//! assert!(store.unresolvable_placeholders().is_empty());
//! ```

pub mod callback;
pub mod node;
pub mod raw;
pub mod store;

pub use callback::{Callback, CallbackRegistry};
pub use node::{Answer, InputSpec, MessageNode, Node, QuestionKind, QuestionNode};
pub use raw::{RawAnswer, RawInput, RawNode};
pub use store::{NodeStore, placeholders};
