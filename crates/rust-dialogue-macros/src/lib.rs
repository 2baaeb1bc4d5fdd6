//! rust-dialogue-macros: Procedural macros for rust-dialogue
//!
//! This crate provides the [`script!`] macro, which declares the nodes of a
//! dialogue script inline and checks their shape at compile time.
//!
//! # Example
//!
//! ```ignore
//! use rust_dialogue::script;
//!
//! let nodes = script! {
//!     message "intro": "Hello!" => "ask";
//!     input "ask": "Your name?" as "name" => "go";
//!     choice "go": "Ready, ${name}?" { "Yes" => "bye", "No" };
//!     message "bye": "See you, ${name}";
//! };
//! ```

// In proc-macro crates, passing parsed input by value is idiomatic
#![allow(clippy::needless_pass_by_value)]

use proc_macro::TokenStream;
use syn::parse_macro_input;

mod script;

/// Declare the nodes of a dialogue script.
///
/// Expands to a `Vec<rust_dialogue::Node>` in declaration order, ready for
/// `NodeStore::new`.
///
/// # Nodes
///
/// - `message "id": "text"` - A message; `=> "next"` continues with another node
/// - `input "id": "question" as "variable"` - A free-text question capturing
///   the reply; `=> "next"` continues with another node
/// - `choice "id": "question" { "answer" => "next", ... }` - A multiple-choice
///   question; an answer may omit `=> "next"` to end the conversation and may
///   end with `on <callback>` to run a closure when chosen
///
/// Nodes are separated by `;`. Texts may contain `${name}` placeholders.
///
/// # Compile-time checks
///
/// - Node ids, next ids and variables must be non-empty
/// - A choice needs at least one answer, and answer texts must be unique
/// - Placeholders must be well formed (`${` needs a closing `}`, names are
///   non-empty)
///
/// # Examples
///
/// ```ignore
/// use rust_dialogue::{NodeStore, script};
///
/// let store = NodeStore::new(script! {
///     choice "q": "Proceed?" {
///         "Yes" => "done" on || println!("proceeding"),
///         "No"
///     };
///     message "done": "Done.";
/// })?;
/// ```
#[proc_macro]
pub fn script(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as script::ScriptInput);
    script::expand(input).into()
}
