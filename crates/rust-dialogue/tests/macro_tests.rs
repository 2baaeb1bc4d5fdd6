//! Integration tests for the `script!` macro.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::Run;
use rust_dialogue::{FlowConfig, Node, NodeStore, QuestionKind, script};

#[test]
fn script_macro_builds_nodes() {
    let nodes = script! {
        message "intro": "Hello!" => "ask";
        input "ask": "Your name?" as "name" => "q";
        choice "q": "Go, ${name}?" { "A" => "n2", "B" };
        message "n2": "Going";
    };

    assert_eq!(nodes.len(), 4);
    assert_eq!(nodes[0].id(), "intro");
    let Node::Question(ask) = &nodes[1] else {
        panic!("ask is a question");
    };
    assert!(matches!(&ask.kind, QuestionKind::Input(input) if input.variable == "name"));
    assert_eq!(nodes[2].successors().collect::<Vec<_>>(), vec!["n2"]);
    assert!(NodeStore::new(nodes).is_ok());
}

#[test]
fn script_macro_accepts_braces_and_empty() {
    let nodes: Vec<Node> = script! {{ message "only": "Hi" }};
    assert_eq!(nodes.len(), 1);

    let empty = script! {};
    assert!(empty.is_empty());
}

#[test]
fn script_macro_callbacks_run() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut run = Run::new(
        script! {
            choice "q": "Proceed?" {
                "Yes" => "done" on move || { counter.fetch_add(1, Ordering::SeqCst); },
                "No"
            };
            message "done": "Done.";
        },
        FlowConfig::default(),
    );
    run.start();
    run.reply("Yes");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(run.texts(), vec!["Proceed?", "Done."]);
}
