//! Tests for error messages and classification.

use std::error::Error as _;

use rust_dialogue::DialogueError;

#[test]
fn no_matching_answer_lists_choices() {
    let err = DialogueError::no_matching_answer("menu", "Maybe", vec!["Yes".into(), "No".into()]);
    let msg = err.to_string();
    assert!(msg.starts_with("no answer of question 'menu' matches 'Maybe'"));
    assert!(msg.contains("Expected one of: 'Yes', 'No'"));
}

#[test]
fn no_matching_answer_truncates_long_answers() {
    let answer = "x".repeat(200);
    let err = DialogueError::no_matching_answer("q", answer, Vec::new());
    let msg = err.to_string();
    assert!(msg.contains("...' (200 chars)"));
    assert!(!msg.contains("Expected one of"));

    let empty = DialogueError::no_matching_answer("q", "", Vec::new());
    assert!(empty.to_string().ends_with("(empty answer)"));
}

#[test]
fn classification() {
    assert!(DialogueError::invalid_advance("answer", "no question is waiting").is_invalid_advance());
    assert!(DialogueError::busy("init").is_busy());
    assert!(DialogueError::node_not_found("x").is_not_found());
    assert!(DialogueError::invalid_node("a", "no text").is_validation());
    assert!(DialogueError::invalid_data_shape("not a sequence").is_validation());
    assert!(!DialogueError::EmptyScript.is_busy());
}

#[test]
fn display_messages() {
    assert_eq!(
        DialogueError::busy("next").to_string(),
        "cannot next while a timer is outstanding"
    );
    assert_eq!(
        DialogueError::node_not_found("intro").to_string(),
        "no node with id 'intro'"
    );
    assert_eq!(DialogueError::EmptyScript.to_string(), "script contains no nodes");
}

#[test]
fn io_context_keeps_source() {
    let err = DialogueError::io_context(
        "reading script",
        std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    );
    assert_eq!(err.to_string(), "reading script: gone");
    assert!(err.source().is_some());
}
