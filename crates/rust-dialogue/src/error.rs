//! Error types for rust-dialogue.
//!
//! This module defines all error types used throughout the library.
//! Every failure is synchronous and fatal to the call that raised it; the
//! engine validates before it mutates, so a returned error always leaves the
//! conversation exactly as it was before the call.

use thiserror::Error;

/// Maximum length of answer text to display in error messages.
const MAX_ANSWER_DISPLAY: usize = 80;

/// Format answer text for display, truncating if necessary.
fn format_answer_snippet(answer: &str) -> String {
    if answer.is_empty() {
        return "(empty answer)".to_string();
    }

    let total = answer.chars().count();
    if total <= MAX_ANSWER_DISPLAY {
        return format!("'{answer}'");
    }

    let head: String = answer.chars().take(MAX_ANSWER_DISPLAY).collect();
    format!("'{head}...' ({total} chars)")
}

/// Format a no-matching-answer error message.
fn format_no_matching_answer(question: &str, answer: &str, choices: &[String]) -> String {
    let answer = format_answer_snippet(answer);
    if choices.is_empty() {
        return format!("no answer of question '{question}' matches {answer}");
    }

    format!(
        "no answer of question '{question}' matches {answer}\n\
         \n\
         Expected one of: {}",
        choices
            .iter()
            .map(|c| format!("'{c}'"))
            .collect::<Vec<_>>()
            .join(", ")
    )
}

/// The main error type for rust-dialogue operations.
#[derive(Debug, Error)]
pub enum DialogueError {
    /// The node collection is malformed (e.g. not a sequence).
    #[error("invalid data shape: {message}")]
    InvalidDataShape {
        /// Description of what's wrong with the data.
        message: String,
    },

    /// A node is neither/both a message and a question, or a question has
    /// neither/both branch kinds.
    #[error("invalid node '{id}': {reason}")]
    InvalidNodeShape {
        /// Identifier of the offending node (may be empty).
        id: String,
        /// Why the node was rejected.
        reason: String,
    },

    /// An identifier did not resolve to any node.
    #[error("no node with id '{id}'")]
    NodeNotFound {
        /// The identifier that was not found.
        id: String,
    },

    /// The script contains no nodes to start from.
    #[error("script contains no nodes")]
    EmptyScript,

    /// `init`, `answer` or `next` called outside its valid state.
    #[error("cannot {operation}: {reason}")]
    InvalidAdvance {
        /// The rejected operation.
        operation: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A callback field could not be resolved to something invocable.
    #[error("the callback for '{answer}' is not invocable: {reason}")]
    InvalidCallback {
        /// Text of the answer carrying the callback.
        answer: String,
        /// Why the callback was rejected.
        reason: String,
    },

    /// An answer matched none of the choices of the current question.
    #[error("{}", format_no_matching_answer(question, answer, choices))]
    NoMatchingAnswer {
        /// Identifier of the current question.
        question: String,
        /// The answer that was given.
        answer: String,
        /// The texts that would have matched.
        choices: Vec<String>,
    },

    /// A call arrived while a typing or delay timer was outstanding.
    #[error("cannot {operation} while a timer is outstanding")]
    EngineBusy {
        /// The rejected operation.
        operation: &'static str,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Malformed JSON input.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML input.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An I/O error occurred with additional context.
    #[error("{context}: {source}")]
    IoWithContext {
        /// What operation was being performed.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for rust-dialogue operations.
pub type Result<T> = std::result::Result<T, DialogueError>;

impl DialogueError {
    /// Create an invalid data shape error.
    pub fn invalid_data_shape(message: impl Into<String>) -> Self {
        Self::InvalidDataShape {
            message: message.into(),
        }
    }

    /// Create an invalid node shape error.
    pub fn invalid_node(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidNodeShape {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a node not found error.
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    /// Create an invalid advance error.
    pub fn invalid_advance(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidAdvance {
            operation,
            reason: reason.into(),
        }
    }

    /// Create an invalid callback error.
    pub fn invalid_callback(answer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCallback {
            answer: answer.into(),
            reason: reason.into(),
        }
    }

    /// Create a no matching answer error.
    pub fn no_matching_answer(
        question: impl Into<String>,
        answer: impl Into<String>,
        choices: Vec<String>,
    ) -> Self {
        Self::NoMatchingAnswer {
            question: question.into(),
            answer: answer.into(),
            choices,
        }
    }

    /// Create an engine busy error.
    #[must_use]
    pub const fn busy(operation: &'static str) -> Self {
        Self::EngineBusy { operation }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_context(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoWithContext {
            context: context.into(),
            source,
        }
    }

    /// Wrap an I/O result with context.
    pub fn with_io_context<T>(result: std::io::Result<T>, context: impl Into<String>) -> Result<T> {
        result.map_err(|e| Self::io_context(context, e))
    }

    /// Check if this is an invalid advance error.
    #[must_use]
    pub const fn is_invalid_advance(&self) -> bool {
        matches!(self, Self::InvalidAdvance { .. })
    }

    /// Check if this is an engine busy error.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::EngineBusy { .. })
    }

    /// Check if this is a node not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound { .. })
    }

    /// Check if this error was raised while validating node data.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDataShape { .. }
                | Self::InvalidNodeShape { .. }
                | Self::InvalidCallback { .. }
                | Self::Json(_)
                | Self::Toml(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DialogueError::node_not_found("intro");
        assert_eq!(err.to_string(), "no node with id 'intro'");
        assert!(err.is_not_found());
    }

    #[test]
    fn no_matching_answer_lists_choices() {
        let err = DialogueError::no_matching_answer(
            "go",
            "Z",
            vec!["A".to_string(), "B".to_string()],
        );
        let msg = err.to_string();
        assert!(msg.contains("'go'"));
        assert!(msg.contains("'Z'"));
        assert!(msg.contains("Expected one of: 'A', 'B'"));
    }

    #[test]
    fn no_matching_answer_truncates_long_answers() {
        let long = "x".repeat(200);
        let err = DialogueError::no_matching_answer("q", long, Vec::new());
        let msg = err.to_string();
        assert!(msg.contains("(200 chars)"));
        assert!(!msg.contains("Expected one of"));
    }

    #[test]
    fn format_answer_snippet_empty() {
        assert_eq!(format_answer_snippet(""), "(empty answer)");
    }

    #[test]
    fn invalid_advance_display() {
        let err = DialogueError::invalid_advance("answer", "conversation has finished");
        assert_eq!(err.to_string(), "cannot answer: conversation has finished");
        assert!(err.is_invalid_advance());
        assert!(!err.is_busy());
    }

    #[test]
    fn busy_display() {
        let err = DialogueError::busy("next");
        assert_eq!(err.to_string(), "cannot next while a timer is outstanding");
        assert!(err.is_busy());
    }

    #[test]
    fn invalid_callback_display() {
        let err = DialogueError::invalid_callback("Yes", "expected a callback name");
        assert!(err.to_string().contains("'Yes'"));
        assert!(err.is_validation());
    }

    #[test]
    fn io_with_context_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = DialogueError::io_context("reading script file", io_err);
        let msg = err.to_string();
        assert!(msg.contains("reading script file"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn with_io_context_success() {
        let result: std::io::Result<i32> = Ok(42);
        let value = DialogueError::with_io_context(result, "some operation").unwrap();
        assert_eq!(value, 42);
    }
}
