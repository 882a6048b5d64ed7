//! # Validation Errors
//!
//! Failures detected on the client before any request is issued. A
//! [`ValidationError`] never reaches the network layer.

use thiserror::Error;

/// Client-side rejection of an operation's input or of the cached state it
/// would act on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required free-text field is empty or whitespace only.
    #[error("{field} must not be empty")]
    EmptyText {
        /// Name of the rejected field (e.g. "reply text", "reason").
        field: &'static str,
    },

    /// The dispute no longer accepts replies.
    #[error("dispute {dispute_id} is {status} and no longer accepts replies")]
    RepliesClosed {
        /// The dispute identifier.
        dispute_id: String,
        /// The status that locks the message log.
        status: String,
    },

    /// A status change would move the dispute backwards or leave a terminal
    /// state.
    #[error("invalid dispute transition from {from} to {to}")]
    InvalidTransition {
        /// The current status name.
        from: String,
        /// The attempted status name.
        to: String,
    },

    /// An identifier cannot name a single path segment.
    #[error("\"{value}\" is not a valid identifier")]
    InvalidIdentifier {
        /// The rejected identifier.
        value: String,
    },
}
