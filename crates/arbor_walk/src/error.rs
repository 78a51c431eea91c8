//! Walk error types.

use thiserror::Error;

/// Boxed error produced by an asynchronous decision function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during a traversal.
#[derive(Debug, Error)]
pub enum WalkError {
    /// Replace or Delete was returned for the root node.
    #[error("Cannot {decision} the root node: it has no container")]
    InvalidRootMutation {
        /// Name of the rejected decision (`replace` or `delete`).
        decision: &'static str,
    },

    /// A decision variant that is not part of the flow-control vocabulary.
    #[error("Unknown decision: {0}")]
    UnknownDecision(String),

    /// The asynchronous decision function failed.
    #[error("Decision function failed: {0}")]
    Decide(#[source] BoxError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WalkError {
    /// Creates an unknown decision error.
    pub fn unknown_decision(description: impl Into<String>) -> Self {
        Self::UnknownDecision(description.into())
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Wraps a failure reported by an asynchronous decision function.
    pub fn decide(error: impl Into<BoxError>) -> Self {
        Self::Decide(error.into())
    }
}
