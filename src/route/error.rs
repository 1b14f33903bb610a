//! Per-request failure type.

use thiserror::Error;

use crate::persistence::PersistenceError;

/// Message sent to clients when a failure carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Internal server error";

/// Failure raised from a middleware chain or a unit's `exec`.
///
/// Always recovered by the dispatcher adapter and turned into a 500 response.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Failure with a client-visible message.
    #[error("{0}")]
    Message(String),

    /// Failure without a message; the generic message is reported instead.
    #[error("")]
    Unspecified,

    /// Persistence handle failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Request body could not be read or decoded.
    #[error("invalid request body: {0}")]
    Body(String),

    /// The middleware chain or `exec` panicked.
    #[error("{0}")]
    Panic(String),
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        HandlerError::Message(message.into())
    }

    /// Message to report to the client, falling back to the generic one.
    pub fn client_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}
