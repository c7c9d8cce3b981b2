//! Error types module
//!
//! `TransportError` covers every failure of the remote collaborator and of the
//! download sink. Validation and processing errors live next to the code that
//! raises them in `imgbed-processing`.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("{0}")]
    Request(String),

    /// Non-2xx response. `message` is the server's `error` field when present.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The server answered 2xx with `success: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    /// The message to surface to a user, or `None` when the collaborator gave
    /// nothing usable.
    pub fn user_message(&self) -> Option<String> {
        let message = self.to_string();
        if message.trim().is_empty() {
            None
        } else {
            Some(message)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::NotFound(_))
            || matches!(self, TransportError::Status { status: 404, .. })
    }
}
