use imgbed_core::TransportError;
use imgbed_processing::{ProcessingError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("An upload is already in progress")]
    SessionBusy,

    #[error("No files selected")]
    EmptyBatch,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The batch request failed as a whole; no per-file results exist.
    #[error("{reason}")]
    BatchFailed { reason: String },
}
