use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Invalid processing options: {0}")]
    InvalidOptions(String),

    #[error("Processing task failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for ProcessingError {
    fn from(err: tokio::task::JoinError) -> Self {
        ProcessingError::Join(err.to_string())
    }
}
