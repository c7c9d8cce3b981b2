//! JSON response envelope: `{success, data, error, message, code}`.

use imgbed_core::TransportError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
    pub code: Option<String>,
}

impl<T> ApiEnvelope<T> {
    fn failure_message(&self) -> String {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    pub fn into_data(self) -> Result<T, TransportError> {
        if !self.success {
            return Err(TransportError::Rejected(self.failure_message()));
        }
        self.data
            .ok_or_else(|| TransportError::InvalidResponse("response has no data".to_string()))
    }

    pub fn into_unit(self) -> Result<(), TransportError> {
        if !self.success {
            return Err(TransportError::Rejected(self.failure_message()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// The `error` (or `message`) of a JSON error body, when present and non-blank.
pub fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error
        .into_iter()
        .chain(parsed.message)
        .map(|m| m.trim().to_string())
        .find(|m| !m.is_empty())
}
