//! Clipboard and download sinks.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::TransportError;

/// Best-effort text clipboard.
///
/// Implementations must not fail loudly: an unavailable clipboard returns `false`.
#[async_trait]
pub trait ClipboardSink: Send + Sync {
    async fn copy_text(&self, text: &str) -> bool;
}

/// Saves a remote file locally under the given name.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Returns the path the file was written to.
    async fn trigger_download(&self, url: &str, filename: &str) -> Result<PathBuf, TransportError>;
}
