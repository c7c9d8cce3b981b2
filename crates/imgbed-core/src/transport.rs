//! Remote collaborator contract.
//!
//! The transport owns everything about the wire: endpoints, authorization
//! headers and timeouts. The pipeline only hands it file bytes and metadata.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::TransportError;
use crate::models::{
    BatchOutcome, HealthStatus, ImageRecord, PagedImages, SelectedFile, StatsSummary,
};

/// Receives request-level upload progress (0-100, non-decreasing within one call).
///
/// There is no guarantee of a final `100` before the call settles.
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Upload one file and return the stored record.
    async fn upload_single(
        &self,
        file: &SelectedFile,
        on_progress: ProgressCallback,
    ) -> Result<ImageRecord, TransportError>;

    /// Upload all files in one multipart request.
    ///
    /// An `Err` means the request as a whole failed; per-file failures are
    /// reported inside the `BatchOutcome`.
    async fn upload_batch(
        &self,
        files: &[SelectedFile],
        on_progress: ProgressCallback,
    ) -> Result<BatchOutcome, TransportError>;

    async fn fetch_record(&self, uuid: &str) -> Result<ImageRecord, TransportError>;

    async fn fetch_summary(&self) -> Result<StatsSummary, TransportError>;

    async fn list_images(&self, page: u32, page_size: u32) -> Result<PagedImages, TransportError>;

    async fn delete_image(&self, uuid: &str) -> Result<(), TransportError>;

    async fn health(&self) -> Result<HealthStatus, TransportError>;
}

/// Progress callback that ignores every update.
pub fn noop_progress() -> ProgressCallback {
    Arc::new(|_| {})
}
