//! Upload coordinator
//!
//! Owns the transport, the validator, the media processor, the session
//! tracker and the client state handle. Every upload call holds a
//! [`SessionGuard`](crate::session::SessionGuard) from start to settle, writes
//! successful records into the state and refreshes server statistics once.

use imgbed_core::constants::{BATCH_UPLOAD_FAILED_FALLBACK, UPLOAD_FAILED_FALLBACK};
use imgbed_core::{
    noop_progress, BatchOutcome, ImageRecord, PagedImages, ProgressCallback, SelectedFile,
    StatsSummary, Transport, UploadLimits, UploadOutcome, UploadSession,
};
use imgbed_processing::{MediaProcessor, ProcessOptions, Validator};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::UploadError;
use crate::session::{SessionGuard, SessionTracker};
use crate::state::StateHandle;

pub struct UploadCoordinator {
    transport: Arc<dyn Transport>,
    validator: Validator,
    processor: MediaProcessor,
    session: SessionTracker,
    state: StateHandle,
}

impl UploadCoordinator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            validator: Validator::default(),
            processor: MediaProcessor::default(),
            session: SessionTracker::new(),
            state: StateHandle::default(),
        }
    }

    pub fn with_limits(mut self, limits: UploadLimits) -> Self {
        self.validator = Validator::new(limits);
        self
    }

    pub fn with_state(mut self, state: StateHandle) -> Self {
        self.state = state;
        self
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn processor(&self) -> &MediaProcessor {
        &self.processor
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    pub fn session(&self) -> UploadSession {
        self.session.current()
    }

    /// Observe session changes; the receiver always holds the latest value.
    pub fn subscribe(&self) -> watch::Receiver<UploadSession> {
        self.session.subscribe()
    }

    /// Upload one file as-is.
    ///
    /// Transport failures are reported as [`UploadOutcome::Failure`]; the only
    /// `Err` is [`UploadError::SessionBusy`].
    pub async fn upload_single(
        &self,
        file: &SelectedFile,
        on_progress: Option<ProgressCallback>,
    ) -> Result<UploadOutcome, UploadError> {
        let guard = self.session.begin()?;
        Ok(self.run_single(&guard, file, on_progress).await)
    }

    /// Upload all files in one request.
    ///
    /// A request-level failure yields [`UploadError::BatchFailed`] and no
    /// per-file results.
    pub async fn upload_batch(
        &self,
        files: &[SelectedFile],
        on_progress: Option<ProgressCallback>,
    ) -> Result<BatchOutcome, UploadError> {
        if files.is_empty() {
            return Err(UploadError::EmptyBatch);
        }
        let guard = self.session.begin()?;
        self.run_batch(&guard, files, on_progress).await
    }

    /// Validate, optionally process, then upload one file.
    ///
    /// Validation runs before the session starts and before any processing.
    pub async fn validate_and_upload_single(
        &self,
        file: &SelectedFile,
        processing: Option<&ProcessOptions>,
        on_progress: Option<ProgressCallback>,
    ) -> Result<UploadOutcome, UploadError> {
        self.validator.validate_file(file)?;
        let guard = self.session.begin()?;

        let payload = match processing {
            Some(options) => self.processor.process(file, options).await?.into_file(),
            None => file.clone(),
        };

        Ok(self.run_single(&guard, &payload, on_progress).await)
    }

    /// Validate the whole batch, optionally process every file, then upload.
    pub async fn validate_and_upload_batch(
        &self,
        files: &[SelectedFile],
        processing: Option<&ProcessOptions>,
        on_progress: Option<ProgressCallback>,
    ) -> Result<BatchOutcome, UploadError> {
        if files.is_empty() {
            return Err(UploadError::EmptyBatch);
        }
        self.validator.validate_batch(files)?;
        let guard = self.session.begin()?;

        let payloads = match processing {
            Some(options) => {
                let mut payloads = Vec::with_capacity(files.len());
                for file in files {
                    payloads.push(self.processor.process(file, options).await?.into_file());
                }
                payloads
            }
            None => files.to_vec(),
        };

        self.run_batch(&guard, &payloads, on_progress).await
    }

    async fn run_single(
        &self,
        guard: &SessionGuard,
        file: &SelectedFile,
        on_progress: Option<ProgressCallback>,
    ) -> UploadOutcome {
        let progress = guard.progress_callback(on_progress.unwrap_or_else(noop_progress));

        match self.transport.upload_single(file, progress).await {
            Ok(record) => {
                tracing::info!(uuid = %record.uuid, name = %file.name, "Upload succeeded");
                self.state.record_single_success(record.clone());
                self.refresh_stats().await;
                UploadOutcome::Success { record }
            }
            Err(e) => {
                tracing::warn!(name = %file.name, error = %e, "Upload failed");
                UploadOutcome::Failure {
                    filename: file.name.clone(),
                    reason: e
                        .user_message()
                        .unwrap_or_else(|| UPLOAD_FAILED_FALLBACK.to_string()),
                }
            }
        }
    }

    async fn run_batch(
        &self,
        guard: &SessionGuard,
        files: &[SelectedFile],
        on_progress: Option<ProgressCallback>,
    ) -> Result<BatchOutcome, UploadError> {
        let progress = guard.progress_callback(on_progress.unwrap_or_else(noop_progress));

        match self.transport.upload_batch(files, progress).await {
            Ok(outcome) => {
                tracing::info!(
                    files = files.len(),
                    successful = outcome.success_count,
                    failed = outcome.failure_count,
                    "Batch upload settled"
                );
                self.state
                    .record_batch_successes(outcome.successes.clone());
                self.refresh_stats().await;
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(files = files.len(), error = %e, "Batch upload failed");
                Err(UploadError::BatchFailed {
                    reason: e
                        .user_message()
                        .unwrap_or_else(|| BATCH_UPLOAD_FAILED_FALLBACK.to_string()),
                })
            }
        }
    }

    /// Replace the stats with the server's summary; `None` leaves them as they were.
    pub async fn refresh_stats(&self) -> Option<StatsSummary> {
        self.state.refresh_stats(self.transport.as_ref()).await.ok()
    }

    /// `None` when the server has no such record or the lookup failed.
    pub async fn fetch_record(&self, uuid: &str) -> Option<ImageRecord> {
        match self.transport.fetch_record(uuid).await {
            Ok(record) => Some(record),
            Err(e) if e.is_not_found() => {
                tracing::debug!(uuid = %uuid, "Record not found");
                None
            }
            Err(e) => {
                tracing::warn!(uuid = %uuid, error = %e, "Failed to fetch record");
                None
            }
        }
    }

    /// Delete on the server, then drop the local entry.
    pub async fn delete_remote(&self, uuid: &str) -> Result<(), UploadError> {
        self.transport.delete_image(uuid).await?;
        self.state.remove(uuid);
        Ok(())
    }

    pub async fn list_remote(&self, page: u32, page_size: u32) -> Result<PagedImages, UploadError> {
        Ok(self.transport.list_images(page, page_size).await?)
    }
}
