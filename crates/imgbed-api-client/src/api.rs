//! Domain methods for the imgbed API and the `Transport` implementation.

use async_trait::async_trait;
use imgbed_core::{
    BatchFailure, BatchOutcome, HealthStatus, ImageRecord, PagedImages, ProgressCallback,
    SelectedFile, StatsSummary, Transport, TransportError,
};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::Deserialize;
use std::sync::Arc;

use crate::progress::{tracked_stream, UploadProgress};
use crate::{api_path, ApiClient};

/// `data` of the batch upload response.
#[derive(Debug, Deserialize)]
pub struct BatchUploadData {
    #[serde(default)]
    pub successful: usize,
    #[serde(default)]
    pub failed: usize,
    pub results: Option<Vec<BatchResultItem>>,
    pub errors: Option<Vec<BatchErrorItem>>,
}

#[derive(Debug, Deserialize)]
pub struct BatchResultItem {
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(flatten)]
    pub record: ImageRecord,
}

#[derive(Debug, Deserialize)]
pub struct BatchErrorItem {
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub error: String,
}

impl BatchUploadData {
    /// Reconcile against the submitted names so every file has exactly one entry.
    pub fn into_outcome(self, submitted: &[String]) -> BatchOutcome {
        let successes = self
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|item| (item.index, item.record))
            .collect();

        let failures = self
            .errors
            .unwrap_or_default()
            .into_iter()
            .map(|item| {
                let filename = if item.filename.is_empty() {
                    item.index
                        .and_then(|i| submitted.get(i).cloned())
                        .unwrap_or_default()
                } else {
                    item.filename
                };
                BatchFailure {
                    index: item.index,
                    filename,
                    reason: item.error,
                }
            })
            .collect();

        BatchOutcome::from_parts(submitted, successes, failures)
    }
}

impl ApiClient {
    fn file_part(
        &self,
        file: &SelectedFile,
        progress: &Arc<UploadProgress>,
    ) -> Result<Part, TransportError> {
        let body = Body::wrap_stream(tracked_stream(file.data.clone(), Arc::clone(progress)));
        Part::stream_with_length(body, file.data.len() as u64)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| {
                TransportError::Request(format!("invalid MIME type {}: {}", file.mime_type, e))
            })
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn upload_single(
        &self,
        file: &SelectedFile,
        on_progress: ProgressCallback,
    ) -> Result<ImageRecord, TransportError> {
        let progress = UploadProgress::new(file.data.len() as u64, on_progress);
        let form = Form::new().part("image", self.file_part(file, &progress)?);

        tracing::debug!(name = %file.name, bytes = file.data.len(), "Uploading image");

        let record: ImageRecord = self
            .post_multipart(&api_path("/images/upload"), form)
            .await?;

        tracing::info!(uuid = %record.uuid, name = %record.original_name, "Image uploaded");
        Ok(record)
    }

    async fn upload_batch(
        &self,
        files: &[SelectedFile],
        on_progress: ProgressCallback,
    ) -> Result<BatchOutcome, TransportError> {
        let total: u64 = files.iter().map(|f| f.data.len() as u64).sum();
        let progress = UploadProgress::new(total, on_progress);

        let mut form = Form::new();
        for file in files {
            form = form.part("images", self.file_part(file, &progress)?);
        }

        tracing::debug!(files = files.len(), bytes = total, "Uploading batch");

        let data: BatchUploadData = self.post_multipart(&api_path("/batch-upload"), form).await?;
        let (reported_ok, reported_failed) = (data.successful, data.failed);

        let submitted: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        let outcome = data.into_outcome(&submitted);

        tracing::info!(
            successful = outcome.success_count,
            failed = outcome.failure_count,
            reported_successful = reported_ok,
            reported_failed = reported_failed,
            "Batch uploaded"
        );
        Ok(outcome)
    }

    async fn fetch_record(&self, uuid: &str) -> Result<ImageRecord, TransportError> {
        let path = api_path(&format!("/images/{}", urlencoding::encode(uuid)));
        self.get_data(&path, &[]).await
    }

    async fn fetch_summary(&self) -> Result<StatsSummary, TransportError> {
        self.get_data(&api_path("/images/stats/summary"), &[]).await
    }

    async fn list_images(&self, page: u32, page_size: u32) -> Result<PagedImages, TransportError> {
        let query = [("page", page.to_string()), ("page_size", page_size.to_string())];
        self.get_data(&api_path("/images"), &query).await
    }

    async fn delete_image(&self, uuid: &str) -> Result<(), TransportError> {
        let path = api_path(&format!("/images/{}", urlencoding::encode(uuid)));
        self.delete(&path).await?;
        tracing::info!(uuid = %uuid, "Image deleted");
        Ok(())
    }

    async fn health(&self) -> Result<HealthStatus, TransportError> {
        self.get_json("/health").await
    }
}
