//! In-memory transport for coordinator tests

use async_trait::async_trait;
use chrono::Utc;
use imgbed_core::{
    BatchFailure, BatchOutcome, HealthStatus, ImageRecord, PagedImages, ProgressCallback,
    SelectedFile, StatsSummary, Transport, TransportError,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn record_for(file: &SelectedFile, id: u64) -> ImageRecord {
    ImageRecord {
        id,
        uuid: format!("uuid-{}", file.name),
        original_name: file.name.clone(),
        byte_size: file.data.len() as u64,
        mime_type: file.mime_type.clone(),
        width: 0,
        height: 0,
        public_url: format!("https://cdn.example.com/{}", file.name),
        created_at: Utc::now(),
    }
}

#[derive(Default)]
pub struct MockTransport {
    /// Error returned by the next single upload.
    pub single_error: Mutex<Option<TransportError>>,
    /// Error returned by the next batch upload.
    pub batch_error: Mutex<Option<TransportError>>,
    /// Names the server refuses inside a batch.
    pub batch_rejects: Mutex<HashSet<String>>,
    /// `None` makes the summary endpoint fail.
    pub summary: Mutex<Option<StatsSummary>>,
    /// Percentages reported to the progress callback during an upload.
    pub progress_steps: Mutex<Vec<u8>>,
    /// Uploads wait here before answering, when set.
    pub gate: Option<Arc<Notify>>,
    /// Every file received by an upload call, in order.
    pub received: Mutex<Vec<SelectedFile>>,
    pub records: Mutex<Vec<ImageRecord>>,

    pub single_calls: AtomicUsize,
    pub batch_calls: AtomicUsize,
    pub summary_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        let mock = Self::default();
        *mock.summary.lock().unwrap() = Some(StatsSummary {
            total_images: 7,
            total_size: 7000,
            today_images: 1,
        });
        mock
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }

    pub fn network_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
            + self.batch_calls.load(Ordering::SeqCst)
            + self.summary_calls.load(Ordering::SeqCst)
            + self.delete_calls.load(Ordering::SeqCst)
    }

    async fn before_answer(&self, on_progress: &ProgressCallback) {
        let steps = self.progress_steps.lock().unwrap().clone();
        for step in steps {
            on_progress(step);
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn upload_single(
        &self,
        file: &SelectedFile,
        on_progress: ProgressCallback,
    ) -> Result<ImageRecord, TransportError> {
        let n = self.single_calls.fetch_add(1, Ordering::SeqCst) as u64;
        self.received.lock().unwrap().push(file.clone());
        self.before_answer(&on_progress).await;

        if let Some(err) = self.single_error.lock().unwrap().take() {
            return Err(err);
        }
        let record = record_for(file, n + 1);
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn upload_batch(
        &self,
        files: &[SelectedFile],
        on_progress: ProgressCallback,
    ) -> Result<BatchOutcome, TransportError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().extend(files.iter().cloned());
        self.before_answer(&on_progress).await;

        if let Some(err) = self.batch_error.lock().unwrap().take() {
            return Err(err);
        }

        let rejects = self.batch_rejects.lock().unwrap().clone();
        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for (i, file) in files.iter().enumerate() {
            if rejects.contains(&file.name) {
                failures.push(BatchFailure {
                    index: Some(i),
                    filename: file.name.clone(),
                    reason: "Failed to save file".to_string(),
                });
            } else {
                successes.push((Some(i), record_for(file, i as u64 + 1)));
            }
        }

        let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        Ok(BatchOutcome::from_parts(&names, successes, failures))
    }

    async fn fetch_record(&self, uuid: &str) -> Result<ImageRecord, TransportError> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.uuid == uuid)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(format!("image {}", uuid)))
    }

    async fn fetch_summary(&self) -> Result<StatsSummary, TransportError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        self.summary
            .lock()
            .unwrap()
            .ok_or_else(|| TransportError::InvalidResponse("malformed summary".to_string()))
    }

    async fn list_images(&self, page: u32, page_size: u32) -> Result<PagedImages, TransportError> {
        let records = self.records.lock().unwrap().clone();
        Ok(PagedImages {
            total: records.len() as u64,
            items: records,
            page,
            page_size,
        })
    }

    async fn delete_image(&self, uuid: &str) -> Result<(), TransportError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.uuid != uuid);
        if records.len() == before {
            return Err(TransportError::NotFound(format!("image {}", uuid)));
        }
        Ok(())
    }

    async fn health(&self) -> Result<HealthStatus, TransportError> {
        Ok(HealthStatus {
            status: "ok".to_string(),
            timestamp: 0,
            service: "mock".to_string(),
        })
    }
}
