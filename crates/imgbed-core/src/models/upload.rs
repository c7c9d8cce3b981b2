use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use super::image::ImageRecord;
use crate::constants::MISSING_BATCH_RESULT;
use crate::format::mime_type_for_filename;

/// A local file selected for upload.
///
/// `byte_size` is the declared size used by the validator; it matches
/// `data.len()` for files built with [`SelectedFile::new`].
#[derive(Clone, Debug)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub data: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            byte_size: data.len() as u64,
            data,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let mime_type = mime_type_for_filename(&name);
        Ok(Self::new(name, mime_type, data))
    }

    /// Same name and MIME type, new content.
    pub fn with_data(&self, data: impl Into<Bytes>) -> Self {
        Self::new(self.name.clone(), self.mime_type.clone(), data)
    }
}

/// Result of uploading one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadOutcome {
    Success { record: ImageRecord },
    Failure { filename: String, reason: String },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success { .. })
    }

    pub fn record(&self) -> Option<&ImageRecord> {
        match self {
            UploadOutcome::Success { record } => Some(record),
            UploadOutcome::Failure { .. } => None,
        }
    }
}

/// A file the server could not store as part of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Zero-based position in the submitted batch, when known.
    pub index: Option<usize>,
    pub filename: String,
    pub reason: String,
}

/// Per-file results of one batch request.
///
/// `success_count + failure_count` always equals the number of submitted files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub successes: Vec<ImageRecord>,
    pub failures: Vec<BatchFailure>,
    pub success_count: usize,
    pub failure_count: usize,
}

impl BatchOutcome {
    /// Reconcile server-reported entries against the submitted file names.
    ///
    /// `successes` carry the server index when it reported one. Surplus entries
    /// are dropped; files the server did not mention become failures. When
    /// every entry carries an index, results are put back in submission order.
    pub fn from_parts(
        submitted: &[String],
        mut successes: Vec<(Option<usize>, ImageRecord)>,
        mut failures: Vec<BatchFailure>,
    ) -> Self {
        let expected = submitted.len();

        while successes.len() + failures.len() > expected {
            if failures.pop().is_none() {
                successes.pop();
            }
        }

        if successes.len() + failures.len() < expected {
            let covered: HashSet<usize> = successes
                .iter()
                .filter_map(|(index, _)| *index)
                .chain(failures.iter().filter_map(|f| f.index))
                .collect();
            let missing = expected - successes.len() - failures.len();

            let synthesized: Vec<BatchFailure> = (0..expected)
                .filter(|i| !covered.contains(i))
                .take(missing)
                .map(|i| BatchFailure {
                    index: Some(i),
                    filename: submitted[i].clone(),
                    reason: MISSING_BATCH_RESULT.to_string(),
                })
                .collect();

            tracing::warn!(
                submitted = expected,
                missing = synthesized.len(),
                "Batch response did not cover every submitted file"
            );
            failures.extend(synthesized);
        }

        // Submission order when the server indexed every entry.
        if successes.iter().all(|(index, _)| index.is_some()) {
            successes.sort_by_key(|(index, _)| *index);
        }
        if failures.iter().all(|f| f.index.is_some()) {
            failures.sort_by_key(|f| f.index);
        }

        let successes: Vec<ImageRecord> = successes.into_iter().map(|(_, r)| r).collect();
        Self {
            success_count: successes.len(),
            failure_count: failures.len(),
            successes,
            failures,
        }
    }

    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }
}

/// Observable state of the current upload call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSession {
    pub is_uploading: bool,
    pub progress_percent: u8,
}
