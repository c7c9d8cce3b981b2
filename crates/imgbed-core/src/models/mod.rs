//! Domain models for the ingestion pipeline.

pub mod image;
pub mod stats;
pub mod upload;

pub use image::{ImageRecord, LinkFormat, PagedImages};
pub use stats::{HealthStatus, StatsSummary};
pub use upload::{BatchFailure, BatchOutcome, SelectedFile, UploadOutcome, UploadSession};
