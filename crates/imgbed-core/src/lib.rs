//! imgbed Core Library
//!
//! This crate provides the data model, upload limits, configuration and the
//! collaborator contracts (transport, clipboard, download) shared by every
//! imgbed component.

pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod limits;
pub mod models;
pub mod sinks;
pub mod transport;

// Re-export commonly used types
pub use config::{ClientConfig, ConfigError};
pub use error::TransportError;
pub use format::{file_extension, format_file_size, mime_type_for_filename};
pub use limits::UploadLimits;
pub use models::{
    BatchFailure, BatchOutcome, HealthStatus, ImageRecord, LinkFormat, PagedImages,
    SelectedFile, StatsSummary, UploadOutcome, UploadSession,
};
pub use sinks::{ClipboardSink, DownloadSink};
pub use transport::{noop_progress, ProgressCallback, Transport};
