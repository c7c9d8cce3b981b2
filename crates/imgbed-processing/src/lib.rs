//! imgbed Media Processing Library
//!
//! Pre-flight validation of selected files and in-memory image processing
//! (dimension probe, resize/recompress, thumbnail).

pub mod compression;
pub mod error;
pub mod handle;
pub mod image;
pub mod pipeline;
pub mod traits;
pub mod validator;

// Re-export commonly used types
pub use compression::OutputFormat;
pub use error::ProcessingError;
pub use handle::{HandleTracker, SourceHandle};
pub use self::image::{fit_within, RasterCodec};
pub use pipeline::{MediaProcessor, ProcessOptions, ProcessedPayload};
pub use traits::{Dimensions, Encoded, ImageCodec, ResizeOptions};
pub use validator::{ValidationError, ValidationResult, Validator};
