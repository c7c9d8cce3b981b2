//! Codec capability used by the media processor.
//!
//! Decoding and encoding are hidden behind [`ImageCodec`] so the processor's
//! contract does not depend on a particular image library.

use bytes::Bytes;
use imgbed_core::constants::{
    DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY, THUMBNAIL_QUALITY,
};
use serde::{Deserialize, Serialize};

use crate::error::ProcessingError;

/// Natural (unscaled) pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Re-encoded image bytes and the dimensions they were written at.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub data: Bytes,
    pub dimensions: Dimensions,
}

/// Resize/recompress parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizeOptions {
    /// Encoder quality in `(0, 1]`.
    pub quality: f32,
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
        }
    }
}

impl ResizeOptions {
    /// Square-bounded, fixed-quality variant.
    pub fn thumbnail(size: u32) -> Self {
        Self {
            quality: THUMBNAIL_QUALITY,
            max_width: size,
            max_height: size,
        }
    }

    pub fn validate(&self) -> Result<(), ProcessingError> {
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(ProcessingError::InvalidOptions(format!(
                "quality must be in (0, 1], got {}",
                self.quality
            )));
        }
        if self.max_width == 0 || self.max_height == 0 {
            return Err(ProcessingError::InvalidOptions(format!(
                "maximum dimensions must be positive, got {}x{}",
                self.max_width, self.max_height
            )));
        }
        Ok(())
    }
}

/// Image codec capability
///
/// Implementations are synchronous and CPU-bound; the processor calls them
/// from a blocking task.
pub trait ImageCodec: Send + Sync + 'static {
    /// Decode `data` and report its natural dimensions.
    fn probe(&self, data: &[u8]) -> Result<Dimensions, ProcessingError>;

    /// Decode, fit within the bounds in `options` and re-encode as `mime_type`.
    fn reencode(
        &self,
        data: &[u8],
        mime_type: &str,
        options: &ResizeOptions,
    ) -> Result<Encoded, ProcessingError>;
}
