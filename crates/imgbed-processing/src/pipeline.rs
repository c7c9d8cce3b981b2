//! Media processing pipeline
//!
//! Runs codec work on the blocking pool so decode/encode is a suspension
//! point for the async caller, and wraps every operation in a scoped
//! source handle.

use bytes::Bytes;
use imgbed_core::SelectedFile;
use std::sync::Arc;

use crate::compression::OutputFormat;
use crate::error::ProcessingError;
use crate::handle::HandleTracker;
use crate::image::RasterCodec;
use crate::traits::{Dimensions, Encoded, ImageCodec, ResizeOptions};

/// What [`MediaProcessor::process`] should produce besides the probe.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessOptions {
    /// Resize/recompress the file itself.
    pub compress: Option<ResizeOptions>,
    /// Also produce a square-bounded thumbnail of this size.
    pub thumbnail_size: Option<u32>,
}

impl ProcessOptions {
    pub fn compressed(options: ResizeOptions) -> Self {
        Self {
            compress: Some(options),
            thumbnail_size: None,
        }
    }

    pub fn with_thumbnail(mut self, size: u32) -> Self {
        self.thumbnail_size = Some(size);
        self
    }
}

/// Bytes derived from a selected file, ready for upload.
#[derive(Debug, Clone)]
pub struct ProcessedPayload {
    /// Same name and MIME type as the source, possibly re-encoded bytes.
    pub file: SelectedFile,
    /// Probed dimensions, or the dimensions the file was resized to.
    /// `None` when the file was passed through undecoded.
    pub dimensions: Option<Dimensions>,
    pub thumbnail: Option<Encoded>,
}

impl ProcessedPayload {
    pub fn into_file(self) -> SelectedFile {
        self.file
    }
}

pub struct MediaProcessor<C: ImageCodec = RasterCodec> {
    codec: Arc<C>,
    handles: HandleTracker,
}

impl Default for MediaProcessor<RasterCodec> {
    fn default() -> Self {
        Self::new(RasterCodec)
    }
}

impl<C: ImageCodec> Clone for MediaProcessor<C> {
    fn clone(&self) -> Self {
        Self {
            codec: Arc::clone(&self.codec),
            handles: self.handles.clone(),
        }
    }
}

impl<C: ImageCodec> MediaProcessor<C> {
    pub fn new(codec: C) -> Self {
        Self {
            codec: Arc::new(codec),
            handles: HandleTracker::new(),
        }
    }

    pub fn handles(&self) -> &HandleTracker {
        &self.handles
    }

    async fn run<T, F>(&self, data: Bytes, op: F) -> Result<T, ProcessingError>
    where
        T: Send + 'static,
        F: FnOnce(&C, &[u8]) -> Result<T, ProcessingError> + Send + 'static,
    {
        let handle = self.handles.acquire(data);
        let codec = Arc::clone(&self.codec);

        tokio::task::spawn_blocking(move || op(codec.as_ref(), handle.bytes())).await?
    }

    /// Decode `data` and report its natural dimensions.
    pub async fn probe(&self, data: Bytes) -> Result<Dimensions, ProcessingError> {
        self.run(data, |codec, bytes| codec.probe(bytes)).await
    }

    /// Fit within the bounds and re-encode in `mime_type` at the given quality.
    pub async fn resize(
        &self,
        data: Bytes,
        mime_type: &str,
        options: ResizeOptions,
    ) -> Result<Encoded, ProcessingError> {
        options.validate()?;
        let mime_type = mime_type.to_string();
        self.run(data, move |codec, bytes| {
            codec.reencode(bytes, &mime_type, &options)
        })
        .await
    }

    /// Resize at the fixed thumbnail quality into a `size x size` box.
    pub async fn thumbnail(
        &self,
        data: Bytes,
        mime_type: &str,
        size: u32,
    ) -> Result<Encoded, ProcessingError> {
        self.resize(data, mime_type, ResizeOptions::thumbnail(size))
            .await
    }

    /// Probe, optionally compress and optionally thumbnail one file.
    ///
    /// Types without a raster encoder (`image/svg+xml`) are returned unchanged.
    /// Any other failure aborts the whole file; no partial payload is returned.
    pub async fn process(
        &self,
        file: &SelectedFile,
        options: &ProcessOptions,
    ) -> Result<ProcessedPayload, ProcessingError> {
        if OutputFormat::from_mime_type(&file.mime_type).is_none() {
            tracing::debug!(
                name = %file.name,
                mime_type = %file.mime_type,
                "No raster encoder for type, passing file through"
            );
            return Ok(ProcessedPayload {
                file: file.clone(),
                dimensions: None,
                thumbnail: None,
            });
        }

        let (processed, dimensions) = match options.compress {
            Some(resize) => {
                let encoded = self
                    .resize(file.data.clone(), &file.mime_type, resize)
                    .await?;
                (file.with_data(encoded.data), encoded.dimensions)
            }
            None => {
                let dimensions = self.probe(file.data.clone()).await?;
                (file.clone(), dimensions)
            }
        };

        let thumbnail = match options.thumbnail_size {
            Some(size) => Some(
                self.thumbnail(file.data.clone(), &file.mime_type, size)
                    .await?,
            ),
            None => None,
        };

        tracing::info!(
            name = %file.name,
            original_bytes = file.byte_size,
            processed_bytes = processed.byte_size,
            width = dimensions.width,
            height = dimensions.height,
            thumbnail = thumbnail.is_some(),
            "File processed"
        );

        Ok(ProcessedPayload {
            file: processed,
            dimensions: Some(dimensions),
            thumbnail,
        })
    }
}
