//! Raster codec backed by the `image` crate

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;

use super::resize::resize_to_fit;
use crate::compression::{jpeg_quality, OutputFormat};
use crate::error::ProcessingError;
use crate::traits::{Dimensions, Encoded, ImageCodec, ResizeOptions};

#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec;

impl RasterCodec {
    fn decode(data: &[u8]) -> Result<(DynamicImage, Option<ImageFormat>), ProcessingError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;
        let format = reader.format();
        if format.is_none() {
            return Err(ProcessingError::Decode("unrecognized image format".to_string()));
        }
        let img = reader
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;
        Ok((img, format))
    }

    fn encode(
        img: &DynamicImage,
        format: OutputFormat,
        quality: f32,
    ) -> Result<Vec<u8>, ProcessingError> {
        let mut buffer = Vec::new();

        match format {
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel.
                let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
                let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality));
                rgb.write_with_encoder(encoder)
                    .map_err(|e| ProcessingError::Encode(e.to_string()))?;
            }
            _ => {
                let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
                rgba.write_to(&mut Cursor::new(&mut buffer), format.to_image_format())
                    .map_err(|e| ProcessingError::Encode(e.to_string()))?;
            }
        }

        Ok(buffer)
    }
}

impl ImageCodec for RasterCodec {
    fn probe(&self, data: &[u8]) -> Result<Dimensions, ProcessingError> {
        let (img, _) = Self::decode(data)?;
        let (width, height) = img.dimensions();
        Ok(Dimensions { width, height })
    }

    fn reencode(
        &self,
        data: &[u8],
        mime_type: &str,
        options: &ResizeOptions,
    ) -> Result<Encoded, ProcessingError> {
        options.validate()?;

        let (img, detected) = Self::decode(data)?;
        let format = OutputFormat::from_mime_type(mime_type)
            .or_else(|| detected.and_then(OutputFormat::from_image_format))
            .ok_or_else(|| {
                ProcessingError::Encode(format!("no encoder available for {}", mime_type))
            })?;

        let resized = resize_to_fit(img, options.max_width, options.max_height);
        let (width, height) = resized.dimensions();
        let encoded = Self::encode(&resized, format, options.quality)?;

        if encoded.is_empty() {
            return Err(ProcessingError::Encode("encoder produced no output".to_string()));
        }

        tracing::debug!(
            format = ?format,
            width = width,
            height = height,
            input_bytes = data.len(),
            output_bytes = encoded.len(),
            "Image re-encoded"
        );

        Ok(Encoded {
            data: Bytes::from(encoded),
            dimensions: Dimensions { width, height },
        })
    }
}
