use image::ImageFormat;

/// Output encoding, chosen from the source MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Bmp,
    Tiff,
}

impl OutputFormat {
    /// `None` for types without a raster encoder (e.g. `image/svg+xml`).
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        match mime_type.to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(OutputFormat::Jpeg),
            "image/png" => Some(OutputFormat::Png),
            "image/gif" => Some(OutputFormat::Gif),
            "image/webp" => Some(OutputFormat::WebP),
            "image/bmp" => Some(OutputFormat::Bmp),
            "image/tiff" => Some(OutputFormat::Tiff),
            _ => None,
        }
    }

    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(OutputFormat::Jpeg),
            ImageFormat::Png => Some(OutputFormat::Png),
            ImageFormat::Gif => Some(OutputFormat::Gif),
            ImageFormat::WebP => Some(OutputFormat::WebP),
            ImageFormat::Bmp => Some(OutputFormat::Bmp),
            ImageFormat::Tiff => Some(OutputFormat::Tiff),
            _ => None,
        }
    }

    pub fn to_mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Gif => "image/gif",
            OutputFormat::WebP => "image/webp",
            OutputFormat::Bmp => "image/bmp",
            OutputFormat::Tiff => "image/tiff",
        }
    }

    pub fn to_image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Gif => ImageFormat::Gif,
            OutputFormat::WebP => ImageFormat::WebP,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Tiff => ImageFormat::Tiff,
        }
    }
}

/// Map a `(0, 1]` quality to a JPEG quality (1-100)
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}
