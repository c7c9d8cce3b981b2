//! Upload limits, supported types and processing defaults.

/// Largest single file accepted for upload (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Largest combined size of one batch (50 MiB).
pub const MAX_BATCH_SIZE: u64 = 50 * 1024 * 1024;

/// Most files accepted in one batch.
pub const MAX_BATCH_COUNT: usize = 10;

/// MIME types accepted by the validator, in the order they are reported.
pub const SUPPORTED_IMAGE_TYPES: [&str; 7] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "image/bmp",
    "image/tiff",
];

/// Versioned API prefix appended to the configured base URL.
pub const API_PREFIX: &str = "/api/v1";

pub const DEFAULT_QUALITY: f32 = 0.8;
pub const DEFAULT_MAX_WIDTH: u32 = 1920;
pub const DEFAULT_MAX_HEIGHT: u32 = 1080;

pub const THUMBNAIL_QUALITY: f32 = 0.7;
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 200;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Message used when a single upload fails without a usable transport message.
pub const UPLOAD_FAILED_FALLBACK: &str = "upload failed";

/// Message used when a batch request fails without a usable transport message.
pub const BATCH_UPLOAD_FAILED_FALLBACK: &str = "batch upload failed";

/// Reason attached to batch entries the server did not report on.
pub const MISSING_BATCH_RESULT: &str = "no result returned for file";

pub fn is_supported_image_type(mime_type: &str) -> bool {
    SUPPORTED_IMAGE_TYPES.contains(&mime_type)
}
