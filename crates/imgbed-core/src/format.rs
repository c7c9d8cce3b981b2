//! Human-readable sizes and file name helpers.

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with a 1024 base and at most two decimals.
///
/// Trailing zeros are dropped, so `10485760` renders as `10 MB` and `1536`
/// as `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// Lowercased extension without the dot, or an empty string.
pub fn file_extension(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Guess a MIME type from the file extension.
///
/// Unknown extensions map to `application/octet-stream`, which the validator
/// rejects as unsupported.
pub fn mime_type_for_filename(filename: &str) -> &'static str {
    match file_extension(filename).as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
