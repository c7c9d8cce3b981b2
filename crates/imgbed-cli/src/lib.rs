use anyhow::Context;
use imgbed_core::{format_file_size, ImageRecord};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// `photo.jpg` + `thumb` -> `photo.thumb.jpg`, next to the input.
pub fn derived_output_path(input: &Path, tag: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{}.{}.{}", stem, tag, ext.to_string_lossy()),
        None => format!("{}.{}", stem, tag),
    };
    input.with_file_name(name)
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// One fixed-width table row per record.
pub fn format_record_row(record: &ImageRecord) -> String {
    format!(
        "{:<36}  {:<28}  {:>10}  {:>11}  {}",
        record.uuid,
        truncate_string(&record.original_name, 28),
        format_file_size(record.byte_size),
        format!("{}x{}", record.width, record.height),
        record.created_at.format("%Y-%m-%d %H:%M"),
    )
}

pub fn print_records_table(records: &[ImageRecord]) {
    println!(
        "{:<36}  {:<28}  {:>10}  {:>11}  CREATED",
        "UUID", "NAME", "SIZE", "DIMENSIONS"
    );
    for record in records {
        println!("{}", format_record_row(record));
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays parseable.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
