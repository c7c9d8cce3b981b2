//! imgbed CLI: validate, process and upload images to an imgbed server.
//!
//! Configuration comes from IMGBED_* environment variables (a `.env` file is
//! honoured); `--api-url` and `--token` override them.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use imgbed_api_client::ApiClient;
use imgbed_cli::{derived_output_path, init_tracing, print_json, print_records_table};
use imgbed_core::constants::DEFAULT_THUMBNAIL_SIZE;
use imgbed_core::{
    format_file_size, ClientConfig, ClipboardSink, DownloadSink, LinkFormat, ProgressCallback, SelectedFile,
    Transport, UploadOutcome,
};
use imgbed_processing::{MediaProcessor, ProcessOptions, ResizeOptions, Validator};
use imgbed_uploader::{copy_link, SystemClipboard, UploadCoordinator};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "imgbed", about = "imgbed image hosting CLI")]
struct Cli {
    /// Server base URL (overrides IMGBED_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token (overrides IMGBED_API_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone, Copy)]
struct ResizeArgs {
    /// Encoder quality in (0, 1]
    #[arg(long, default_value = "0.8")]
    quality: f32,
    /// Maximum width in pixels
    #[arg(long, default_value = "1920")]
    max_width: u32,
    /// Maximum height in pixels
    #[arg(long, default_value = "1080")]
    max_height: u32,
}

impl From<ResizeArgs> for ResizeOptions {
    fn from(args: ResizeArgs) -> Self {
        ResizeOptions {
            quality: args.quality,
            max_width: args.max_width,
            max_height: args.max_height,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check files against the upload limits without sending anything
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the pixel dimensions of an image
    Probe { file: PathBuf },
    /// Resize/recompress an image locally
    Compress {
        file: PathBuf,
        #[command(flatten)]
        resize: ResizeArgs,
        /// Output path (default: <name>.compressed.<ext>)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Produce a square-bounded thumbnail locally
    Thumbnail {
        file: PathBuf,
        /// Bounding box size in pixels
        #[arg(long, default_value_t = DEFAULT_THUMBNAIL_SIZE)]
        size: u32,
        /// Output path (default: <name>.thumb.<ext>)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Upload one file, or several files as one batch
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Resize/recompress before uploading
        #[arg(long)]
        compress: bool,
        #[command(flatten)]
        resize: ResizeArgs,
        /// Link format to print: direct, markdown, html, bbcode
        #[arg(long, default_value = "direct")]
        format: LinkFormat,
        /// Copy the first link to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Show a stored image
    Info { uuid: Uuid },
    /// Show server statistics
    Stats,
    /// List stored images
    List {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "20")]
        page_size: u32,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete a stored image
    Delete { uuid: Uuid },
    /// Download a stored image
    Download {
        uuid: Uuid,
        /// Target directory (overrides IMGBED_DOWNLOAD_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// File name (default: the original name)
        #[arg(long)]
        filename: Option<String>,
    },
    /// Copy a stored image's link to the clipboard
    CopyLink {
        uuid: Uuid,
        #[arg(long, default_value = "direct")]
        format: LinkFormat,
    },
    /// Check server health
    Health,
}

fn load_file(path: &Path) -> anyhow::Result<SelectedFile> {
    SelectedFile::from_path(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

fn load_files(paths: &[PathBuf]) -> anyhow::Result<Vec<SelectedFile>> {
    paths.iter().map(|p| load_file(p)).collect()
}

fn write_output(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))
}

/// Renders `Uploading... N%` on stderr.
fn terminal_progress() -> ProgressCallback {
    Arc::new(|percent| {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\rUploading... {:>3}%", percent);
        let _ = stderr.flush();
    })
}

fn connect(config: &ClientConfig) -> anyhow::Result<(ApiClient, UploadCoordinator)> {
    let client = ApiClient::from_config(config).context("Failed to create API client")?;
    let coordinator = UploadCoordinator::new(Arc::new(client.clone())).with_limits(config.limits);
    Ok((client, coordinator))
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("Invalid IMGBED_* configuration")?;
    if let Some(url) = &cli.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    if let Some(token) = &cli.token {
        config.api_token = Some(token.clone());
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Validate { files } => {
            let files = load_files(&files)?;
            let validator = Validator::new(config.limits);
            let result = if files.len() == 1 {
                validator.check_file(&files[0])
            } else {
                validator.check_batch(&files)
            };
            print_json(&result)?;
            if !result.valid {
                bail!("validation failed");
            }
        }
        Commands::Probe { file } => {
            let selected = load_file(&file)?;
            let dimensions = MediaProcessor::default()
                .probe(selected.data.clone())
                .await
                .with_context(|| format!("Failed to probe {}", file.display()))?;
            print_json(&serde_json::json!({
                "name": selected.name,
                "mime_type": selected.mime_type,
                "size": format_file_size(selected.byte_size),
                "width": dimensions.width,
                "height": dimensions.height,
            }))?;
        }
        Commands::Compress {
            file,
            resize,
            output,
        } => {
            let selected = load_file(&file)?;
            let encoded = MediaProcessor::default()
                .resize(selected.data.clone(), &selected.mime_type, resize.into())
                .await
                .with_context(|| format!("Failed to compress {}", file.display()))?;
            let output = output.unwrap_or_else(|| derived_output_path(&file, "compressed"));
            write_output(&output, &encoded.data)?;
            print_json(&serde_json::json!({
                "output": output,
                "original_size": format_file_size(selected.byte_size),
                "compressed_size": format_file_size(encoded.data.len() as u64),
                "width": encoded.dimensions.width,
                "height": encoded.dimensions.height,
            }))?;
        }
        Commands::Thumbnail { file, size, output } => {
            let selected = load_file(&file)?;
            let encoded = MediaProcessor::default()
                .thumbnail(selected.data.clone(), &selected.mime_type, size)
                .await
                .with_context(|| format!("Failed to create thumbnail for {}", file.display()))?;
            let output = output.unwrap_or_else(|| derived_output_path(&file, "thumb"));
            write_output(&output, &encoded.data)?;
            print_json(&serde_json::json!({
                "output": output,
                "width": encoded.dimensions.width,
                "height": encoded.dimensions.height,
            }))?;
        }
        Commands::Upload {
            files,
            compress,
            resize,
            format,
            copy,
        } => {
            let (_, coordinator) = connect(&config)?;
            let files = load_files(&files)?;
            let processing = compress.then(|| ProcessOptions::compressed(resize.into()));

            let links: Vec<String> = if files.len() == 1 {
                let outcome = coordinator
                    .validate_and_upload_single(
                        &files[0],
                        processing.as_ref(),
                        Some(terminal_progress()),
                    )
                    .await;
                eprintln!();
                match outcome? {
                    UploadOutcome::Success { record } => {
                        print_json(&record)?;
                        vec![format.render(&record)]
                    }
                    UploadOutcome::Failure { filename, reason } => {
                        bail!("Upload of {} failed: {}", filename, reason)
                    }
                }
            } else {
                let outcome = coordinator
                    .validate_and_upload_batch(&files, processing.as_ref(), Some(terminal_progress()))
                    .await;
                eprintln!();
                let outcome = outcome?;
                print_json(&outcome)?;
                for failure in &outcome.failures {
                    tracing::warn!(file = %failure.filename, reason = %failure.reason, "File not uploaded");
                }
                outcome.successes.iter().map(|r| format.render(r)).collect()
            };

            for link in &links {
                println!("{}", link);
            }

            if copy {
                if let Some(first) = links.first() {
                    if SystemClipboard::new().copy_text(first).await {
                        eprintln!("Link copied to clipboard");
                    } else {
                        eprintln!("Clipboard unavailable");
                    }
                }
            }
        }
        Commands::Info { uuid } => {
            let (_, coordinator) = connect(&config)?;
            let record = coordinator
                .fetch_record(&uuid.to_string())
                .await
                .with_context(|| format!("Image {} not found", uuid))?;
            print_json(&record)?;
        }
        Commands::Stats => {
            let (_, coordinator) = connect(&config)?;
            let stats = coordinator
                .refresh_stats()
                .await
                .context("Failed to fetch statistics")?;
            print_json(&serde_json::json!({
                "total_images": stats.total_images,
                "total_size": format_file_size(stats.total_size),
                "today_images": stats.today_images,
            }))?;
        }
        Commands::List {
            page,
            page_size,
            json,
        } => {
            let (_, coordinator) = connect(&config)?;
            let listing = coordinator.list_remote(page, page_size).await?;
            if json {
                print_json(&listing)?;
            } else {
                print_records_table(&listing.items);
                println!(
                    "\nPage {} of {} ({} images)",
                    listing.page,
                    listing.total_pages(),
                    listing.total
                );
            }
        }
        Commands::Delete { uuid } => {
            let (_, coordinator) = connect(&config)?;
            coordinator.delete_remote(&uuid.to_string()).await?;
            print_json(&serde_json::json!({
                "success": true,
                "message": format!("Image {} deleted", uuid),
            }))?;
        }
        Commands::Download { uuid, dir, filename } => {
            let (client, coordinator) = connect(&config)?;
            let record = coordinator
                .fetch_record(&uuid.to_string())
                .await
                .with_context(|| format!("Image {} not found", uuid))?;
            let downloader = client.downloader(dir.unwrap_or_else(|| config.download_dir.clone()));
            let filename = filename.unwrap_or_else(|| record.original_name.clone());
            let path = downloader
                .trigger_download(&record.public_url, &filename)
                .await?;
            print_json(&serde_json::json!({ "path": path }))?;
        }
        Commands::CopyLink { uuid, format } => {
            let (_, coordinator) = connect(&config)?;
            let record = coordinator
                .fetch_record(&uuid.to_string())
                .await
                .with_context(|| format!("Image {} not found", uuid))?;
            match copy_link(&SystemClipboard::new(), &record, format).await {
                Some(text) => println!("{}", text),
                None => {
                    println!("{}", format.render(&record));
                    eprintln!("Clipboard unavailable, link printed instead");
                }
            }
        }
        Commands::Health => {
            let client = ApiClient::from_config(&config).context("Failed to create API client")?;
            let health = client.health().await?;
            print_json(&health)?;
            if !health.is_healthy() {
                bail!("server reported status {}", health.status);
            }
        }
    }

    Ok(())
}
