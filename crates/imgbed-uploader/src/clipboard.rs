//! Best-effort system clipboard.
//!
//! Pipes the text into the first platform clipboard tool that accepts it.
//! When none is installed or all of them fail, `copy_text` returns `false`.

use async_trait::async_trait;
use imgbed_core::{ClipboardSink, ImageRecord, LinkFormat};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct SystemClipboard {
    candidates: Vec<(String, Vec<String>)>,
}

impl Default for SystemClipboard {
    fn default() -> Self {
        let candidates = [
            ("pbcopy", &[][..]),
            ("wl-copy", &[][..]),
            ("xclip", &["-selection", "clipboard"][..]),
            ("xsel", &["--clipboard", "--input"][..]),
            ("clip", &[][..]),
        ];
        Self::with_candidates(
            candidates
                .iter()
                .map(|(program, args)| (program.to_string(), args.iter().map(|a| a.to_string()).collect()))
                .collect(),
        )
    }
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit list of `(program, args)` tools, tried in order.
    pub fn with_candidates(candidates: Vec<(String, Vec<String>)>) -> Self {
        Self { candidates }
    }

    async fn try_program(program: &str, args: &[String], text: &str) -> std::io::Result<bool> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        Ok(child.wait().await?.success())
    }
}

#[async_trait]
impl ClipboardSink for SystemClipboard {
    async fn copy_text(&self, text: &str) -> bool {
        for (program, args) in &self.candidates {
            match Self::try_program(program, args, text).await {
                Ok(true) => {
                    tracing::debug!(program = %program, "Copied to clipboard");
                    return true;
                }
                Ok(false) => {
                    tracing::debug!(program = %program, "Clipboard tool exited with failure");
                }
                Err(e) => {
                    tracing::trace!(program = %program, error = %e, "Clipboard tool unavailable");
                }
            }
        }
        tracing::warn!("No clipboard tool available");
        false
    }
}

/// Copy a record's link in the given format. Returns the copied text on success.
pub async fn copy_link(
    sink: &dyn ClipboardSink,
    record: &ImageRecord,
    format: LinkFormat,
) -> Option<String> {
    let text = format.render(record);
    if sink.copy_text(&text).await {
        Some(text)
    } else {
        None
    }
}
