//! Download sink writing remote files into a local directory.

use async_trait::async_trait;
use imgbed_core::{DownloadSink, TransportError};
use reqwest::Client;
use std::path::{Path, PathBuf};

use crate::{check_status, request_error};

#[derive(Clone, Debug)]
pub struct HttpDownloader {
    client: Client,
    dir: PathBuf,
}

impl HttpDownloader {
    pub fn new(client: Client, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Reject names that would escape the target directory.
pub fn validate_filename(filename: &str) -> Result<(), TransportError> {
    let trimmed = filename.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed.contains("..")
        || trimmed.contains('/')
        || trimmed.contains('\\')
    {
        return Err(TransportError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

#[async_trait]
impl DownloadSink for HttpDownloader {
    async fn trigger_download(&self, url: &str, filename: &str) -> Result<PathBuf, TransportError> {
        validate_filename(filename)?;

        let response = self.client.get(url).send().await.map_err(request_error)?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await.map_err(request_error)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!(url = %url, path = %path.display(), bytes = bytes.len(), "File downloaded");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("photo.jpg").is_ok());
        assert!(validate_filename("my photo (1).png").is_ok());
        for bad in ["", "  ", ".", "..", "../etc/passwd", "a/b.png", "a\\b.png", "x..y"] {
            assert!(
                matches!(validate_filename(bad), Err(TransportError::InvalidFilename(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }
}
