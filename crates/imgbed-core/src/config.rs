//! Configuration module
//!
//! Client configuration is read from `IMGBED_*` environment variables (a `.env`
//! file is honoured). Unset variables fall back to the documented defaults.

use std::env;
use std::path::PathBuf;

use crate::constants::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use crate::limits::UploadLimits;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for the HTTP transport, the validator limits and the download sink.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
    pub limits: UploadLimits,
    pub download_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            limits: UploadLimits::default(),
            download_dir: PathBuf::from("."),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| {
            lookup(&format!("IMGBED_{}", name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_url = var("API_URL")
            .unwrap_or(defaults.api_url)
            .trim_end_matches('/')
            .to_string();

        let config = Self {
            api_url,
            api_token: var("API_TOKEN"),
            timeout_secs: parse_number("IMGBED_TIMEOUT_SECS", var("TIMEOUT_SECS"))?
                .unwrap_or(defaults.timeout_secs),
            limits: UploadLimits {
                max_file_size: parse_number("IMGBED_MAX_FILE_SIZE", var("MAX_FILE_SIZE"))?
                    .unwrap_or(defaults.limits.max_file_size),
                max_batch_size: parse_number("IMGBED_MAX_BATCH_SIZE", var("MAX_BATCH_SIZE"))?
                    .unwrap_or(defaults.limits.max_batch_size),
                max_batch_count: parse_number("IMGBED_MAX_BATCH_COUNT", var("MAX_BATCH_COUNT"))?
                    .map(|n| n as usize)
                    .unwrap_or(defaults.limits.max_batch_count),
            },
            download_dir: var("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "IMGBED_API_URL must start with http:// or https://, got '{}'",
                self.api_url
            )));
        }
        if self.limits.max_file_size > self.limits.max_batch_size {
            tracing::warn!(
                max_file_size = self.limits.max_file_size,
                max_batch_size = self.limits.max_batch_size,
                "Per-file limit exceeds batch limit; batches are capped by the batch limit"
            );
        }
        Ok(())
    }
}

fn parse_number(name: &str, raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(value) => match value.parse::<u64>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(ConfigError::InvalidNumber {
                name: name.to_string(),
                value,
            }),
        },
    }
}
