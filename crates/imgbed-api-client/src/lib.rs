//! HTTP transport for the imgbed API.
//!
//! Provides a client with optional Bearer auth, generic JSON/multipart
//! helpers that unwrap the `{success, data, error}` envelope, and the
//! [`Transport`](imgbed_core::Transport) implementation used by the uploader.

pub mod api;
pub mod download;
pub mod envelope;
pub mod progress;

use imgbed_core::constants::API_PREFIX;
use imgbed_core::{ClientConfig, TransportError};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use download::HttpDownloader;
pub use envelope::ApiEnvelope;
pub use progress::UploadProgress;

/// Versioned API path, e.g. `/api/v1/images`.
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

/// HTTP client for the imgbed API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to create HTTP client: {}", e)))?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::new(
            config.api_url.clone(),
            config.api_token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Raw client, shared with the download sink.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Download sink writing into `dir`, sharing this client's connection pool.
    pub fn downloader(&self, dir: impl Into<std::path::PathBuf>) -> HttpDownloader {
        HttpDownloader::new(self.client.clone(), dir)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send with auth and map non-2xx responses to errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(request_error)?;
        check_status(response).await
    }

    /// GET and unwrap the `data` field of the envelope.
    pub async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TransportError> {
        let mut request = self.client.get(self.build_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = self.send(request).await?;
        parse_json::<ApiEnvelope<T>>(response).await?.into_data()
    }

    /// GET a bare JSON body (no envelope).
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let response = self.send(self.client.get(self.build_url(path))).await?;
        parse_json(response).await
    }

    /// POST a multipart form and unwrap the envelope.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, TransportError> {
        let request = self.client.post(self.build_url(path)).multipart(form);
        let response = self.send(request).await?;
        parse_json::<ApiEnvelope<T>>(response).await?.into_data()
    }

    /// DELETE; only the envelope's `success` flag is checked.
    pub async fn delete(&self, path: &str) -> Result<(), TransportError> {
        let response = self.send(self.client.delete(self.build_url(path))).await?;
        parse_json::<ApiEnvelope<serde_json::Value>>(response)
            .await?
            .into_unit()
    }
}

pub(crate) fn request_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Request("request timed out".to_string())
    } else if err.is_connect() {
        TransportError::Request(format!("could not connect to server: {}", err))
    } else {
        TransportError::Request(err.to_string())
    }
}

pub(crate) async fn check_status(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = envelope::error_message(&text)
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));

    tracing::debug!(status = status.as_u16(), error = %message, "API request failed");

    if status == StatusCode::NOT_FOUND {
        return Err(TransportError::NotFound(message));
    }
    Err(TransportError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let bytes = response.bytes().await.map_err(request_error)?;
    serde_json::from_slice(&bytes).map_err(|e| TransportError::InvalidResponse(e.to_string()))
}
