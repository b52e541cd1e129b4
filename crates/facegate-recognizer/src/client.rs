//! Recognizer service client

use crate::{
    types::{normalize_matches, FaceMatch},
    Result, UpstreamConfig, UpstreamError,
};
use bytes::Bytes;
use futures::Stream;
use reqwest::{header, multipart, Body, Client, Response};
use std::path::Path;
use tracing::{debug, instrument};

/// Client for the face recognition service
pub struct RecognizerClient {
    config: UpstreamConfig,
    http: Client,
}

impl RecognizerClient {
    /// Create a new client with the given configuration
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let agent = header::HeaderValue::from_str(&config.user_agent)
            .map_err(|e| UpstreamError::Transport(format!("invalid user agent: {}", e)))?;
        headers.insert(header::USER_AGENT, agent);

        // Deadlines differ per call, so the builder carries none.
        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self { config, http })
    }

    /// Create with default configuration
    pub fn default_local() -> Result<Self> {
        Self::new(UpstreamConfig::default())
    }

    /// Create with a base URL
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Self::new(UpstreamConfig::new(base_url))
    }

    /// Get the configuration
    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Search the dataset for faces similar to the given image.
    ///
    /// The image is streamed from disk as the `file` part of a multipart
    /// form, with the match threshold sent alongside as a text field.
    #[instrument(skip(self, image))]
    pub async fn search(
        &self,
        image: &Path,
        file_name: &str,
        content_type: &str,
        threshold: u32,
    ) -> Result<Vec<FaceMatch>> {
        let file = tokio::fs::File::open(image).await?;
        let length = file.metadata().await?.len();

        let part = multipart::Part::stream_with_length(Body::from(file), length)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("threshold", threshold.to_string());

        let url = format!("{}/search", self.config.base_url);
        debug!("Sending search request to {} ({} bytes)", url, length);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .timeout(self.config.search_timeout)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body: serde_json::Value = response.json().await?;
        Ok(normalize_matches(body))
    }

    /// Fetch a stored dataset image as a byte stream
    #[instrument(skip(self))]
    pub async fn download(&self, filename: &str) -> Result<ImageDownload> {
        let url = format!("{}/download/{}", self.config.base_url, filename);
        debug!("Sending download request to {}", url);
        let response = self
            .http
            .get(&url)
            .timeout(self.config.download_timeout)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(ImageDownload { response })
    }

    /// Probe the service health endpoint
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<serde_json::Value> {
        let url = format!("{}/health", self.config.base_url);
        debug!("Sending health probe to {}", url);
        let response = self
            .http
            .get(&url)
            .timeout(self.config.health_timeout)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Fetch the dataset debug report
    #[instrument(skip(self))]
    pub async fn dataset_info(&self) -> Result<serde_json::Value> {
        let url = format!("{}/debug/dataset", self.config.base_url);
        debug!("Sending dataset report request to {}", url);
        let response = self
            .http
            .get(&url)
            .timeout(self.config.dataset_timeout)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

/// A streamed image handed back by the recognizer
#[derive(Debug)]
pub struct ImageDownload {
    response: Response,
}

impl ImageDownload {
    /// Content type reported by the service, if any
    pub fn content_type(&self) -> Option<String> {
        self.response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    }

    /// Content length reported by the service, if any
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// Consume the download as a stream of byte chunks
    pub fn bytes_stream(self) -> impl Stream<Item = reqwest::Result<Bytes>> {
        self.response.bytes_stream()
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(UpstreamError::Http {
        status: status.as_u16(),
        body,
    })
}
