//! Upstream client configuration

use std::time::Duration;

/// Recognizer service configuration
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    /// Recognizer service base URL
    pub base_url: String,
    /// Deadline for face search calls (multipart upload + matching)
    pub search_timeout: Duration,
    /// Deadline for image downloads
    pub download_timeout: Duration,
    /// Deadline for health probes
    pub health_timeout: Duration,
    /// Deadline for dataset debug reports
    pub dataset_timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            search_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(10),
            health_timeout: Duration::from_secs(5),
            dataset_timeout: Duration::from_secs(10),
            user_agent: format!("facegate-recognizer/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl UpstreamConfig {
    /// Create a new config with the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        // Trailing slashes would double up when paths are appended.
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            ..Default::default()
        }
    }

    /// Set the search deadline
    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    /// Set the download deadline
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Set the health probe deadline
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// Set the dataset report deadline
    pub fn with_dataset_timeout(mut self, timeout: Duration) -> Self {
        self.dataset_timeout = timeout;
        self
    }

    /// Base URL for service requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
