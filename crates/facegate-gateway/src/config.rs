//! Gateway runtime configuration

use facegate_recognizer::UpstreamConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the gateway needs to run
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Base URL of the recognizer service
    pub upstream_url: String,
    /// Shared secret for verifying bearer tokens
    pub jwt_secret: String,
    /// Directory for transient upload staging
    pub staging_dir: PathBuf,
    /// Upload size ceiling in bytes
    pub max_upload_bytes: u64,
    /// Requests allowed per rate window
    pub rate_limit_max: u32,
    /// Rate window length
    pub rate_limit_window: Duration,
    /// Deadline for forwarded searches
    pub search_timeout: Duration,
    /// Deadline for image downloads
    pub download_timeout: Duration,
    /// Deadline for upstream health probes
    pub health_timeout: Duration,
    /// Deadline for dataset inspection calls
    pub dataset_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            upstream_url: "http://localhost:5000".to_string(),
            jwt_secret: String::new(),
            staging_dir: PathBuf::from("uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
            rate_limit_max: 10,
            rate_limit_window: Duration::from_secs(60),
            search_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(10),
            health_timeout: Duration::from_secs(5),
            dataset_timeout: Duration::from_secs(10),
        }
    }
}

impl GatewayConfig {
    /// Socket address string to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Transport-level body cap.
    ///
    /// Sits above the upload ceiling so the stager's own size check
    /// answers first with a clean 400 instead of a bare 413.
    pub fn body_limit(&self) -> usize {
        self.max_upload_bytes as usize + 1024 * 1024
    }

    /// Client configuration for the recognizer service
    pub fn upstream_config(&self) -> UpstreamConfig {
        UpstreamConfig::new(&self.upstream_url)
            .with_search_timeout(self.search_timeout)
            .with_download_timeout(self.download_timeout)
            .with_health_timeout(self.health_timeout)
            .with_dataset_timeout(self.dataset_timeout)
    }
}
