//! Shared application state

use crate::auth::{JwtVerifier, TokenVerifier};
use crate::config::GatewayConfig;
use crate::rate_limit::RateLimiter;
use crate::upload::UploadStager;
use anyhow::{bail, Result};
use facegate_recognizer::RecognizerClient;
use std::sync::Arc;

/// Application state shared across requests
#[derive(Clone)]
pub struct AppState {
    /// Runtime configuration
    pub config: Arc<GatewayConfig>,
    /// Bearer token verifier
    pub verifier: Arc<dyn TokenVerifier>,
    /// Per-identity request limiter
    pub limiter: Arc<RateLimiter>,
    /// Transient upload staging
    pub stager: Arc<UploadStager>,
    /// Client for the recognizer service
    pub recognizer: Arc<RecognizerClient>,
}

impl AppState {
    /// Build the state, wiring every component off the configuration
    pub fn new(config: GatewayConfig) -> Result<Self> {
        if config.jwt_secret.is_empty() {
            bail!("JWT_SECRET must be set; refusing to start without one");
        }

        let verifier = Arc::new(JwtVerifier::new(&config.jwt_secret));
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit_max,
            config.rate_limit_window,
        ));
        let stager = Arc::new(UploadStager::new(
            config.staging_dir.clone(),
            config.max_upload_bytes,
        ));
        let recognizer = Arc::new(RecognizerClient::new(config.upstream_config())?);

        Ok(Self {
            config: Arc::new(config),
            verifier,
            limiter,
            stager,
            recognizer,
        })
    }
}
