//! Upstream client error types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Errors from talking to the recognizer service
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The service refused or dropped the connection
    #[error("recognizer service unreachable: {0}")]
    Unreachable(String),

    /// The service did not answer within its deadline
    #[error("recognizer service timed out: {0}")]
    Timeout(String),

    /// The service answered with a non-success status
    #[error("recognizer service returned HTTP {status}")]
    Http { status: u16, body: String },

    /// Any other transport failure (protocol, body decode, TLS, ...)
    #[error("transport error: {0}")]
    Transport(String),

    /// Local IO while preparing an upload
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UpstreamError {
    /// Check if the service could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// Check if the service ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if the service reported a missing resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        // A connect timeout sets both flags, so connect wins.
        if err.is_connect() {
            Self::Unreachable(err.to_string())
        } else if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
