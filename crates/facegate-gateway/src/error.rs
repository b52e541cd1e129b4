//! Gateway error taxonomy and wire mapping

use crate::auth::AuthError;
use crate::upload::UploadError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use facegate_recognizer::UpstreamError;
use serde_json::Value;
use thiserror::Error;

/// Stable wire codes, one per rejection kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    RateLimitExceeded,
    NoFile,
    UnsupportedType,
    PayloadTooLarge,
    UpstreamUnreachable,
    UpstreamTimeout,
    UpstreamError,
    InsufficientRole,
    ImageNotFound,
    InternalError,
}

impl ErrorCode {
    /// The code string clients match on
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::InvalidToken => "invalid_token",
            Self::ExpiredToken => "expired_token",
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::NoFile => "no_file",
            Self::UnsupportedType => "unsupported_type",
            Self::PayloadTooLarge => "payload_too_large",
            Self::UpstreamUnreachable => "upstream_unreachable",
            Self::UpstreamTimeout => "upstream_timeout",
            Self::UpstreamError => "upstream_error",
            Self::InsufficientRole => "insufficient_role",
            Self::ImageNotFound => "image_not_found",
            Self::InternalError => "internal_error",
        }
    }

    /// Default HTTP status for this code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken | Self::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::NoFile | Self::UnsupportedType | Self::PayloadTooLarge => {
                StatusCode::BAD_REQUEST
            }
            Self::UpstreamUnreachable => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::UpstreamError => StatusCode::BAD_GATEWAY,
            Self::InsufficientRole => StatusCode::FORBIDDEN,
            Self::ImageNotFound => StatusCode::NOT_FOUND,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Anything a request can fail with
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("rate limit exceeded, {max} per window")]
    RateLimited { max: u32 },

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("missing claim: {0}")]
    InsufficientRole(&'static str),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Wire code for this failure
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Auth(AuthError::MissingToken) => ErrorCode::MissingToken,
            Self::Auth(AuthError::InvalidToken(_)) => ErrorCode::InvalidToken,
            Self::Auth(AuthError::ExpiredToken) => ErrorCode::ExpiredToken,
            Self::RateLimited { .. } => ErrorCode::RateLimitExceeded,
            Self::Upload(UploadError::NoFile) => ErrorCode::NoFile,
            Self::Upload(UploadError::UnsupportedType(_)) => ErrorCode::UnsupportedType,
            Self::Upload(UploadError::TooLarge { .. }) => ErrorCode::PayloadTooLarge,
            Self::Upload(UploadError::Stream(_)) | Self::Upload(UploadError::Io(_)) => {
                ErrorCode::InternalError
            }
            Self::Upstream(UpstreamError::Unreachable(_)) => ErrorCode::UpstreamUnreachable,
            Self::Upstream(UpstreamError::Timeout(_)) => ErrorCode::UpstreamTimeout,
            Self::Upstream(UpstreamError::Http { .. }) => ErrorCode::UpstreamError,
            Self::Upstream(UpstreamError::Transport(_)) => ErrorCode::UpstreamError,
            Self::Upstream(UpstreamError::Io(_)) => ErrorCode::InternalError,
            Self::InsufficientRole(_) => ErrorCode::InsufficientRole,
            Self::ImageNotFound(_) => ErrorCode::ImageNotFound,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// HTTP status, reflecting the upstream status where the taxonomy says so
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Upstream(UpstreamError::Http { status, .. }) if *status >= 400 => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            // A sub-400 status slipping through check_status still counts
            // as an upstream fault
            Self::Upstream(UpstreamError::Http { .. }) => StatusCode::BAD_GATEWAY,
            Self::Upstream(UpstreamError::Transport(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            other => other.error_code().status_code(),
        }
    }

    /// Human-readable error line for the response body
    pub fn message(&self) -> String {
        match self {
            Self::Upload(UploadError::TooLarge { limit }) => format!(
                "File too large. Maximum size is {}MB.",
                limit / (1024 * 1024)
            ),
            other => match other.error_code() {
                ErrorCode::MissingToken => "Access token required",
                ErrorCode::InvalidToken => "Invalid token",
                ErrorCode::ExpiredToken => "Token expired",
                ErrorCode::RateLimitExceeded => "Too many requests",
                ErrorCode::NoFile => "No image file provided",
                ErrorCode::UnsupportedType => "Only image files are allowed",
                ErrorCode::PayloadTooLarge => "File too large.",
                ErrorCode::UpstreamUnreachable => "Face recognition service unavailable",
                ErrorCode::UpstreamTimeout => "Face recognition service timed out",
                ErrorCode::UpstreamError => "Face recognition service error",
                ErrorCode::InsufficientRole => "Insufficient permissions",
                ErrorCode::ImageNotFound => "Image not found",
                ErrorCode::InternalError => "Internal server error",
            }
            .to_string(),
        }
    }

    /// Extra context safe to hand to clients
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Auth(AuthError::ExpiredToken) => {
                Some("Please refresh your authentication token".to_string())
            }
            Self::Auth(AuthError::InvalidToken(_)) => Some("Authentication failed".to_string()),
            Self::RateLimited { max } => {
                Some(format!("Maximum {max} requests per minute allowed"))
            }
            Self::Upload(UploadError::UnsupportedType(ct)) => Some(ct.clone()),
            Self::Upstream(UpstreamError::Unreachable(_)) => {
                Some("Please ensure the recognizer service is running".to_string())
            }
            Self::Upstream(UpstreamError::Http { body, .. }) if !body.trim().is_empty() => {
                Some(body.clone())
            }
            Self::InsufficientRole(claim) => Some(format!("{} access required", title_case(claim))),
            Self::Internal(_)
            | Self::Upload(UploadError::Stream(_))
            | Self::Upload(UploadError::Io(_))
            | Self::Upstream(UpstreamError::Io(_)) => Some("Something went wrong".to_string()),
            _ => None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Server-side faults carry detail worth keeping; the body stays
        // generic for those.
        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", code.as_str(), self);
        } else {
            tracing::debug!("Request rejected ({}): {}", code.as_str(), self);
        }

        let mut body = serde_json::json!({
            "error": self.message(),
            "code": code.as_str(),
        });
        if let Some(details) = self.details() {
            body["details"] = Value::String(details);
        }

        (status, Json(body)).into_response()
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
