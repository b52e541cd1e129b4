//! Identity verification and the claim gate

use crate::error::GatewayError;
use async_trait::async_trait;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Authentication failures, one wire code each
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No usable bearer token on the request
    #[error("access token required")]
    MissingToken,

    /// Token failed signature or shape checks
    #[error("token rejected: {0}")]
    InvalidToken(String),

    /// Token was once valid but is past its expiry
    #[error("token expired")]
    ExpiredToken,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time
    pub exp: i64,
    /// Issued at
    pub iat: Option<i64>,
    /// Email address
    pub email: Option<String>,
    /// Whether the issuer verified the email
    #[serde(default)]
    pub email_verified: bool,
    /// Everything else the issuer attached (custom claims, aud, iss, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A verified caller identity, carried as a request extension
#[derive(Clone, Debug, Serialize)]
pub struct Identity {
    /// Stable subject identifier from the token
    pub subject: String,
    /// Email address, when the issuer provides one
    pub email: Option<String>,
    /// Whether the issuer verified the email
    pub email_verified: bool,
    /// Boolean custom claims granted by the issuer
    pub claims: BTreeMap<String, bool>,
}

impl Identity {
    /// Check whether the issuer granted a claim
    pub fn has_claim(&self, claim: &str) -> bool {
        self.claims.get(claim).copied().unwrap_or(false)
    }

    /// Require a claim, failing with 403 when it is absent or false
    pub fn require_claim(&self, claim: &'static str) -> Result<(), GatewayError> {
        if self.has_claim(claim) {
            Ok(())
        } else {
            Err(GatewayError::InsufficientRole(claim))
        }
    }
}

/// Convert verified claims into a caller identity.
///
/// Only boolean custom claims are carried over; registered claims and
/// non-bool extras are dropped here.
pub fn claims_to_identity(claims: Claims) -> Identity {
    let granted = claims
        .extra
        .iter()
        .filter_map(|(name, value)| value.as_bool().map(|b| (name.clone(), b)))
        .collect();

    Identity {
        subject: claims.sub,
        email: claims.email,
        email_verified: claims.email_verified,
        claims: granted,
    }
}

/// Extract a bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| {
            h.strip_prefix("Bearer ")
                .or_else(|| h.strip_prefix("bearer "))
        })
}

/// Verifies bearer tokens into caller identities
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a raw bearer token
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// HS256 verifier sharing a secret with the token issuer
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Create a verifier for the given shared secret
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // Issuer tokens carry an audience we do not pin, so audience
        // checks stay off.
        validation.validate_aud = false;
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!("Token validation failed: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;
        Ok(claims_to_identity(data.claims))
    }
}
