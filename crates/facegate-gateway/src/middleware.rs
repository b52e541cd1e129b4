//! Request middleware for identity, admission, and request ids

use crate::auth::{extract_bearer_token, AuthError, Identity};
use crate::error::GatewayError;
use crate::rate_limit::Admission;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

/// Resolve the bearer token into an [`Identity`] request extension.
///
/// Every route behind this middleware can rely on the extension being
/// present.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, GatewayError> {
    let token = extract_bearer_token(request.headers()).ok_or(AuthError::MissingToken)?;
    let identity = state.verifier.verify(token).await?;

    tracing::info!(
        "Authenticated {} ({})",
        identity.subject,
        identity.email.as_deref().unwrap_or("no email")
    );
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Count the request against the caller's rate window, rejecting when
/// the budget is spent. Runs inside [`authenticate`].
pub async fn require_admission(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, GatewayError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .cloned()
        .ok_or_else(|| GatewayError::Internal("admission checked before authentication".to_string()))?;

    if state.limiter.admit(&identity.subject) == Admission::Rejected {
        tracing::warn!("Rate limit hit for {}", identity.subject);
        return Err(GatewayError::RateLimited {
            max: state.limiter.max_requests(),
        });
    }
    Ok(next.run(request).await)
}

/// Tag every response with an `x-request-id` header
pub async fn request_id(mut request: Request<Body>, next: Next) -> Response {
    let id = Uuid::new_v4();
    request.extensions_mut().insert(RequestId(id));
    let mut response = next.run(request).await;
    // A hyphenated uuid is always a valid header value
    response
        .headers_mut()
        .insert("x-request-id", id.to_string().parse().unwrap());
    response
}

/// Request correlation id, available as an extension
#[derive(Clone, Copy, Debug)]
pub struct RequestId(pub Uuid);
