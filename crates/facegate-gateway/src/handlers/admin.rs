//! Admin-only views over gateway state

use crate::auth::Identity;
use crate::error::GatewayError;
use crate::state::AppState;
use axum::extract::State;
use axum::response::Json;
use axum::Extension;
use serde_json::{json, Value};

/// Current per-identity request counts, admin claim required
pub async fn user_activity(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, GatewayError> {
    identity.require_claim("admin")?;

    let request_counts = state.limiter.snapshot();
    Ok(Json(json!({
        "message": "Admin access granted",
        "request_counts": request_counts,
        "admin_identity": identity
            .email
            .clone()
            .unwrap_or_else(|| identity.subject.clone()),
    })))
}
