//! Health probes and upstream diagnostics

use crate::auth::Identity;
use crate::error::GatewayError;
use crate::state::AppState;
use axum::extract::State;
use axum::response::Json;
use axum::Extension;
use chrono::Utc;
use serde_json::{json, Value};

/// Liveness probe, open to everyone
pub async fn health() -> Json<Value> {
    Json(json!({
        "message": "Server is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Liveness probe behind authentication, echoing the caller identity
pub async fn protected_health(Extension(identity): Extension<Identity>) -> Json<Value> {
    Json(json!({
        "message": "Protected endpoint is working",
        "identity": identity,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Probe the recognizer service and report what it answered
pub async fn test_upstream(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, GatewayError> {
    let upstream_data = state.recognizer.health().await?;
    Ok(Json(json!({
        "status": "Recognizer service is reachable",
        "url": state.recognizer.config().base_url(),
        "upstream_data": upstream_data,
        "requested_by": identity.subject,
    })))
}

/// Pass the recognizer's dataset report through untouched
pub async fn upstream_dataset(
    State(state): State<AppState>,
) -> Result<Json<Value>, GatewayError> {
    let report = state.recognizer.dataset_info().await?;
    Ok(Json(report))
}
