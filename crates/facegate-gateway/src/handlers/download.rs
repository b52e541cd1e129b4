//! Streaming relay of recognizer dataset images

use crate::error::GatewayError;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;

/// Relay one dataset image from the recognizer, streaming the bytes
/// straight through.
pub async fn download_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, GatewayError> {
    // Traversal attempts never reach the upstream
    if !is_safe_filename(&filename) {
        return Err(GatewayError::ImageNotFound(filename));
    }

    let download = match state.recognizer.download(&filename).await {
        Ok(download) => download,
        Err(e) if e.is_not_found() => return Err(GatewayError::ImageNotFound(filename)),
        Err(e) => return Err(e.into()),
    };

    let content_type = download
        .content_type()
        .and_then(|ct| HeaderValue::from_str(&ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("image/jpeg"));
    let content_length = download.content_length();

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .header(header::CACHE_CONTROL, "public, max-age=3600");
    if let Some(length) = content_length {
        builder = builder.header(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    Ok(builder
        .body(Body::from_stream(download.bytes_stream()))
        .unwrap())
}

fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && !name.contains(['/', '\\'])
        && !name.chars().any(|c| c.is_control())
}
