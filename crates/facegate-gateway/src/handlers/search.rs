//! Face search: stage the upload, forward it, clean up

use crate::auth::Identity;
use crate::error::GatewayError;
use crate::state::AppState;
use crate::upload::UploadError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::Json;
use axum::Extension;
use facegate_recognizer::FaceMatch;

/// Similarity threshold used when the client sends none
const DEFAULT_THRESHOLD: u32 = 50;

/// Stage the uploaded image, forward it to the recognizer, and relay
/// the match list. The staged copy is removed whatever the outcome.
pub async fn search_face(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<FaceMatch>>, GatewayError> {
    // A body that is not multipart at all is the same as sending no file
    let mut multipart = multipart.map_err(|_| UploadError::NoFile)?;

    let mut staged = None;
    let mut threshold = DEFAULT_THRESHOLD;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::Upload(UploadError::Stream(e.to_string())))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let upload = state
                    .stager
                    .stage(
                        &identity.subject,
                        file_name.as_deref(),
                        content_type.as_deref(),
                        field,
                    )
                    .await?;
                staged = Some(upload);
            }
            "threshold" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| GatewayError::Upload(UploadError::Stream(e.to_string())))?;
                threshold = raw.trim().parse().unwrap_or(DEFAULT_THRESHOLD);
            }
            _ => {}
        }
    }

    let staged = staged.ok_or(UploadError::NoFile)?;
    tracing::info!(
        "Face search by {}: {} ({} bytes, threshold {})",
        identity.subject,
        staged.file_name(),
        staged.size(),
        threshold
    );

    let result = state
        .recognizer
        .search(
            staged.path(),
            staged.file_name(),
            staged.content_type(),
            threshold,
        )
        .await;

    if let Err(e) = staged.remove().await {
        tracing::warn!("Failed to remove staged upload: {}", e);
    }

    let matches = result?;
    tracing::info!("Search for {} returned {} matches", identity.subject, matches.len());
    Ok(Json(matches))
}
