//! Blob upload endpoints.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub reference: String,
}

/// POST /api/v1/uploads
///
/// Stores the raw request body and returns the reference a message can
/// link. The blob exists before any message points at it.
pub async fn upload_blob(
    State(state): State<AppState>,
    auth: UserAuth,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let reference = state.uploads.store(&body).await?;

    tracing::debug!(user_id = %auth.user_id, %reference, size = body.len(), "blob stored");

    Ok((StatusCode::CREATED, Json(UploadResponse { reference })))
}

/// GET /api/v1/uploads/:reference
pub async fn download_blob(
    State(state): State<AppState>,
    _auth: UserAuth,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let data = state
        .uploads
        .read(&reference)
        .await?
        .ok_or_else(|| ApiError::NotFound("Upload not found".into()))?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        data,
    ))
}
