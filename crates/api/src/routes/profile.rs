//! Profile endpoints for the authenticated user.

use axum::{extract::State, Json};
use domain::models::{UpdateProfileRequest, UserResponse};
use persistence::repositories::UserRepository;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// GET /api/v1/me
pub async fn get_me(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<UserResponse>, ApiError> {
    let user = super::current_user(&state, &auth).await?;
    Ok(Json(user.into()))
}

/// PATCH /api/v1/me
pub async fn update_me(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    req.validate()?;

    let updated = UserRepository::new(state.pool.clone())
        .update_name(auth.user_id, req.name.trim())
        .await?;

    tracing::debug!(user_id = %auth.user_id, "profile updated");

    Ok(Json(updated.into()))
}
