//! Authentication endpoints: register, login, refresh, logout.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::UserResponse;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::AuthService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let service = AuthService::new(state.pool.clone(), state.signer.clone());
    let result = service.register(&req.email, &req.password, &req.name).await?;

    tracing::info!(user_id = %result.user.id, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            user: result.user.into(),
            access_token: result.access_token,
            refresh_token: result.refresh_token,
            expires_in: result.expires_in,
        }),
    ))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let service = AuthService::new(state.pool.clone(), state.signer.clone());
    let result = service.login(&req.email, &req.password).await?;

    tracing::info!(user_id = %result.user.id, "user logged in");

    Ok(Json(SessionResponse {
        user: result.user.into(),
        access_token: result.access_token,
        refresh_token: result.refresh_token,
        expires_in: result.expires_in,
    }))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let service = AuthService::new(state.pool.clone(), state.signer.clone());
    let result = service.refresh(&req.refresh_token).await?;

    Ok(Json(RefreshResponse {
        access_token: result.access_token,
        expires_in: result.expires_in,
    }))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> Result<StatusCode, ApiError> {
    let service = AuthService::new(state.pool.clone(), state.signer.clone());
    service.logout(&req.refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}
