//! Authentication service: registration, login, token refresh, sign-out.

use chrono::{Duration, Utc};
use domain::models::User;
use persistence::repositories::{SessionRepository, UserRepository};
use shared::jwt::{JwtError, TokenKind, TokenSigner};
use shared::password::{hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;

use crate::error::ApiError;

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("An account with this email already exists")]
    EmailAlreadyExists,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("{0}")]
    WeakPassword(String),

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("Session not found or already signed out")]
    SessionNotFound,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => ApiError::Conflict(err.to_string()),
            AuthError::InvalidEmail | AuthError::WeakPassword(_) => {
                ApiError::Validation(err.to_string())
            }
            AuthError::InvalidCredentials
            | AuthError::InvalidRefreshToken
            | AuthError::SessionNotFound => ApiError::Unauthorized(err.to_string()),
            AuthError::TokenError(e) => ApiError::Internal(e.to_string()),
            AuthError::PasswordError(e) => ApiError::Internal(e.to_string()),
            AuthError::DatabaseError(e) => e.into(),
        }
    }
}

/// Result of a successful registration or login.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Result of a successful token refresh.
#[derive(Debug, Clone)]
pub struct RefreshResult {
    pub access_token: String,
    pub expires_in: i64,
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    sessions: SessionRepository,
    signer: Arc<TokenSigner>,
}

impl AuthService {
    pub fn new(pool: PgPool, signer: Arc<TokenSigner>) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool),
            signer,
        }
    }

    /// Register a new account and open a session.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthResult, AuthError> {
        validate_email(email)?;
        validate_password_strength(password)?;

        let email = email.trim().to_lowercase();
        if self.users.find_entity_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let created = self.users.create(&email, name, &password_hash).await;

        // A concurrent registration can slip between the check and the
        // insert; the unique index decides.
        let user = match created {
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                return Err(AuthError::EmailAlreadyExists);
            }
            other => other?,
        };

        self.open_session(user).await
    }

    /// Authenticate with email and password and open a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let entity = self
            .users
            .find_entity_by_email(email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &entity.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.open_session(entity.into()).await
    }

    /// Rotate the access token from a live refresh session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResult, AuthError> {
        let claims = self
            .signer
            .validate(refresh_token, TokenKind::Refresh)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let session = self
            .sessions
            .find_by_jti(&claims.jti)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if !session.is_active(Utc::now()) {
            return Err(AuthError::InvalidRefreshToken);
        }

        let user_id = claims.user_id().map_err(|_| AuthError::InvalidRefreshToken)?;
        let access = self.signer.issue_access_token(user_id)?;

        Ok(RefreshResult {
            access_token: access.token,
            expires_in: access.expires_in_secs,
        })
    }

    /// Revoke the refresh session (sign out). Idempotent from the client's
    /// perspective: a second sign-out with the same token fails cleanly.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let claims = self
            .signer
            .validate(refresh_token, TokenKind::Refresh)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        if !self.sessions.revoke_by_jti(&claims.jti).await? {
            return Err(AuthError::SessionNotFound);
        }

        Ok(())
    }

    async fn open_session(&self, user: User) -> Result<AuthResult, AuthError> {
        let access = self.signer.issue_access_token(user.id)?;
        let refresh = self.signer.issue_refresh_token(user.id)?;

        let expires_at = Utc::now() + Duration::seconds(refresh.expires_in_secs);
        self.sessions
            .create(user.id, &refresh.jti, expires_at)
            .await?;

        Ok(AuthResult {
            user,
            access_token: access.token,
            refresh_token: refresh.token,
            expires_in: access.expires_in_secs,
        })
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let email = email.trim();
    let (local, domain) = email.split_once('@').ok_or(AuthError::InvalidEmail)?;
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || email.contains(' ') {
        return Err(AuthError::InvalidEmail);
    }
    Ok(())
}

fn validate_password_strength(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic())
        || !password.chars().any(|c| c.is_ascii_digit())
    {
        return Err(AuthError::WeakPassword(
            "Password must contain both letters and digits".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email(" alice@example.com ").is_ok());
        assert!(validate_email("alice").is_err());
        assert!(validate_email("alice@").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@nodot").is_err());
        assert!(validate_email("a lice@example.com").is_err());
    }

    #[test]
    fn password_strength() {
        assert!(validate_password_strength("passw0rd").is_ok());
        assert!(validate_password_strength("short1").is_err());
        assert!(validate_password_strength("lettersonly").is_err());
        assert!(validate_password_strength("12345678").is_err());
    }

    #[test]
    fn weak_password_message_is_specific() {
        let err = validate_password_strength("abc").unwrap_err();
        assert!(err.to_string().contains("at least 8 characters"));
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        use axum::response::IntoResponse;

        let conflict: ApiError = AuthError::EmailAlreadyExists.into();
        assert_eq!(conflict.into_response().status(), 409);

        let unauthorized: ApiError = AuthError::InvalidCredentials.into();
        assert_eq!(unauthorized.into_response().status(), 401);

        let validation: ApiError = AuthError::WeakPassword("too short".into()).into();
        assert_eq!(validation.into_response().status(), 400);
    }
}
