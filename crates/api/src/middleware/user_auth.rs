//! User JWT authentication middleware.
//!
//! Requires a valid access token on every route it wraps and stores the
//! authenticated identity in request extensions for downstream handlers.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::app::AppState;
use shared::jwt::{TokenKind, TokenSigner};

/// Authenticated user information extracted from the access token.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    /// JWT ID (jti) for log correlation.
    pub jti: String,
}

impl UserAuth {
    /// Validates an access token and returns the authenticated identity.
    pub fn validate(signer: &TokenSigner, token: &str) -> Result<Self, String> {
        let claims = signer
            .validate(token, TokenKind::Access)
            .map_err(|e| format!("Invalid token: {}", e))?;

        let user_id = claims
            .user_id()
            .map_err(|_| "Invalid user ID in token".to_string())?;

        Ok(UserAuth {
            user_id,
            jti: claims.jti,
        })
    }
}

/// Middleware that requires JWT user authentication.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    match UserAuth::validate(&state.signer, token) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("JWT validation failed: {}", e);
            unauthorized_response("Invalid or expired token")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new_for_testing("family_hub_test_secret_0123456789")
    }

    #[test]
    fn accepts_valid_access_token() {
        let signer = signer();
        let user_id = Uuid::new_v4();
        let issued = signer.issue_access_token(user_id).unwrap();

        let auth = UserAuth::validate(&signer, &issued.token).unwrap();
        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.jti, issued.jti);
    }

    #[test]
    fn rejects_refresh_token_as_access() {
        let signer = signer();
        let issued = signer.issue_refresh_token(Uuid::new_v4()).unwrap();
        assert!(UserAuth::validate(&signer, &issued.token).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(UserAuth::validate(&signer(), "not.a.token").is_err());
    }

    #[test]
    fn unauthorized_response_status() {
        let response = unauthorized_response("Missing or invalid Authorization header");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
