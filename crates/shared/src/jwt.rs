//! JWT token utilities using RS256 signing.
//!
//! Access tokens are short-lived and carry the session identity; refresh
//! tokens are long-lived and backed by a stored session row so they can be
//! revoked on sign-out.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Kind of JWT token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID (unique token identifier, used for session revocation)
    pub jti: String,
    /// Token kind (access or refresh)
    pub kind: TokenKind,
}

impl Claims {
    /// Parses the user ID out of the subject claim.
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }
}

/// Default leeway in seconds for clock skew tolerance.
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// A freshly issued token together with its jti.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_in_secs: i64,
}

/// Signs and validates Family Hub tokens.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    pub access_expiry_secs: i64,
    pub refresh_expiry_secs: i64,
    pub leeway_secs: u64,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("access_expiry_secs", &self.access_expiry_secs)
            .field("refresh_expiry_secs", &self.refresh_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl TokenSigner {
    /// Creates a signer from an RSA key pair in PEM format.
    pub fn new(
        private_key_pem: &str,
        public_key_pem: &str,
        access_expiry_secs: i64,
        refresh_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid private key: {}", e)))?;

        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid public key: {}", e)))?;

        Ok(Self {
            encoding_key,
            decoding_key,
            access_expiry_secs,
            refresh_expiry_secs,
            leeway_secs,
        })
    }

    /// Creates a signer with an HS256 symmetric key. Tests only.
    #[cfg(any(test, feature = "test-keys"))]
    pub fn new_for_testing(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_expiry_secs: 900,
            refresh_expiry_secs: 604_800,
            leeway_secs: 0,
        }
    }

    /// Issues an access token for the given user.
    pub fn issue_access_token(&self, user_id: Uuid) -> Result<IssuedToken, JwtError> {
        self.issue(user_id, TokenKind::Access, self.access_expiry_secs)
    }

    /// Issues a refresh token for the given user.
    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<IssuedToken, JwtError> {
        self.issue(user_id, TokenKind::Refresh, self.refresh_expiry_secs)
    }

    fn issue(
        &self,
        user_id: Uuid,
        kind: TokenKind,
        expiry_secs: i64,
    ) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
            kind,
        };

        let token = encode(&Header::new(self.algorithm()), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok(IssuedToken {
            token,
            jti,
            expires_in_secs: expiry_secs,
        })
    }

    /// Validates a token of the expected kind and returns its claims.
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm());
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        if data.claims.kind != expected {
            return Err(JwtError::InvalidToken);
        }

        Ok(data.claims)
    }

    fn algorithm(&self) -> Algorithm {
        #[cfg(any(test, feature = "test-keys"))]
        {
            Algorithm::HS256
        }
        #[cfg(not(any(test, feature = "test-keys")))]
        {
            Algorithm::RS256
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new_for_testing("family_hub_test_secret_0123456789")
    }

    #[test]
    fn access_token_round_trip() {
        let signer = signer();
        let user_id = Uuid::new_v4();

        let issued = signer.issue_access_token(user_id).unwrap();
        let claims = signer.validate(&issued.token, TokenKind::Access).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn refresh_token_rejected_as_access() {
        let signer = signer();
        let issued = signer.issue_refresh_token(Uuid::new_v4()).unwrap();

        let err = signer.validate(&issued.token, TokenKind::Access).unwrap_err();
        assert!(matches!(err, JwtError::InvalidToken));
    }

    #[test]
    fn garbage_token_rejected() {
        let signer = signer();
        assert!(signer.validate("not.a.token", TokenKind::Access).is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let mut signer = signer();
        signer.access_expiry_secs = -10;

        let issued = signer.issue_access_token(Uuid::new_v4()).unwrap();
        let err = signer.validate(&issued.token, TokenKind::Access).unwrap_err();
        assert!(matches!(err, JwtError::TokenExpired));
    }

    #[test]
    fn jti_unique_per_token() {
        let signer = signer();
        let user_id = Uuid::new_v4();
        let a = signer.issue_access_token(user_id).unwrap();
        let b = signer.issue_access_token(user_id).unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
