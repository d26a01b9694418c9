//! Session repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SessionEntity;

/// Repository for session database operations.
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a newly issued refresh token.
    pub async fn create(
        &self,
        user_id: Uuid,
        refresh_jti: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<SessionEntity, sqlx::Error> {
        sqlx::query_as::<_, SessionEntity>(
            r#"
            INSERT INTO sessions (user_id, refresh_jti, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, refresh_jti, expires_at, revoked_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(refresh_jti)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
    }

    /// Look up the session backing a refresh token's jti.
    pub async fn find_by_jti(&self, jti: &str) -> Result<Option<SessionEntity>, sqlx::Error> {
        sqlx::query_as::<_, SessionEntity>(
            r#"
            SELECT id, user_id, refresh_jti, expires_at, revoked_at, created_at
            FROM sessions
            WHERE refresh_jti = $1
            "#,
        )
        .bind(jti)
        .fetch_optional(&self.pool)
        .await
    }

    /// Revoke the session for a refresh jti. Idempotent; returns whether a
    /// live session was revoked.
    pub async fn revoke_by_jti(&self, jti: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = $2 WHERE refresh_jti = $1 AND revoked_at IS NULL",
        )
        .bind(jti)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
