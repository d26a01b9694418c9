//! User repository for database operations.

use chrono::Utc;
use domain::models::User;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserEntity;

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user row; fails on duplicate email (unique constraint).
    pub async fn create(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let entity = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, password_hash, family_code, is_valid_member,
                      created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let entity = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, name, password_hash, family_code, is_valid_member,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Find a user row (including the password hash) by email.
    pub async fn find_entity_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, name, password_hash, family_code, is_valid_member,
                   created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// Fetch the users referenced by a family's member list.
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, sqlx::Error> {
        let entities = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, name, password_hash, family_code, is_valid_member,
                   created_at, updated_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Update the display name.
    pub async fn update_name(&self, id: Uuid, name: &str) -> Result<User, sqlx::Error> {
        let entity = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users
            SET name = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, email, name, password_hash, family_code, is_valid_member,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }
}
