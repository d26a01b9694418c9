//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::User;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the users table. Carries the password hash,
/// which never crosses into the domain model.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub family_code: Option<String>,
    pub is_valid_member: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(e: UserEntity) -> Self {
        User {
            id: e.id,
            name: e.name,
            email: e.email,
            family_code: e.family_code,
            is_valid_member: e.is_valid_member,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}
