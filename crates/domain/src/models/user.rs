//! User domain model and profile request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A registered user. `family_code` is absent until the user creates or
/// joins a family; family-scoped operations are rejected until then.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub family_code: Option<String>,
    pub is_valid_member: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Family code of this user, or `DomainError::NotInFamily`.
    pub fn require_family(&self) -> Result<&str, crate::DomainError> {
        self.family_code
            .as_deref()
            .ok_or(crate::DomainError::NotInFamily)
    }
}

/// Request to update the caller's profile. Display name is the only
/// mutable identity field.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "shared::validation::validate_display_name"))]
    pub name: String,
}

/// Public projection of a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub family_code: Option<String>,
    pub is_valid_member: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            family_code: user.family_code,
            is_valid_member: user.is_valid_member,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(family_code: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            family_code: family_code.map(String::from),
            is_valid_member: family_code.is_some(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn require_family_enforced() {
        assert!(user(None).require_family().is_err());
        assert_eq!(user(Some("ABC-1234-DE#")).require_family().unwrap(), "ABC-1234-DE#");
    }

    #[test]
    fn update_profile_validation() {
        let ok = UpdateProfileRequest { name: "Bob".into() };
        assert!(ok.validate().is_ok());

        let empty = UpdateProfileRequest { name: "   ".into() };
        assert!(empty.validate().is_err());
    }
}
