//! HTTP route handlers.

pub mod auth;
pub mod calendar;
pub mod changes;
pub mod chats;
pub mod families;
pub mod health;
pub mod messages;
pub mod profile;
pub mod uploads;

use domain::models::{Family, User};
use domain::DomainError;
use persistence::repositories::{FamilyRepository, UserRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Loads the caller's user row; a valid token for a deleted account is
/// treated as stale.
pub(crate) async fn current_user(state: &AppState, auth: &UserAuth) -> Result<User, ApiError> {
    UserRepository::new(state.pool.clone())
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".into()))
}

/// Loads the caller and their family. Every family-scoped operation goes
/// through here, so cross-family access never gets a foothold.
pub(crate) async fn family_scope(
    state: &AppState,
    auth: &UserAuth,
) -> Result<(User, Family), ApiError> {
    let user = current_user(state, auth).await?;
    let code = user.require_family()?;

    let family = FamilyRepository::new(state.pool.clone())
        .find_by_code(code)
        .await?
        .ok_or(DomainError::InvalidCode)?;

    Ok((user, family))
}
