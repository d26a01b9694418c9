//! Session entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the sessions table. One row per issued refresh
/// token; revoked on sign-out.
#[derive(Debug, Clone, FromRow)]
pub struct SessionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_jti: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SessionEntity {
    /// True iff the session can still mint access tokens.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_in: i64, revoked: bool) -> SessionEntity {
        let now = Utc::now();
        SessionEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            refresh_jti: Uuid::new_v4().to_string(),
            expires_at: now + Duration::seconds(expires_in),
            revoked_at: revoked.then_some(now),
            created_at: now,
        }
    }

    #[test]
    fn active_session() {
        assert!(session(3600, false).is_active(Utc::now()));
    }

    #[test]
    fn expired_or_revoked_session_inactive() {
        assert!(!session(-10, false).is_active(Utc::now()));
        assert!(!session(3600, true).is_active(Utc::now()));
    }
}
