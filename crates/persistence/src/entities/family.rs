//! Family entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Family;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the families table.
#[derive(Debug, Clone, FromRow)]
pub struct FamilyEntity {
    pub code: String,
    pub name: String,
    pub members: Vec<Uuid>,
    pub created_by: Uuid,
    pub deputy_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<FamilyEntity> for Family {
    fn from(e: FamilyEntity) -> Self {
        Family {
            code: e.code,
            name: e.name,
            members: e.members,
            created_by: e.created_by,
            deputy_id: e.deputy_id,
            created_at: e.created_at,
        }
    }
}
