//! Calendar item entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{CalendarItem, ItemKind};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for item_kind that maps to the PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "item_kind", rename_all = "lowercase")]
pub enum ItemKindDb {
    Task,
    Event,
}

impl From<ItemKindDb> for ItemKind {
    fn from(db: ItemKindDb) -> Self {
        match db {
            ItemKindDb::Task => ItemKind::Task,
            ItemKindDb::Event => ItemKind::Event,
        }
    }
}

impl From<ItemKind> for ItemKindDb {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Task => ItemKindDb::Task,
            ItemKind::Event => ItemKindDb::Event,
        }
    }
}

/// Database row mapping for the calendar_items table.
#[derive(Debug, Clone, FromRow)]
pub struct CalendarItemEntity {
    pub id: Uuid,
    pub family_code: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub color_tag: String,
    pub kind: ItemKindDb,
    pub completed: bool,
    pub assignee: Option<String>,
    pub created_by: Uuid,
    pub created_by_name: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<CalendarItemEntity> for CalendarItem {
    fn from(e: CalendarItemEntity) -> Self {
        CalendarItem {
            id: e.id,
            family_code: e.family_code,
            title: e.title,
            date: e.date,
            color_tag: e.color_tag,
            kind: e.kind.into(),
            completed: e.completed,
            assignee: e.assignee,
            created_by: e.created_by,
            created_by_name: e.created_by_name,
            completed_at: e.completed_at,
            created_at: e.created_at,
        }
    }
}
