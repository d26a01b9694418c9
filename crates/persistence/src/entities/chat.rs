//! Chat entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Chat, ChatKind};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for chat_kind that maps to the PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "chat_kind", rename_all = "lowercase")]
pub enum ChatKindDb {
    Individual,
    Group,
}

impl From<ChatKindDb> for ChatKind {
    fn from(db: ChatKindDb) -> Self {
        match db {
            ChatKindDb::Individual => ChatKind::Individual,
            ChatKindDb::Group => ChatKind::Group,
        }
    }
}

impl From<ChatKind> for ChatKindDb {
    fn from(kind: ChatKind) -> Self {
        match kind {
            ChatKind::Individual => ChatKindDb::Individual,
            ChatKind::Group => ChatKindDb::Group,
        }
    }
}

/// Database row mapping for the chats table.
#[derive(Debug, Clone, FromRow)]
pub struct ChatEntity {
    pub id: Uuid,
    pub family_code: String,
    pub kind: ChatKindDb,
    pub participants: Vec<Uuid>,
    pub name: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<ChatEntity> for Chat {
    fn from(e: ChatEntity) -> Self {
        Chat {
            id: e.id,
            family_code: e.family_code,
            kind: e.kind.into(),
            participants: e.participants,
            name: e.name,
            created_by: e.created_by,
            created_at: e.created_at,
        }
    }
}

/// Chat row with the viewer's unread message count.
#[derive(Debug, Clone, FromRow)]
pub struct ChatWithUnreadEntity {
    pub id: Uuid,
    pub family_code: String,
    pub kind: ChatKindDb,
    pub participants: Vec<Uuid>,
    pub name: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub unread_count: i64,
}
