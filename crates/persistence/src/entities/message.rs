//! Message entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Message, MessageKind};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for message_kind that maps to the PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "message_kind", rename_all = "lowercase")]
pub enum MessageKindDb {
    Text,
    Image,
}

impl From<MessageKindDb> for MessageKind {
    fn from(db: MessageKindDb) -> Self {
        match db {
            MessageKindDb::Text => MessageKind::Text,
            MessageKindDb::Image => MessageKind::Image,
        }
    }
}

impl From<MessageKind> for MessageKindDb {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Text => MessageKindDb::Text,
            MessageKind::Image => MessageKindDb::Image,
        }
    }
}

/// Database row mapping for the messages table, joined with the viewer's
/// read state (own messages always count as read).
#[derive(Debug, Clone, FromRow)]
pub struct MessageEntity {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub family_code: String,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub content: String,
    pub kind: MessageKindDb,
    pub image_ref: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MessageEntity> for Message {
    fn from(e: MessageEntity) -> Self {
        Message {
            id: e.id,
            chat_id: e.chat_id,
            family_code: e.family_code,
            sender_id: e.sender_id,
            sender_name: e.sender_name,
            content: e.content,
            kind: e.kind.into(),
            image_ref: e.image_ref,
            read: e.read,
            created_at: e.created_at,
        }
    }
}
