//! Chat repository for database operations.

use domain::models::Chat;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ChatEntity, ChatKindDb, ChatWithUnreadEntity};

/// Repository for chat database operations.
#[derive(Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new chat.
    pub async fn create(
        &self,
        family_code: &str,
        kind: ChatKindDb,
        participants: &[Uuid],
        name: Option<&str>,
        created_by: Uuid,
    ) -> Result<Chat, sqlx::Error> {
        let entity = sqlx::query_as::<_, ChatEntity>(
            r#"
            INSERT INTO chats (family_code, kind, participants, name, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, family_code, kind, participants, name, created_by, created_at
            "#,
        )
        .bind(family_code)
        .bind(kind)
        .bind(participants)
        .bind(name)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a chat by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Chat>, sqlx::Error> {
        let entity = sqlx::query_as::<_, ChatEntity>(
            r#"
            SELECT id, family_code, kind, participants, name, created_by, created_at
            FROM chats
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List the chats a viewer participates in, each with the viewer's
    /// unread count: messages from other senders the viewer has no read
    /// receipt for.
    pub async fn list_for_viewer(
        &self,
        family_code: &str,
        viewer: Uuid,
    ) -> Result<Vec<ChatWithUnreadEntity>, sqlx::Error> {
        sqlx::query_as::<_, ChatWithUnreadEntity>(
            r#"
            SELECT c.id, c.family_code, c.kind, c.participants, c.name, c.created_by,
                   c.created_at,
                   (SELECT COUNT(*)
                    FROM messages m
                    WHERE m.chat_id = c.id
                      AND m.sender_id <> $2
                      AND NOT EXISTS (
                          SELECT 1 FROM message_reads r
                          WHERE r.message_id = m.id AND r.user_id = $2
                      )) AS unread_count
            FROM chats c
            WHERE c.family_code = $1 AND c.participants @> ARRAY[$2]::uuid[]
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(family_code)
        .bind(viewer)
        .fetch_all(&self.pool)
        .await
    }
}
