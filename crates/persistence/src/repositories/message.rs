//! Message repository for database operations.
//!
//! Read state is per reader: a row in message_reads means that user has seen
//! that message. The `read` column selected here is always relative to the
//! viewer passed in, never a shared flag.

use domain::models::Message;
use shared::pagination::Pagination;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{MessageEntity, MessageKindDb};

/// Repository for message database operations.
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new message. The sender's own view is always read.
    pub async fn create(
        &self,
        chat_id: Uuid,
        family_code: &str,
        sender_id: Uuid,
        sender_name: &str,
        content: &str,
        kind: MessageKindDb,
        image_ref: Option<&str>,
    ) -> Result<Message, sqlx::Error> {
        let entity = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO messages (chat_id, family_code, sender_id, sender_name, content, kind, image_ref)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, chat_id, family_code, sender_id, sender_name, content, kind,
                      image_ref, TRUE AS read, created_at
            "#,
        )
        .bind(chat_id)
        .bind(family_code)
        .bind(sender_id)
        .bind(sender_name)
        .bind(content)
        .bind(kind)
        .bind(image_ref)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a message by ID; `read` is computed for the given viewer.
    pub async fn find_by_id(
        &self,
        id: Uuid,
        viewer: Uuid,
    ) -> Result<Option<Message>, sqlx::Error> {
        let entity = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT m.id, m.chat_id, m.family_code, m.sender_id, m.sender_name, m.content,
                   m.kind, m.image_ref,
                   (m.sender_id = $2 OR EXISTS (
                       SELECT 1 FROM message_reads r
                       WHERE r.message_id = m.id AND r.user_id = $2
                   )) AS read,
                   m.created_at
            FROM messages m
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .bind(viewer)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List a chat's messages oldest-first, with the viewer's read state.
    pub async fn list_for_chat(
        &self,
        chat_id: Uuid,
        viewer: Uuid,
        page: Pagination,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let entities = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT m.id, m.chat_id, m.family_code, m.sender_id, m.sender_name, m.content,
                   m.kind, m.image_ref,
                   (m.sender_id = $2 OR EXISTS (
                       SELECT 1 FROM message_reads r
                       WHERE r.message_id = m.id AND r.user_id = $2
                   )) AS read,
                   m.created_at
            FROM messages m
            WHERE m.chat_id = $1
            ORDER BY m.created_at ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(chat_id)
        .bind(viewer)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Record read receipts for the viewer on every message in the chat sent
    /// by someone else. One statement, so a concurrent send either lands
    /// before the scan (and is marked) or after (and stays unread). Returns
    /// the number of receipts inserted.
    pub async fn mark_read(&self, chat_id: Uuid, viewer: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO message_reads (message_id, user_id)
            SELECT m.id, $2
            FROM messages m
            WHERE m.chat_id = $1 AND m.sender_id <> $2
            ON CONFLICT (message_id, user_id) DO NOTHING
            "#,
        )
        .bind(chat_id)
        .bind(viewer)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete a message. Returns the number of rows removed.
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
