//! Calendar item repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::CalendarItem;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{CalendarItemEntity, ItemKindDb};

const RETURNING: &str = r#"
    RETURNING id, family_code, title, date, color_tag, kind, completed, assignee,
              created_by, created_by_name, completed_at, created_at
"#;

/// Fields for inserting a new calendar item.
#[derive(Debug, Clone)]
pub struct NewCalendarItem<'a> {
    pub family_code: &'a str,
    pub title: &'a str,
    pub date: DateTime<Utc>,
    pub color_tag: &'a str,
    pub kind: ItemKindDb,
    pub assignee: Option<&'a str>,
    pub created_by: Uuid,
    pub created_by_name: &'a str,
}

/// Repository for calendar item database operations.
#[derive(Clone)]
pub struct CalendarItemRepository {
    pool: PgPool,
}

impl CalendarItemRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new item. Tasks start uncompleted.
    pub async fn create(&self, item: NewCalendarItem<'_>) -> Result<CalendarItem, sqlx::Error> {
        let entity = sqlx::query_as::<_, CalendarItemEntity>(&format!(
            r#"
            INSERT INTO calendar_items
                (family_code, title, date, color_tag, kind, assignee, created_by, created_by_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            {RETURNING}
            "#
        ))
        .bind(item.family_code)
        .bind(item.title)
        .bind(item.date)
        .bind(item.color_tag)
        .bind(item.kind)
        .bind(item.assignee)
        .bind(item.created_by)
        .bind(item.created_by_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find an item by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CalendarItem>, sqlx::Error> {
        let entity = sqlx::query_as::<_, CalendarItemEntity>(
            r#"
            SELECT id, family_code, title, date, color_tag, kind, completed, assignee,
                   created_by, created_by_name, completed_at, created_at
            FROM calendar_items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List a family's items, ascending by timestamp. Day and kind views are
    /// derived from this set by the domain layer.
    pub async fn list_for_family(
        &self,
        family_code: &str,
    ) -> Result<Vec<CalendarItem>, sqlx::Error> {
        let entities = sqlx::query_as::<_, CalendarItemEntity>(
            r#"
            SELECT id, family_code, title, date, color_tag, kind, completed, assignee,
                   created_by, created_by_name, completed_at, created_at
            FROM calendar_items
            WHERE family_code = $1
            ORDER BY date ASC
            "#,
        )
        .bind(family_code)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Update an item's editable fields.
    pub async fn update(
        &self,
        id: Uuid,
        title: &str,
        date: DateTime<Utc>,
        color_tag: &str,
        assignee: Option<&str>,
    ) -> Result<CalendarItem, sqlx::Error> {
        let entity = sqlx::query_as::<_, CalendarItemEntity>(&format!(
            r#"
            UPDATE calendar_items
            SET title = $2, date = $3, color_tag = $4, assignee = $5
            WHERE id = $1
            {RETURNING}
            "#
        ))
        .bind(id)
        .bind(title)
        .bind(date)
        .bind(color_tag)
        .bind(assignee)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Mark a task completed. Returns `None` when the task was already
    /// completed (or does not exist), so re-completion never double-counts.
    pub async fn complete(&self, id: Uuid) -> Result<Option<CalendarItem>, sqlx::Error> {
        let entity = sqlx::query_as::<_, CalendarItemEntity>(&format!(
            r#"
            UPDATE calendar_items
            SET completed = TRUE, completed_at = $2
            WHERE id = $1 AND kind = 'task' AND completed = FALSE
            {RETURNING}
            "#
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Delete an item. Returns the number of rows removed.
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM calendar_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
