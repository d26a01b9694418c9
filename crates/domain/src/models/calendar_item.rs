//! Calendar item domain models: tasks and events share one shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Kind of calendar item. Tasks are assignable and completable; events are
/// informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Task,
    Event,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Task => "task",
            ItemKind::Event => "event",
        }
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "task" => Ok(ItemKind::Task),
            "event" => Ok(ItemKind::Event),
            _ => Err(format!("Invalid item kind: {}", s)),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A task or event on the family calendar.
///
/// `completed`/`completed_at` are meaningful only for tasks, and
/// `completed_at` is set iff `completed` is true. Items stay scoped to
/// their family for life.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CalendarItem {
    pub id: Uuid,
    pub family_code: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub color_tag: String,
    pub kind: ItemKind,
    pub completed: bool,
    pub assignee: Option<String>,
    pub created_by: Uuid,
    pub created_by_name: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request to create a calendar item. Authorship and family scope are
/// stamped from the session, never taken from the client.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCalendarItemRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub date: DateTime<Utc>,

    #[validate(custom(function = "shared::validation::validate_color_tag"))]
    pub color_tag: String,

    pub kind: ItemKind,

    #[validate(length(min = 1, max = 50, message = "Assignee must be 1-50 characters"))]
    pub assignee: Option<String>,
}

/// Request to update an existing item. Kind and authorship are immutable.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCalendarItemRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub date: DateTime<Utc>,

    #[validate(custom(function = "shared::validation::validate_color_tag"))]
    pub color_tag: String,

    #[validate(length(min = 1, max = 50, message = "Assignee must be 1-50 characters"))]
    pub assignee: Option<String>,
}

/// Query parameters for listing calendar items.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ListCalendarItemsQuery {
    /// Restrict to items falling on this calendar day (UTC).
    pub date: Option<chrono::NaiveDate>,
    /// Restrict to one kind (the caller's active view).
    pub kind: Option<ItemKind>,
}

/// Calendar item projection returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarItemResponse {
    pub id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub color_tag: String,
    pub kind: ItemKind,
    pub completed: bool,
    pub assignee: Option<String>,
    pub created_by: Uuid,
    pub created_by_name: String,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<CalendarItem> for CalendarItemResponse {
    fn from(item: CalendarItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            date: item.date,
            color_tag: item.color_tag,
            kind: item.kind,
            completed: item.completed,
            assignee: item.assignee,
            created_by: item.created_by,
            created_by_name: item.created_by_name,
            completed_at: item.completed_at,
        }
    }
}

/// One row of the family leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub name: String,
    pub points: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parse_round_trip() {
        assert_eq!("task".parse::<ItemKind>().unwrap(), ItemKind::Task);
        assert_eq!("Event".parse::<ItemKind>().unwrap(), ItemKind::Event);
        assert!("meeting".parse::<ItemKind>().is_err());
    }

    #[test]
    fn create_request_validation() {
        let ok = CreateCalendarItemRequest {
            title: "Walk the dog".into(),
            date: Utc::now(),
            color_tag: "#3B82F6".into(),
            kind: ItemKind::Task,
            assignee: Some("Carol".into()),
        };
        assert!(ok.validate().is_ok());

        let bad_color = CreateCalendarItemRequest {
            color_tag: "blue".into(),
            ..ok.clone()
        };
        assert!(bad_color.validate().is_err());

        let empty_title = CreateCalendarItemRequest {
            title: "".into(),
            ..ok
        };
        assert!(empty_title.validate().is_err());
    }
}
