//! Chat domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Default name given to group chats created without one.
pub const DEFAULT_GROUP_NAME: &str = "New group";

/// Kind of chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Individual,
    Group,
}

impl ChatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatKind::Individual => "individual",
            ChatKind::Group => "group",
        }
    }
}

impl FromStr for ChatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "individual" => Ok(ChatKind::Individual),
            "group" => Ok(ChatKind::Group),
            _ => Err(format!("Invalid chat kind: {}", s)),
        }
    }
}

impl fmt::Display for ChatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A chat within a family. Individual chats carry no name; group chats
/// always carry one (defaulted when not supplied).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Chat {
    pub id: Uuid,
    pub family_code: String,
    pub kind: ChatKind,
    pub participants: Vec<Uuid>,
    pub name: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Request to create a chat.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    pub kind: ChatKind,

    #[validate(length(min = 1, message = "At least one participant is required"))]
    pub participants: Vec<Uuid>,

    #[validate(length(max = 100, message = "Chat name must be at most 100 characters"))]
    pub name: Option<String>,
}

/// Chat projection with the caller's unread count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub id: Uuid,
    pub kind: ChatKind,
    pub participants: Vec<Uuid>,
    pub name: Option<String>,
    pub unread_count: u32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parse_round_trip() {
        assert_eq!("group".parse::<ChatKind>().unwrap(), ChatKind::Group);
        assert_eq!(
            "Individual".parse::<ChatKind>().unwrap(),
            ChatKind::Individual
        );
        assert!("channel".parse::<ChatKind>().is_err());
    }

    #[test]
    fn create_request_requires_participants() {
        let req = CreateChatRequest {
            kind: ChatKind::Group,
            participants: vec![],
            name: None,
        };
        assert!(req.validate().is_err());
    }
}
