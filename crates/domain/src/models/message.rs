//! Message domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Kind of message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
        }
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(MessageKind::Text),
            "image" => Ok(MessageKind::Image),
            _ => Err(format!("Invalid message kind: {}", s)),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A chat message.
///
/// `read` is viewer-relative: it reflects whether the requesting viewer has
/// a read receipt for this message (senders always see their own messages
/// as read). Receipts only ever appear, so the transition is one-way.
/// Image messages reference a blob that was stored before the message row
/// was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub family_code: String,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub content: String,
    pub kind: MessageKind,
    pub image_ref: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Request to send a message. Image messages must carry a reference minted
/// by the upload endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "Content must be 1-4000 characters"))]
    pub content: String,

    #[serde(default = "default_kind")]
    pub kind: MessageKind,

    pub image_ref: Option<String>,
}

fn default_kind() -> MessageKind {
    MessageKind::Text
}

/// Message projection returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub content: String,
    pub kind: MessageKind,
    pub image_ref: Option<String>,
    pub read: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            chat_id: m.chat_id,
            sender_id: m.sender_id,
            sender_name: m.sender_name,
            content: m.content,
            kind: m.kind,
            image_ref: m.image_ref,
            read: m.read,
            timestamp: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parse_round_trip() {
        assert_eq!("text".parse::<MessageKind>().unwrap(), MessageKind::Text);
        assert_eq!("Image".parse::<MessageKind>().unwrap(), MessageKind::Image);
        assert!("video".parse::<MessageKind>().is_err());
    }

    #[test]
    fn send_request_defaults_to_text() {
        let req: SendMessageRequest =
            serde_json::from_str(r#"{"content": "hello"}"#).unwrap();
        assert_eq!(req.kind, MessageKind::Text);
        assert!(req.image_ref.is_none());
    }
}
