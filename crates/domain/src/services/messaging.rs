//! Messaging rules shared by the chat endpoints.
//!
//! Read state lives in the persistence layer as a per-reader receipts
//! relation: a message is "read" for a viewer once a receipt exists, and a
//! sender's own messages never count as unread for them. Receipts only ever
//! appear, never disappear, so the read transition is one-way and one member
//! marking a chat read does not consume another member's unread count.

use crate::models::chat::{ChatKind, DEFAULT_GROUP_NAME};

/// Effective chat name at creation: individual chats carry none; group
/// chats default to a placeholder when not supplied.
pub fn effective_chat_name(kind: ChatKind, name: Option<String>) -> Option<String> {
    match kind {
        ChatKind::Individual => None,
        ChatKind::Group => Some(
            name.filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GROUP_NAME.to_string()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_naming_defaults() {
        assert_eq!(effective_chat_name(ChatKind::Individual, Some("X".into())), None);
        assert_eq!(
            effective_chat_name(ChatKind::Group, None).as_deref(),
            Some(DEFAULT_GROUP_NAME)
        );
        assert_eq!(
            effective_chat_name(ChatKind::Group, Some("  ".into())).as_deref(),
            Some(DEFAULT_GROUP_NAME)
        );
        assert_eq!(
            effective_chat_name(ChatKind::Group, Some("Parents".into())).as_deref(),
            Some("Parents")
        );
    }
}
