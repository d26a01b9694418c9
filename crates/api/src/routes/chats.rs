//! Chat endpoints: creation and the caller's chat list with unread counts.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use domain::models::{Chat, ChatKind, ChatSummary, CreateChatRequest};
use domain::services::messaging;
use domain::DomainError;
use persistence::changes::{ChangeCollection, ChangeOp, FamilyChange};
use persistence::repositories::ChatRepository;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Chat projection returned on creation (no unread count yet; a new chat
/// has no messages).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub id: Uuid,
    pub kind: ChatKind,
    pub participants: Vec<Uuid>,
    pub name: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Chat> for ChatResponse {
    fn from(chat: Chat) -> Self {
        Self {
            id: chat.id,
            kind: chat.kind,
            participants: chat.participants,
            name: chat.name,
            created_by: chat.created_by,
            created_at: chat.created_at,
        }
    }
}

/// POST /api/v1/chats
pub async fn create_chat(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(req): Json<CreateChatRequest>,
) -> Result<(StatusCode, Json<ChatResponse>), ApiError> {
    req.validate()?;

    let (user, family) = super::family_scope(&state, &auth).await?;

    // The caller is always a participant, listed or not.
    let mut participants = req.participants.clone();
    if !participants.contains(&user.id) {
        participants.push(user.id);
    }
    if let Some(outsider) = participants.iter().find(|p| !family.is_member(**p)) {
        return Err(DomainError::not_found(format!(
            "Participant {} is not a member of this family",
            outsider
        ))
        .into());
    }

    let name = messaging::effective_chat_name(req.kind, req.name);

    let chat = ChatRepository::new(state.pool.clone())
        .create(
            &family.code,
            req.kind.into(),
            &participants,
            name.as_deref(),
            user.id,
        )
        .await?;

    tracing::debug!(chat_id = %chat.id, family_code = %family.code, "chat created");

    state.change_hub.publish(FamilyChange {
        family_code: family.code,
        collection: ChangeCollection::Chats,
        entity_id: chat.id,
        op: ChangeOp::Created,
    });

    Ok((StatusCode::CREATED, Json(chat.into())))
}

/// GET /api/v1/chats
pub async fn list_chats(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<Vec<ChatSummary>>, ApiError> {
    let (user, family) = super::family_scope(&state, &auth).await?;

    let chats = ChatRepository::new(state.pool.clone())
        .list_for_viewer(&family.code, user.id)
        .await?;

    let summaries = chats
        .into_iter()
        .map(|c| ChatSummary {
            id: c.id,
            kind: c.kind.into(),
            participants: c.participants,
            name: c.name,
            unread_count: c.unread_count.max(0) as u32,
            created_at: c.created_at,
        })
        .collect();

    Ok(Json(summaries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn chat_response_serializes_camel_case() {
        let chat = Chat {
            id: Uuid::new_v4(),
            family_code: "ABC-1234-DE#".into(),
            kind: ChatKind::Group,
            participants: vec![Uuid::new_v4()],
            name: Some("New group".into()),
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(ChatResponse::from(chat)).unwrap();
        assert_eq!(json["kind"], "group");
        assert!(json.get("createdBy").is_some());
        assert!(json.get("family_code").is_none());
    }
}
