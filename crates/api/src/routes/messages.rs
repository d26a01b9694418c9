//! Message endpoints: send, list, read receipts, deletion.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{Chat, MessageKind, MessageResponse, SendMessageRequest};
use domain::DomainError;
use persistence::changes::{ChangeCollection, ChangeOp, FamilyChange};
use persistence::repositories::{ChatRepository, MessageRepository};
use serde::Serialize;
use shared::pagination::Pagination;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::record_message_sent;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub marked: u64,
}

/// Loads a chat the caller may act in: same family, and a participant.
async fn participant_chat(
    state: &AppState,
    family_code: &str,
    caller: Uuid,
    chat_id: Uuid,
) -> Result<Chat, ApiError> {
    let chat = ChatRepository::new(state.pool.clone())
        .find_by_id(chat_id)
        .await?
        .filter(|c| c.family_code == family_code)
        .ok_or(DomainError::not_found("Chat not found"))?;

    if !chat.participants.contains(&caller) {
        return Err(DomainError::forbidden("You are not a participant of this chat").into());
    }

    Ok(chat)
}

/// GET /api/v1/chats/:chat_id/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(chat_id): Path<Uuid>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let (user, family) = super::family_scope(&state, &auth).await?;
    participant_chat(&state, &family.code, user.id, chat_id).await?;

    let messages = MessageRepository::new(state.pool.clone())
        .list_for_chat(chat_id, user.id, page)
        .await?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/chats/:chat_id/messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(chat_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    req.validate()?;

    let (user, family) = super::family_scope(&state, &auth).await?;
    participant_chat(&state, &family.code, user.id, chat_id).await?;

    // Image messages may only link blobs that already exist: the upload
    // always happens first.
    match req.kind {
        MessageKind::Image => {
            let reference = req
                .image_ref
                .as_deref()
                .ok_or_else(|| ApiError::Validation("Image messages require imageRef".into()))?;
            if !state.uploads.exists(reference).await {
                return Err(ApiError::Validation(
                    "imageRef does not reference a stored upload".into(),
                ));
            }
        }
        MessageKind::Text => {
            if req.image_ref.is_some() {
                return Err(ApiError::Validation(
                    "Text messages cannot carry imageRef".into(),
                ));
            }
        }
    }

    let message = MessageRepository::new(state.pool.clone())
        .create(
            chat_id,
            &family.code,
            user.id,
            &user.name,
            &req.content,
            req.kind.into(),
            req.image_ref.as_deref(),
        )
        .await?;

    record_message_sent();
    tracing::debug!(message_id = %message.id, chat_id = %chat_id, "message sent");

    state.change_hub.publish(FamilyChange {
        family_code: family.code,
        collection: ChangeCollection::Messages,
        entity_id: message.id,
        op: ChangeOp::Created,
    });

    Ok((StatusCode::CREATED, Json(message.into())))
}

/// POST /api/v1/chats/:chat_id/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(chat_id): Path<Uuid>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let (user, family) = super::family_scope(&state, &auth).await?;
    participant_chat(&state, &family.code, user.id, chat_id).await?;

    let marked = MessageRepository::new(state.pool.clone())
        .mark_read(chat_id, user.id)
        .await?;

    if marked > 0 {
        state.change_hub.publish(FamilyChange {
            family_code: family.code,
            collection: ChangeCollection::Messages,
            entity_id: chat_id,
            op: ChangeOp::Updated,
        });
    }

    Ok(Json(MarkReadResponse { marked }))
}

/// DELETE /api/v1/messages/:message_id
pub async fn delete_message(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(message_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let (user, family) = super::family_scope(&state, &auth).await?;
    let repo = MessageRepository::new(state.pool.clone());

    let message = repo
        .find_by_id(message_id, user.id)
        .await?
        .filter(|m| m.family_code == family.code)
        .ok_or(DomainError::not_found("Message not found"))?;

    if message.sender_id != user.id {
        return Err(DomainError::forbidden("Only the sender can delete a message").into());
    }

    repo.delete(message_id).await?;

    state.change_hub.publish(FamilyChange {
        family_code: family.code,
        collection: ChangeCollection::Messages,
        entity_id: message_id,
        op: ChangeOp::Deleted,
    });

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_read_response_shape() {
        let json = serde_json::to_value(MarkReadResponse { marked: 3 }).unwrap();
        assert_eq!(json["marked"], 3);
    }
}
