//! Change stream endpoint.
//!
//! Streams the caller's family change events over a WebSocket. Events are
//! published only after the backing write is acknowledged, so a client that
//! refetches on receipt always observes the new state. The subscription is
//! dropped when the socket closes.

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use persistence::changes::FamilySubscription;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// GET /api/v1/changes/ws
pub async fn change_stream(
    State(state): State<AppState>,
    auth: UserAuth,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let user = super::current_user(&state, &auth).await?;
    let family_code = user.require_family()?.to_string();

    let subscription = state.change_hub.subscribe(family_code.clone());

    Ok(ws.on_upgrade(move |socket| async move {
        tracing::debug!(user_id = %user.id, family_code = %family_code, "change stream opened");
        stream_changes(socket, subscription).await;
        tracing::debug!(user_id = %user.id, family_code = %family_code, "change stream closed");
    }))
}

async fn stream_changes(socket: WebSocket, mut subscription: FamilySubscription) {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            change = subscription.next() => {
                let Some(change) = change else { break };
                let payload = match serde_json::to_string(&change) {
                    Ok(payload) => payload,
                    Err(err) => {
                        tracing::error!(error = %err, "failed to serialize change event");
                        continue;
                    }
                };
                if sink.send(WsMessage::Text(payload)).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => {
                // Clients only listen; any close (or error) ends the stream.
                match incoming {
                    Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                }
            }
        }
    }
}
