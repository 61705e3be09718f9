use api_types::message::{MessageListQuery, MessageNew, MessageView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Message, MessageListFilter, NewMessage, User};
use uuid::Uuid;

use crate::{ServerError, convert::message_status, server::ServerState};

fn message_view(message: Message) -> MessageView {
    MessageView {
        id: message.id,
        sender_id: message.sender_id,
        receiver_id: message.receiver_id,
        rfq_id: message.rfq_id,
        bid_id: message.bid_id,
        content: message.content,
        status: message_status::to_wire(message.status),
        created_at: message.created_at,
    }
}

/// Sent and received messages, newest first. Received `sent` messages are
/// marked `delivered` on the way.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<MessageListQuery>,
) -> Result<Json<Vec<MessageView>>, ServerError> {
    let messages = state
        .engine
        .list_messages(
            &user.username,
            MessageListFilter {
                counterpart: query.counterpart,
                rfq_id: query.rfq_id,
            },
        )
        .await?
        .into_iter()
        .map(message_view)
        .collect();
    Ok(Json(messages))
}

pub async fn send(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<MessageNew>,
) -> Result<(StatusCode, Json<MessageView>), ServerError> {
    let message = state
        .engine
        .send_message(
            &user.username,
            NewMessage {
                receiver_id: payload.receiver_id,
                content: payload.content,
                rfq_id: payload.rfq_id,
                bid_id: payload.bid_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(message_view(message))))
}

pub async fn mark_read(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageView>, ServerError> {
    let message = state.engine.mark_message_read(&user.username, id).await?;
    Ok(Json(message_view(message)))
}
