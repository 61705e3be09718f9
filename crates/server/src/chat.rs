//! Chat endpoints backed by the configured [`Assistant`](crate::Assistant).
//!
//! Provider failures are rendered as an assistant message; the request
//! itself still succeeds.

use api_types::chat::{
    AnalyzeRfqRequest, AnalyzeRfqResponse, ChatMessage, ChatRequest, ChatResponse, ChatRole,
};
use axum::{Extension, Json, extract::State};
use engine::User;

use crate::{ServerError, assistant::AssistantError, server::ServerState};

const ERROR_REPLY: &str = "Sorry, I could not reach the procurement assistant right now. \
Please try again in a moment.";

fn fallback(err: &AssistantError, username: &str) -> String {
    tracing::warn!("assistant failed for {username}: {err}");
    ERROR_REPLY.to_string()
}

pub async fn send(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    let content = payload.message.trim();
    if content.is_empty() {
        return Err(ServerError::Generic("message must not be empty".to_string()));
    }

    let mut messages = payload.history;
    messages.push(ChatMessage {
        role: ChatRole::User,
        content: content.to_string(),
    });

    let reply = match state.assistant.reply(&messages).await {
        Ok(reply) => reply,
        Err(err) => fallback(&err, &user.username),
    };
    messages.push(ChatMessage {
        role: ChatRole::Assistant,
        content: reply,
    });

    Ok(Json(ChatResponse { messages }))
}

/// Advice on an RFQ the caller can see.
pub async fn analyze_rfq(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<AnalyzeRfqRequest>,
) -> Result<Json<AnalyzeRfqResponse>, ServerError> {
    let rfq = state.engine.rfq(&user.username, payload.rfq_id).await?;
    let analysis = match state.assistant.analyze_rfq(&rfq).await {
        Ok(analysis) => analysis,
        Err(err) => fallback(&err, &user.username),
    };
    Ok(Json(AnalyzeRfqResponse {
        rfq_id: rfq.id,
        analysis,
    }))
}
