//! Message exchange handlers, blocking and streamed

use std::convert::Infallible;

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, ChatRequest, ChatResponse, Json};
use crate::domain::DomainError;

/// Terminal SSE payload
pub const DONE_SENTINEL: &str = "[DONE]";

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    debug!(session_id = %request.session_id, "Processing chat message");

    let response = state
        .conversation_service
        .send_message(&request.session_id, &request.message)
        .await?;

    Ok(Json(ChatResponse {
        session_id: request.session_id,
        response,
    }))
}

/// POST /api/chat/stream
///
/// Emits one `data:` event per chunk, then `data: [DONE]`. A provider failure
/// after the stream has started is sent as an `error` event before the sentinel.
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    debug!(session_id = %request.session_id, "Processing streamed chat message");

    let chunks = state
        .conversation_service
        .send_message_stream(&request.session_id, &request.message)
        .await?;

    let events = chunks
        .map(|item| Ok::<_, Infallible>(to_event(item)))
        .chain(stream::once(async {
            Ok(Event::default().data(DONE_SENTINEL))
        }));

    Ok(Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response())
}

fn to_event(item: Result<String, DomainError>) -> Event {
    match item {
        Ok(text) => Event::default().data(sse_safe(&text)),
        Err(e) => Event::default().event("error").data(sse_safe(&e.to_string())),
    }
}

/// SSE data cannot carry carriage returns
fn sse_safe(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
