//! Chat API endpoints, mounted under `/api`

pub mod messages;
pub mod models;
pub mod sessions;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create the chat API router
pub fn create_chat_router() -> Router<AppState> {
    Router::new()
        .route("/models", get(models::list_models))
        .route("/configure", post(sessions::configure))
        .route("/reset", post(sessions::reset))
        .route(
            "/sessions/{session_id}/messages",
            get(sessions::get_history),
        )
        .route("/chat", post(messages::chat))
        .route("/chat/stream", post(messages::chat_stream))
}
