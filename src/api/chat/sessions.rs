//! Session lifecycle handlers

use axum::extract::{Path, State};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, ChatRequest, ConfigureRequest, HistoryResponse, Json, StatusResponse,
};

/// POST /api/configure
pub async fn configure(
    State(state): State<AppState>,
    Json(request): Json<ConfigureRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    info!(
        session_id = %request.session_id,
        provider = %request.provider,
        model = %request.model_name,
        "Configuring session"
    );

    state
        .conversation_service
        .configure(&request.session_id, request.model_config())
        .await?;

    Ok(Json(StatusResponse::success(format!(
        "Configured {} model: {}",
        request.provider, request.model_name
    ))))
}

/// POST /api/reset
///
/// The `message` field of the body is accepted and ignored.
pub async fn reset(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    state
        .conversation_service
        .reset(&request.session_id)
        .await?;

    Ok(Json(StatusResponse::success("Conversation reset")))
}

/// GET /api/sessions/{session_id}/messages
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let snapshot = state.conversation_service.history(&session_id).await?;
    Ok(Json(HistoryResponse::from(snapshot)))
}
