//! Provider and model catalogue

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{Json, ModelsResponse};

/// GET /api/models
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    debug!("Listing providers and models");
    Json(ModelsResponse::from_registry(&state.registry))
}
