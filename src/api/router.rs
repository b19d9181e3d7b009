use axum::{middleware, routing::get, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::chat;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::types::Json;

/// Create the full router with application state.
///
/// Serves the JSON descriptor at `/`, the probes, and the chat API under
/// `/api`. Every route, the descriptor included, sits behind the same layers.
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/api", chat::create_chat_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// GET /
async fn root() -> Json<Value> {
    Json(json!({
        "message": "Chat Relay API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "models": "/api/models",
            "configure": "/api/configure",
            "chat": "/api/chat",
            "stream": "/api/chat/stream",
            "reset": "/api/reset",
            "health": "/health"
        }
    }))
}
