//! Liveness and readiness probes

use axum::{extract::State, http::StatusCode};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_sessions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthResponse {
    fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            version: env!("CARGO_PKG_VERSION"),
            active_sessions: None,
            detail: None,
        }
    }
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// GET /ready: the session store must answer
pub async fn ready_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.conversation_service.session_count().await {
        Ok(count) => (
            StatusCode::OK,
            Json(HealthResponse {
                active_sessions: Some(count),
                ..HealthResponse::healthy()
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: HealthStatus::Unhealthy,
                detail: Some(e.to_string()),
                ..HealthResponse::healthy()
            }),
        ),
    }
}

/// GET /live
pub async fn live_check() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_response_omits_optional_fields() {
        let json = serde_json::to_value(HealthResponse::healthy()).unwrap();

        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert!(json.get("active_sessions").is_none());
        assert!(json.get("detail").is_none());
    }

    #[test]
    fn test_unhealthy_response_carries_detail() {
        let response = HealthResponse {
            status: HealthStatus::Unhealthy,
            detail: Some("session store unavailable".to_string()),
            ..HealthResponse::healthy()
        };

        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["detail"], "session store unavailable");
    }
}
