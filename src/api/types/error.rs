//! API error type rendered as `{"detail": "..."}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Error body returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub detail: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                detail: detail.into(),
            },
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    pub fn detail(&self) -> &str {
        &self.response.detail
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Internal { .. } => Self::internal(err.to_string()),
            DomainError::UnsupportedProvider { .. }
            | DomainError::SessionNotConfigured { .. }
            | DomainError::InvalidConfiguration { .. }
            | DomainError::Provider { .. }
            | DomainError::Validation { .. } => Self::bad_request(err.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.response.detail)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_not_configured_is_client_error() {
        let err: ApiError = DomainError::session_not_configured("ghost").into();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.detail(),
            "Session not configured. Please configure a model first."
        );
    }

    #[test]
    fn test_invalid_configuration_detail() {
        let err: ApiError = DomainError::invalid_configuration("Unsupported provider: x").into();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.detail(),
            "Error configuring model: Unsupported provider: x"
        );
    }

    #[test]
    fn test_provider_error_is_client_error() {
        let err: ApiError = DomainError::provider("openai", "HTTP 401").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_is_server_error() {
        let err: ApiError = DomainError::internal("poisoned").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::bad_request("nope");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json, serde_json::json!({"detail": "nope"}));
    }
}
