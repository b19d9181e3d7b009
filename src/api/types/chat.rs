//! Chat API request and response bodies

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::{Message, MessageRole, ModelConfig, ProviderRegistry};
use crate::infrastructure::services::SessionSnapshot;

/// POST /api/configure
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigureRequest {
    #[serde(alias = "sessionId")]
    pub session_id: String,
    pub provider: String,
    #[serde(alias = "modelName")]
    pub model_name: String,
    #[serde(alias = "credential")]
    pub api_key: String,
}

impl ConfigureRequest {
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig::new(&self.provider, &self.model_name, &self.api_key)
    }
}

/// POST /api/chat, /api/chat/stream and /api/reset
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(alias = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub response: String,
}

/// Acknowledgement for configure and reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

/// GET /api/models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub providers: Vec<String>,
    /// Keyed in the same order as `providers`
    pub models: IndexMap<String, Vec<String>>,
}

impl ModelsResponse {
    pub fn from_registry(registry: &ProviderRegistry) -> Self {
        let providers = registry.list_providers();

        Self {
            providers: providers.iter().map(|p| p.as_str().to_string()).collect(),
            models: providers
                .iter()
                .map(|p| {
                    let models = registry
                        .list_models(*p)
                        .iter()
                        .map(|m| m.to_string())
                        .collect();
                    (p.as_str().to_string(), models)
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDto {
    pub role: MessageRole,
    pub content: String,
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content_text().to_string(),
        }
    }
}

/// GET /api/sessions/{session_id}/messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub provider: String,
    pub model: String,
    pub messages: Vec<MessageDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionSnapshot> for HistoryResponse {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            session_id: snapshot.session_id,
            provider: snapshot.provider.as_str().to_string(),
            model: snapshot.model,
            messages: snapshot.messages.iter().map(MessageDto::from).collect(),
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_request_snake_case() {
        let request: ConfigureRequest = serde_json::from_value(serde_json::json!({
            "session_id": "s1",
            "provider": "openai",
            "model_name": "gpt-4",
            "api_key": "sk-test"
        }))
        .unwrap();

        assert_eq!(request.session_id, "s1");
        assert_eq!(request.model_config().credential, "sk-test");
    }

    #[test]
    fn test_configure_request_camel_case_aliases() {
        let request: ConfigureRequest = serde_json::from_value(serde_json::json!({
            "sessionId": "s1",
            "provider": "google",
            "modelName": "gemini-2.0-flash",
            "credential": "key"
        }))
        .unwrap();

        assert_eq!(request.model_name, "gemini-2.0-flash");
        assert_eq!(request.api_key, "key");
    }

    #[test]
    fn test_reset_request_without_message() {
        let request: ChatRequest =
            serde_json::from_value(serde_json::json!({"session_id": "s1"})).unwrap();
        assert!(request.message.is_empty());
    }

    #[test]
    fn test_models_response_from_registry() {
        let response = ModelsResponse::from_registry(&ProviderRegistry);

        assert_eq!(response.providers, vec!["openai", "anthropic", "google"]);
        assert_eq!(response.models["anthropic"].len(), 3);
        assert_eq!(response.models["openai"][0], "gpt-4.1-2025-04-14");
    }

    #[test]
    fn test_models_keys_follow_provider_order() {
        let response = ModelsResponse::from_registry(&ProviderRegistry);

        let keys: Vec<&str> = response.models.keys().map(String::as_str).collect();
        assert_eq!(keys, response.providers);

        let body = serde_json::to_string(&response).unwrap();
        let models = &body[body.find("\"models\"").unwrap()..];
        let openai = models.find("\"openai\"").unwrap();
        let anthropic = models.find("\"anthropic\"").unwrap();
        let google = models.find("\"google\"").unwrap();
        assert!(openai < anthropic && anthropic < google);
    }

    #[test]
    fn test_status_response() {
        let json = serde_json::to_value(StatusResponse::success("Conversation reset")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "success", "message": "Conversation reset"})
        );
    }
}
