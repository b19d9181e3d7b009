use serde::Deserialize;
use std::sync::Arc;

use super::anthropic::DEFAULT_ANTHROPIC_BASE_URL;
use super::google::DEFAULT_GOOGLE_BASE_URL;
use super::http_client::HttpClient;
use super::openai::DEFAULT_OPENAI_BASE_URL;
use super::{AnthropicChatClient, GoogleChatClient, OpenAiChatClient};
use crate::domain::{ChatClient, ChatClientFactory, DomainError, Provider};

/// Upstream base URLs, one per provider
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoints {
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub google_base_url: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            google_base_url: DEFAULT_GOOGLE_BASE_URL.to_string(),
        }
    }
}

/// Builds reqwest-backed chat clients sharing one connection pool
#[derive(Debug, Clone)]
pub struct HttpChatClientFactory {
    endpoints: ProviderEndpoints,
    client: reqwest::Client,
}

impl HttpChatClientFactory {
    pub fn new(endpoints: ProviderEndpoints) -> Self {
        Self {
            endpoints,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoints(&self) -> &ProviderEndpoints {
        &self.endpoints
    }
}

impl Default for HttpChatClientFactory {
    fn default() -> Self {
        Self::new(ProviderEndpoints::default())
    }
}

impl ChatClientFactory for HttpChatClientFactory {
    fn create_client(
        &self,
        provider: &str,
        model: &str,
        credential: &str,
    ) -> Result<Arc<dyn ChatClient>, DomainError> {
        let provider: Provider = provider.parse()?;
        let http_client = HttpClient::with_client(self.client.clone(), provider.as_str());

        let client: Arc<dyn ChatClient> = match provider {
            Provider::OpenAi => Arc::new(OpenAiChatClient::with_base_url(
                http_client,
                model,
                credential,
                &self.endpoints.openai_base_url,
            )),
            Provider::Anthropic => Arc::new(AnthropicChatClient::with_base_url(
                http_client,
                model,
                credential,
                &self.endpoints.anthropic_base_url,
            )),
            Provider::Google => Arc::new(GoogleChatClient::with_base_url(
                http_client,
                model,
                credential,
                &self.endpoints.google_base_url,
            )),
        };

        Ok(client)
    }
}
