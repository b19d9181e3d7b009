//! Chat Relay
//!
//! Session-based chat relay between a browser UI and third-party LLM
//! providers (OpenAI, Anthropic, Google), with blocking and streamed replies.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::llm::HttpChatClientFactory;
use infrastructure::services::{ConversationService, ConversationSettings};
use infrastructure::session::InMemorySessionRepository;
use tracing::info;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let factory = HttpChatClientFactory::new(config.providers.clone());
    let sessions = InMemorySessionRepository::new();

    let service = ConversationService::with_settings(
        Arc::new(sessions),
        Arc::new(factory),
        ConversationSettings::from(&config.chat),
    );

    info!(
        openai = %config.providers.openai_base_url,
        anthropic = %config.providers.anthropic_base_url,
        google = %config.providers.google_base_url,
        "Conversation service initialized"
    );

    Ok(AppState::new(Arc::new(service)))
}
