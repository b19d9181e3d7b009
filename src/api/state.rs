//! Application state for shared services

use std::sync::Arc;

use crate::domain::ProviderRegistry;
use crate::infrastructure::services::ConversationServiceTrait;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub conversation_service: Arc<dyn ConversationServiceTrait>,
    pub registry: ProviderRegistry,
}

impl AppState {
    pub fn new(conversation_service: Arc<dyn ConversationServiceTrait>) -> Self {
        Self {
            conversation_service,
            registry: ProviderRegistry,
        }
    }
}
