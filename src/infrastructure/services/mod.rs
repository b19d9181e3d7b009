//! Infrastructure services

mod conversation_service;

pub use conversation_service::{
    ConversationService, ConversationServiceTrait, ConversationSettings, SessionSnapshot,
    TextStream, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE,
};
