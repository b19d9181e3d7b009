//! Domain layer - Core entities and traits

pub mod error;
pub mod llm;
pub mod provider;
pub mod session;

pub use error::DomainError;
pub use llm::{
    ChatClient, ChatClientFactory, FinishReason, LlmRequest, LlmRequestBuilder, LlmResponse,
    LlmStream, Message, MessageRole, StreamChunk, Usage,
};
pub use provider::{Provider, ProviderRegistry};
pub use session::{ModelConfig, Session, SessionHandle, SessionId, SessionRepository};
