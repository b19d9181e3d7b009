//! LLM client domain models and traits

mod client;
mod message;
mod request;
mod response;

pub use client::{ChatClient, ChatClientFactory, LlmStream};
pub use message::{Message, MessageRole};
pub use request::{LlmRequest, LlmRequestBuilder};
pub use response::{FinishReason, LlmResponse, StreamChunk, Usage};

#[cfg(test)]
pub use client::MockChatClientFactory;
#[cfg(test)]
pub use client::mock::MockChatClient;
