//! LLM provider implementations

mod anthropic;
mod factory;
mod google;
mod http_client;
mod openai;
mod sse;

pub use anthropic::AnthropicChatClient;
pub use factory::{HttpChatClientFactory, ProviderEndpoints};
pub use google::GoogleChatClient;
pub use http_client::{ByteStream, HttpClient, HttpClientTrait};
pub use openai::OpenAiChatClient;
pub use sse::SseDecoder;
