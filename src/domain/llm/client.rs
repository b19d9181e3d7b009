use async_trait::async_trait;
use futures::Stream;
use std::fmt::Debug;
use std::pin::Pin;
use std::sync::Arc;

use super::{LlmRequest, LlmResponse, StreamChunk};
use crate::domain::{DomainError, Provider};

/// Stream type for LLM responses
pub type LlmStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, DomainError>> + Send>>;

/// A provider client bound to one model and credential
#[async_trait]
pub trait ChatClient: Send + Sync + Debug {
    /// Generate the full response
    async fn chat(&self, request: LlmRequest) -> Result<LlmResponse, DomainError>;

    /// Generate the response as incremental chunks
    async fn chat_stream(&self, request: LlmRequest) -> Result<LlmStream, DomainError>;

    fn provider(&self) -> Provider;

    fn model(&self) -> &str;
}

/// Builds [`ChatClient`]s from a provider identifier, model name and credential
#[cfg_attr(test, mockall::automock)]
pub trait ChatClientFactory: Send + Sync {
    fn create_client(
        &self,
        provider: &str,
        model: &str,
        credential: &str,
    ) -> Result<Arc<dyn ChatClient>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::llm::{FinishReason, Message};
    use futures::stream;
    use std::sync::Mutex;

    /// Deterministic client replaying a fixed list of chunks
    #[derive(Debug)]
    pub struct MockChatClient {
        provider: Provider,
        model: String,
        chunks: Vec<String>,
        error: Option<String>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    impl MockChatClient {
        pub fn new(provider: Provider, model: impl Into<String>) -> Self {
            Self {
                provider,
                model: model.into(),
                chunks: Vec::new(),
                error: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn with_response(self, text: impl Into<String>) -> Self {
            self.with_chunks(vec![text.into()])
        }

        pub fn with_chunks<S: Into<String>>(mut self, chunks: Vec<S>) -> Self {
            self.chunks = chunks.into_iter().map(Into::into).collect();
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        /// Requests received so far
        pub fn requests(&self) -> Vec<LlmRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn record(&self, request: LlmRequest) -> Result<(), DomainError> {
            self.requests.lock().unwrap().push(request);

            match &self.error {
                Some(error) => Err(DomainError::provider(self.provider.as_str(), error)),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl ChatClient for MockChatClient {
        async fn chat(&self, request: LlmRequest) -> Result<LlmResponse, DomainError> {
            self.record(request)?;

            Ok(LlmResponse::new(
                "mock-response".to_string(),
                self.model.clone(),
                Message::assistant(self.chunks.concat()),
            )
            .with_finish_reason(FinishReason::Stop))
        }

        async fn chat_stream(&self, request: LlmRequest) -> Result<LlmStream, DomainError> {
            self.record(request)?;

            let chunks: Vec<Result<StreamChunk, DomainError>> = self
                .chunks
                .iter()
                .map(|c| Ok(StreamChunk::new(self.model.clone()).with_delta(c.clone())))
                .chain(std::iter::once(Ok(
                    StreamChunk::new(self.model.clone()).with_finish_reason(FinishReason::Stop),
                )))
                .collect();

            Ok(Box::pin(stream::iter(chunks)))
        }

        fn provider(&self) -> Provider {
            self.provider
        }

        fn model(&self) -> &str {
            &self.model
        }
    }
}
