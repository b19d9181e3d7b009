//! POST transport shared by the provider clients

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;
use tracing::warn;

use crate::domain::DomainError;

/// Raw response body chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, DomainError>> + Send>>;

/// JSON-over-HTTPS calls to a provider; mocked in unit tests
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &Value,
    ) -> Result<Value, DomainError>;

    /// Same request, but the body is handed back unread for incremental decoding
    async fn post_json_stream(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &Value,
    ) -> Result<ByteStream, DomainError>;
}

/// reqwest-backed transport, tagged with the provider name for error reporting
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    provider: &'static str,
}

impl HttpClient {
    pub fn new(provider: &'static str) -> Self {
        Self::with_client(reqwest::Client::new(), provider)
    }

    /// Share a connection pool across clients
    pub fn with_client(inner: reqwest::Client, provider: &'static str) -> Self {
        Self { inner, provider }
    }

    fn failure(&self, message: impl Into<String>) -> DomainError {
        DomainError::provider(self.provider, message)
    }

    async fn dispatch(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &Value,
    ) -> Result<reqwest::Response, DomainError> {
        let request = headers
            .into_iter()
            .fold(self.inner.post(url).json(body), |request, (name, value)| {
                request.header(name, value)
            });

        let response = request
            .send()
            .await
            .map_err(|e| self.failure(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        warn!(provider = self.provider, %status, "Upstream rejected request");

        Err(self.failure(format!(
            "HTTP {}: {}",
            status,
            upstream_error_message(&text)
        )))
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &Value,
    ) -> Result<Value, DomainError> {
        self.dispatch(url, headers, body)
            .await?
            .json()
            .await
            .map_err(|e| self.failure(format!("Failed to parse response: {}", e)))
    }

    async fn post_json_stream(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &Value,
    ) -> Result<ByteStream, DomainError> {
        let response = self.dispatch(url, headers, body).await?;
        let provider = self.provider;

        Ok(Box::pin(response.bytes_stream().map(move |chunk| {
            chunk.map_err(|e| DomainError::provider(provider, format!("Stream error: {}", e)))
        })))
    }
}

/// All three vendors wrap failures as `{"error": {"message": ...}}`
fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use futures::stream;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    enum Reply {
        Json(Value),
        Events(Vec<Bytes>),
        Fail(String),
    }

    /// Canned replies keyed by URL; records every request body
    #[derive(Debug, Default)]
    pub struct MockHttpClient {
        replies: HashMap<String, Reply>,
        bodies: Mutex<Vec<Value>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(mut self, url: impl Into<String>, response: Value) -> Self {
            self.replies.insert(url.into(), Reply::Json(response));
            self
        }

        pub fn with_stream_response(mut self, url: impl Into<String>, chunks: Vec<Bytes>) -> Self {
            self.replies.insert(url.into(), Reply::Events(chunks));
            self
        }

        pub fn with_error(mut self, url: impl Into<String>, error: impl Into<String>) -> Self {
            self.replies.insert(url.into(), Reply::Fail(error.into()));
            self
        }

        pub fn bodies(&self) -> Vec<Value> {
            self.bodies.lock().unwrap().clone()
        }

        fn reply(&self, url: &str, body: &Value) -> Result<Reply, DomainError> {
            self.bodies.lock().unwrap().push(body.clone());

            match self.replies.get(url) {
                Some(Reply::Fail(message)) => Err(DomainError::provider("mock", message)),
                Some(reply) => Ok(reply.clone()),
                None => Err(DomainError::provider("mock", format!("No mock for {}", url))),
            }
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn post_json(
            &self,
            url: &str,
            _headers: Vec<(&str, &str)>,
            body: &Value,
        ) -> Result<Value, DomainError> {
            match self.reply(url, body)? {
                Reply::Json(value) => Ok(value),
                _ => Err(DomainError::provider("mock", "not a JSON reply")),
            }
        }

        async fn post_json_stream(
            &self,
            url: &str,
            _headers: Vec<(&str, &str)>,
            body: &Value,
        ) -> Result<ByteStream, DomainError> {
            match self.reply(url, body)? {
                Reply::Events(chunks) => Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok)))),
                _ => Err(DomainError::provider("mock", "not a stream reply")),
            }
        }
    }
}
