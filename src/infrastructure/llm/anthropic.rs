use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::HttpClientTrait;
use super::sse;
use crate::domain::{
    ChatClient, DomainError, FinishReason, LlmRequest, LlmResponse, LlmStream, Message,
    MessageRole, Provider, StreamChunk, Usage,
};

pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic messages API client
///
/// System prompts are lifted out of the transcript into the top-level
/// `system` field; `max_tokens` is mandatory upstream.
#[derive(Debug)]
pub struct AnthropicChatClient<C: HttpClientTrait> {
    client: C,
    model: String,
    api_key: String,
    endpoint: String,
}

impl<C: HttpClientTrait> AnthropicChatClient<C> {
    pub fn new(client: C, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, model, api_key, DEFAULT_ANTHROPIC_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();

        Self {
            client,
            model: model.into(),
            api_key: api_key.into(),
            endpoint: format!("{}/v1/messages", base_url.trim_end_matches('/')),
        }
    }

    fn body(&self, request: &LlmRequest, stream: bool) -> Result<serde_json::Value, DomainError> {
        let (system, messages) = request.split_system();

        let body = MessagesRequest {
            model: &self.model,
            messages: messages.into_iter().map(WireMessage::from).collect(),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            stream,
            system,
            temperature: request.temperature,
        };

        serde_json::to_value(body)
            .map_err(|e| DomainError::internal(format!("Failed to encode request: {}", e)))
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-api-key", self.api_key.as_str()),
            ("anthropic-version", ANTHROPIC_VERSION),
            ("Content-Type", "application/json"),
        ]
    }
}

#[async_trait]
impl<C: HttpClientTrait> ChatClient for AnthropicChatClient<C> {
    async fn chat(&self, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let body = self.body(&request, false)?;
        let json = self
            .client
            .post_json(&self.endpoint, self.headers(), &body)
            .await?;

        let reply: MessagesResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("anthropic", format!("Failed to parse response: {}", e))
        })?;

        Ok(reply.into_response())
    }

    async fn chat_stream(&self, request: LlmRequest) -> Result<LlmStream, DomainError> {
        let body = self.body(&request, true)?;
        let byte_stream = self
            .client
            .post_json_stream(&self.endpoint, self.headers(), &body)
            .await?;

        let model = self.model.clone();
        Ok(sse::parse_events(byte_stream, move |data| parse_stream_event(data, &model)))
    }

    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn parse_stream_event(data: &str, model: &str) -> Option<Result<StreamChunk, DomainError>> {
    let event: StreamEvent = serde_json::from_str(data).ok()?;

    match event {
        StreamEvent::ContentBlockDelta { delta } => match delta {
            BlockDelta::TextDelta { text } => Some(Ok(StreamChunk::new(model).with_delta(text))),
            BlockDelta::Other => None,
        },
        StreamEvent::MessageDelta { delta } => {
            let reason = stop_reason(delta.stop_reason.as_deref()?);
            Some(Ok(StreamChunk::new(model).with_finish_reason(reason)))
        }
        StreamEvent::MessageStop => Some(Ok(
            StreamChunk::new(model).with_finish_reason(FinishReason::Stop)
        )),
        StreamEvent::Error { error } => Some(Err(DomainError::provider("anthropic", error.message))),
        StreamEvent::Other => None,
    }
}

fn stop_reason(reason: &str) -> FinishReason {
    match reason {
        "max_tokens" => FinishReason::Length,
        _ => FinishReason::Stop,
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(message: &'a Message) -> Self {
        let role = match message.role {
            MessageRole::Assistant => "assistant",
            MessageRole::User | MessageRole::System => "user",
        };

        Self {
            role,
            content: message.content_text(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    id: String,
    model: String,
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: MessagesUsage,
}

impl MessagesResponse {
    fn into_response(self) -> LlmResponse {
        let text: String = self
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();

        let reason = self.stop_reason.as_deref().map_or(FinishReason::Stop, stop_reason);

        LlmResponse::new(self.id, self.model, Message::assistant(text))
            .with_finish_reason(reason)
            .with_usage(Usage::new(self.usage.input_tokens, self.usage.output_tokens))
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockDelta {
        delta: BlockDelta,
    },
    MessageDelta {
        delta: MessageDeltaBody,
    },
    MessageStop,
    Error {
        error: StreamError,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum BlockDelta {
    TextDelta {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessageDeltaBody {
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use bytes::Bytes;
    use futures::StreamExt;

    const TEST_URL: &str = "https://api.anthropic.com/v1/messages";
    const MODEL: &str = "claude-3-5-haiku-20241022";

    fn mock_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "model": MODEL,
            "content": [{"type": "text", "text": text}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 10}
        })
    }

    #[tokio::test]
    async fn test_anthropic_chat() {
        let client = MockHttpClient::new().with_response(TEST_URL, mock_response("Hello!"));
        let chat_client = AnthropicChatClient::new(client, MODEL, "test-api-key");

        let request = LlmRequest::builder()
            .system("You are helpful")
            .user("Hello!")
            .build();

        let response = chat_client.chat(request).await.unwrap();

        assert_eq!(response.id, "msg_123");
        assert_eq!(response.content(), "Hello!");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().total_tokens, 22);
    }

    #[tokio::test]
    async fn test_anthropic_system_message_handling() {
        let client = MockHttpClient::new().with_response(TEST_URL, mock_response("Response"));
        let chat_client = AnthropicChatClient::new(client, MODEL, "test-key");

        let request = LlmRequest::builder()
            .system("System prompt")
            .user("Hello")
            .assistant("Hi")
            .user("Again")
            .build();

        chat_client.chat(request).await.unwrap();

        let body = &chat_client.client.bodies()[0];
        assert_eq!(body["system"], "System prompt");
        assert_eq!(body["max_tokens"], DEFAULT_MAX_TOKENS);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
    }

    #[tokio::test]
    async fn test_anthropic_stream() {
        let chunks = vec![
            Bytes::from_static(
                b"event: message_start\ndata: {\"type\":\"message_start\",\"message\":{}}\n\n\
                  event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"a\"}}\n\n",
            ),
            Bytes::from_static(
                b"event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"b\"}}\n\n\
                  event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
            ),
        ];
        let client = MockHttpClient::new().with_stream_response(TEST_URL, chunks);
        let chat_client = AnthropicChatClient::new(client, MODEL, "key");

        let stream = chat_client
            .chat_stream(LlmRequest::builder().user("Hi").build())
            .await
            .unwrap();
        let chunks: Vec<StreamChunk> = stream.map(|c| c.unwrap()).collect().await;

        let text: String = chunks.iter().filter_map(|c| c.text()).collect();
        assert_eq!(text, "ab");
        assert_eq!(
            chunks.last().unwrap().finish_reason,
            Some(FinishReason::Stop)
        );
    }

    #[tokio::test]
    async fn test_anthropic_stream_error_event() {
        let chunks = vec![Bytes::from_static(
            b"event: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n",
        )];
        let client = MockHttpClient::new().with_stream_response(TEST_URL, chunks);
        let chat_client = AnthropicChatClient::new(client, MODEL, "key");

        let mut stream = chat_client
            .chat_stream(LlmRequest::builder().user("Hi").build())
            .await
            .unwrap();

        let first = stream.next().await.unwrap();
        assert!(first.unwrap_err().to_string().contains("Overloaded"));
    }
}
