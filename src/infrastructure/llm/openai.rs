use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::HttpClientTrait;
use super::sse;
use crate::domain::{
    ChatClient, DomainError, FinishReason, LlmRequest, LlmResponse, LlmStream, Message,
    Provider, StreamChunk, Usage,
};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// OpenAI chat completions client
#[derive(Debug)]
pub struct OpenAiChatClient<C: HttpClientTrait> {
    client: C,
    model: String,
    bearer: String,
    endpoint: String,
}

impl<C: HttpClientTrait> OpenAiChatClient<C> {
    pub fn new(client: C, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, model, api_key, DEFAULT_OPENAI_BASE_URL)
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
            bearer: format!("Bearer {}", api_key.into()),
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
        }
    }

    fn body(&self, request: &LlmRequest, stream: bool) -> Result<serde_json::Value, DomainError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            stream,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        serde_json::to_value(body)
            .map_err(|e| DomainError::internal(format!("Failed to encode request: {}", e)))
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.bearer.as_str()),
            ("Content-Type", "application/json"),
        ]
    }
}

#[async_trait]
impl<C: HttpClientTrait> ChatClient for OpenAiChatClient<C> {
    async fn chat(&self, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let body = self.body(&request, false)?;
        let json = self
            .client
            .post_json(&self.endpoint, self.headers(), &body)
            .await?;

        let completion: Completion = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse response: {}", e))
        })?;

        completion.into_response()
    }

    async fn chat_stream(&self, request: LlmRequest) -> Result<LlmStream, DomainError> {
        let body = self.body(&request, true)?;
        let bytes = self
            .client
            .post_json_stream(&self.endpoint, self.headers(), &body)
            .await?;

        let model = self.model.clone();
        Ok(sse::parse_events(bytes, move |data| {
            parse_stream_data(data, &model)
        }))
    }

    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn parse_stream_data(data: &str, model: &str) -> Option<Result<StreamChunk, DomainError>> {
    if data.trim() == "[DONE]" {
        return Some(Ok(
            StreamChunk::new(model).with_finish_reason(FinishReason::Stop)
        ));
    }

    let value: serde_json::Value = serde_json::from_str(data).ok()?;

    // mid-stream failures arrive as an error object instead of a chunk
    if let Some(message) = value.pointer("/error/message").and_then(|m| m.as_str()) {
        return Some(Err(DomainError::provider("openai", message)));
    }

    let delta: CompletionDelta = serde_json::from_value(value).ok()?;
    let choice = delta.choices.into_iter().next()?;

    let mut chunk = StreamChunk::new(delta.model.as_deref().unwrap_or(model));
    if let Some(content) = choice.delta.content {
        chunk = chunk.with_delta(content);
    }
    if let Some(reason) = choice.finish_reason.as_deref() {
        chunk = chunk.with_finish_reason(finish_reason(reason));
    }

    Some(Ok(chunk))
}

fn finish_reason(reason: &str) -> FinishReason {
    match reason {
        "length" => FinishReason::Length,
        "content_filter" => FinishReason::ContentFilter,
        _ => FinishReason::Stop,
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            role: message.role.as_str(),
            content: message.content_text(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Completion {
    id: String,
    model: String,
    choices: Vec<CompletionChoice>,
    usage: Option<CompletionUsage>,
}

impl Completion {
    fn into_response(self) -> Result<LlmResponse, DomainError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("openai", "No choices in response"))?;

        let message = Message::assistant(choice.message.content.unwrap_or_default());
        let mut response = LlmResponse::new(self.id, self.model, message);

        if let Some(reason) = choice.finish_reason.as_deref() {
            response = response.with_finish_reason(finish_reason(reason));
        }
        if let Some(usage) = self.usage {
            response = response.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
        }

        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionDelta {
    model: Option<String>,
    #[serde(default)]
    choices: Vec<DeltaChoice>,
}

#[derive(Debug, Deserialize)]
struct DeltaChoice {
    delta: DeltaContent,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeltaContent {
    content: Option<String>,
}
