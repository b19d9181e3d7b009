use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::HttpClientTrait;
use super::sse;
use crate::domain::{
    ChatClient, DomainError, FinishReason, LlmRequest, LlmResponse, LlmStream, Message,
    MessageRole, Provider, StreamChunk, Usage,
};

pub const DEFAULT_GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini generateContent client
#[derive(Debug)]
pub struct GoogleChatClient<C: HttpClientTrait> {
    client: C,
    model: String,
    api_key: String,
    base_url: String,
}

impl<C: HttpClientTrait> GoogleChatClient<C> {
    pub fn new(client: C, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, model, api_key, DEFAULT_GOOGLE_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            model: model.into(),
            api_key: api_key.into(),
            base_url,
        }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }

    fn build_request(&self, request: &LlmRequest) -> serde_json::Value {
        let (system, messages) = request.split_system();

        let contents: Vec<GeminiContent> = messages
            .into_iter()
            .map(GeminiContent::from_domain)
            .collect();

        let mut body = serde_json::json!({ "contents": contents });

        if let Some(system_content) = system {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": system_content }]
            });
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(temp) = request.temperature {
            generation_config.insert("temperature".into(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = request.max_tokens {
            generation_config.insert("maxOutputTokens".into(), serde_json::json!(max_tokens));
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = serde_json::Value::Object(generation_config);
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-goog-api-key", self.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<LlmResponse, DomainError> {
        let response: GeminiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("google", format!("Failed to parse response: {}", e))
        })?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("google", "No candidates in response"))?;

        let message = Message::assistant(candidate.text());
        let id = response.response_id.unwrap_or_default();
        let model = response.model_version.unwrap_or_else(|| self.model.clone());

        let mut llm_response = LlmResponse::new(id, model, message);

        if let Some(reason) = candidate.finish_reason {
            llm_response = llm_response.with_finish_reason(parse_finish_reason(&reason));
        }

        if let Some(usage) = response.usage_metadata {
            llm_response = llm_response.with_usage(Usage::new(
                usage.prompt_token_count,
                usage.candidates_token_count,
            ));
        }

        Ok(llm_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> ChatClient for GoogleChatClient<C> {
    async fn chat(&self, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let url = self.generate_url();
        let body = self.build_request(&request);
        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }

    async fn chat_stream(&self, request: LlmRequest) -> Result<LlmStream, DomainError> {
        let url = self.stream_url();
        let body = self.build_request(&request);
        let byte_stream = self
            .client
            .post_json_stream(&url, self.headers(), &body)
            .await?;

        let model = self.model.clone();
        Ok(sse::parse_events(byte_stream, move |data| parse_stream_data(data, &model)))
    }

    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn parse_stream_data(data: &str, model: &str) -> Option<Result<StreamChunk, DomainError>> {
    let value: serde_json::Value = serde_json::from_str(data).ok()?;

    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown stream error");
        return Some(Err(DomainError::provider("google", message)));
    }

    let response: GeminiResponse = serde_json::from_value(value).ok()?;
    let candidate = response.candidates.into_iter().next()?;

    let mut chunk = StreamChunk::new(model).with_delta(candidate.text());

    if let Some(reason) = candidate.finish_reason {
        chunk = chunk.with_finish_reason(parse_finish_reason(&reason));
    }

    Some(Ok(chunk))
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "MAX_TOKENS" => FinishReason::Length,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => {
            FinishReason::ContentFilter
        }
        _ => FinishReason::Stop,
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn from_domain(message: &Message) -> Self {
        let role = match message.role {
            MessageRole::Assistant => "model",
            MessageRole::User | MessageRole::System => "user",
        };

        Self {
            role,
            parts: vec![GeminiPart {
                text: message.content_text().to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
    response_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

impl GeminiCandidate {
    fn text(&self) -> String {
        self.content
            .as_ref()
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}
