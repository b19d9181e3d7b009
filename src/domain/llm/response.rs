use super::Message;

/// Why the provider stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// A complete, non-streamed reply
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub id: String,
    pub model: String,
    pub message: Message,
    pub finish_reason: Option<FinishReason>,
    pub usage: Option<Usage>,
}

impl LlmResponse {
    pub fn new(id: impl Into<String>, model: impl Into<String>, message: Message) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            message,
            finish_reason: None,
            usage: None,
        }
    }

    pub fn with_finish_reason(self, finish_reason: FinishReason) -> Self {
        Self {
            finish_reason: Some(finish_reason),
            ..self
        }
    }

    pub fn with_usage(self, usage: Usage) -> Self {
        Self {
            usage: Some(usage),
            ..self
        }
    }

    pub fn content(&self) -> &str {
        self.message.content_text()
    }
}

/// One increment of a streamed reply.
///
/// Providers also emit bookkeeping events (role announcements, stop markers)
/// that carry no text; those arrive with `delta` unset.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChunk {
    pub model: String,
    pub delta: Option<String>,
    pub finish_reason: Option<FinishReason>,
}

impl StreamChunk {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            delta: None,
            finish_reason: None,
        }
    }

    pub fn with_delta(self, delta: impl Into<String>) -> Self {
        Self {
            delta: Some(delta.into()),
            ..self
        }
    }

    pub fn with_finish_reason(self, finish_reason: FinishReason) -> Self {
        Self {
            finish_reason: Some(finish_reason),
            ..self
        }
    }

    /// Non-empty text carried by this chunk
    pub fn text(&self) -> Option<&str> {
        self.delta.as_deref().filter(|d| !d.is_empty())
    }
}
