use super::{Message, MessageRole};

/// One generation call: the full transcript plus sampling settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn builder() -> LlmRequestBuilder {
        LlmRequestBuilder::default()
    }

    /// System content joined by newlines, and the remaining turns in order.
    ///
    /// Anthropic and Google carry the system prompt outside the turn list.
    pub fn split_system(&self) -> (Option<String>, Vec<&Message>) {
        let (system, turns): (Vec<&Message>, Vec<&Message>) = self
            .messages
            .iter()
            .partition(|m| m.role == MessageRole::System);

        let system = system
            .iter()
            .map(|m| m.content_text())
            .collect::<Vec<_>>()
            .join("\n");

        ((!system.is_empty()).then_some(system), turns)
    }
}

#[derive(Debug, Default)]
pub struct LlmRequestBuilder {
    request: LlmRequest,
}

impl LlmRequestBuilder {
    pub fn message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    pub fn system(self, content: impl Into<String>) -> Self {
        self.message(Message::system(content))
    }

    pub fn user(self, content: impl Into<String>) -> Self {
        self.message(Message::user(content))
    }

    pub fn assistant(self, content: impl Into<String>) -> Self {
        self.message(Message::assistant(content))
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.request.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.request.max_tokens = Some(max_tokens);
        self
    }

    pub fn build(self) -> LlmRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_turn_order() {
        let request = LlmRequest::builder()
            .system("You are a helpful assistant")
            .user("Hello!")
            .assistant("Hi")
            .max_tokens(100)
            .build();

        let roles: Vec<MessageRole> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::System, MessageRole::User, MessageRole::Assistant]
        );
        assert_eq!(request.temperature, None);
        assert_eq!(request.max_tokens, Some(100));
    }

    #[test]
    fn test_split_system_joins_system_messages() {
        let request = LlmRequest::builder()
            .system("Be brief")
            .user("Hello")
            .system("Answer in French")
            .assistant("Bonjour")
            .build();

        let (system, turns) = request.split_system();

        assert_eq!(system.as_deref(), Some("Be brief\nAnswer in French"));
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, MessageRole::User);
        assert_eq!(turns[1].content_text(), "Bonjour");
    }

    #[test]
    fn test_split_system_without_system_content() {
        let request = LlmRequest::new(vec![Message::system(""), Message::user("Hello")]);
        let (system, turns) = request.split_system();

        assert!(system.is_none());
        assert_eq!(turns.len(), 1);
    }
}
