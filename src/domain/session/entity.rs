//! Session entity

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::llm::{ChatClient, LlmRequest, Message, MessageRole};
use crate::domain::DomainError;

const MAX_SESSION_ID_LENGTH: usize = 256;

/// Client-generated session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(DomainError::validation("session_id cannot be empty"));
        }

        if id.chars().count() > MAX_SESSION_ID_LENGTH {
            return Err(DomainError::validation(format!(
                "session_id cannot exceed {} characters",
                MAX_SESSION_ID_LENGTH
            )));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One conversation: ordered history plus the client that answers it.
///
/// The history always starts with exactly one system message.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    client: Arc<dyn ChatClient>,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId, client: Arc<dyn ChatClient>, system_prompt: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id,
            client,
            messages: vec![Message::system(system_prompt)],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn client(&self) -> Arc<dyn ChatClient> {
        Arc::clone(&self.client)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn system_prompt(&self) -> &str {
        self.messages[0].content_text()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.push(Message::user(content));
    }

    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.push(Message::assistant(content));
    }

    /// Drops a trailing user message left behind by a failed or cancelled generation
    pub fn discard_pending_user_message(&mut self) -> bool {
        match self.messages.last() {
            Some(last) if last.role == MessageRole::User => {
                self.messages.pop();
                self.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    /// Back to the system prompt only
    pub fn reset(&mut self) {
        self.messages.truncate(1);
        self.updated_at = Utc::now();
    }

    /// Provider request carrying the full history
    pub fn to_request(&self, temperature: Option<f32>, max_tokens: Option<u32>) -> LlmRequest {
        LlmRequest {
            messages: self.messages.clone(),
            temperature,
            max_tokens,
        }
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockChatClient;
    use crate::domain::Provider;
    use tokio_test::{assert_err, assert_ok};

    fn session() -> Session {
        let client = Arc::new(MockChatClient::new(Provider::OpenAi, "gpt-4"));
        Session::new(SessionId::new("s1").unwrap(), client, "Be helpful")
    }

    #[test]
    fn test_session_id_validation() {
        assert_ok!(SessionId::new("abc"));
        assert_ok!(SessionId::new("x".repeat(256)));

        assert_err!(SessionId::new(""));
        assert_err!(SessionId::new("   "));
        let err = assert_err!(SessionId::new("x".repeat(257)));
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn test_session_id_limit_counts_characters() {
        assert_ok!(SessionId::new("é".repeat(256)));
        assert_err!(SessionId::new("é".repeat(257)));
    }

    #[test]
    fn test_new_session_has_single_system_message() {
        let session = session();

        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, MessageRole::System);
        assert_eq!(session.system_prompt(), "Be helpful");
    }

    #[test]
    fn test_reset_keeps_system_message() {
        let mut session = session();
        session.add_user_message("hello");
        session.add_assistant_message("hi");

        session.reset();

        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.system_prompt(), "Be helpful");
    }

    #[test]
    fn test_discard_pending_user_message() {
        let mut session = session();
        session.add_user_message("hello");

        assert!(session.discard_pending_user_message());
        assert_eq!(session.messages().len(), 1);
        // never removes the system message
        assert!(!session.discard_pending_user_message());
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_to_request_carries_history_and_settings() {
        let mut session = session();
        session.add_user_message("hello");

        let request = session.to_request(Some(0.7), None);

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.max_tokens, None);
    }
}
