//! Conversation service - session lifecycle and message exchange

use std::fmt::Debug;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, OwnedMutexGuard};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, instrument, warn};

use crate::domain::{
    ChatClient, ChatClientFactory, DomainError, LlmStream, Message, ModelConfig, Provider,
    Session, SessionHandle, SessionId, SessionRepository,
};
use crate::infrastructure::observability::{
    record_llm_request, record_session_configured, CallOutcome, ProviderCall,
};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful, friendly AI assistant. Answer the user's questions to the best of your ability.";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const STREAM_CHANNEL_CAPACITY: usize = 32;

/// Incremental response text
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, DomainError>> + Send>>;

/// Generation parameters shared by every session
#[derive(Debug, Clone)]
pub struct ConversationSettings {
    pub system_prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: Some(DEFAULT_TEMPERATURE),
            max_tokens: None,
        }
    }
}

/// Point-in-time copy of a session
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub provider: Provider,
    pub model: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trait for the conversation service (for dynamic dispatch in AppState)
#[async_trait]
pub trait ConversationServiceTrait: Send + Sync + Debug {
    /// Build a client and start the session over with only the system prompt
    async fn configure(&self, session_id: &str, config: ModelConfig) -> Result<(), DomainError>;

    async fn add_user_message(&self, session_id: &str, text: &str) -> Result<(), DomainError>;

    /// Generate a full reply to the current history and record it
    async fn generate(&self, session_id: &str) -> Result<String, DomainError>;

    /// Generate a reply as chunks; it is recorded once the stream is exhausted
    async fn generate_stream(&self, session_id: &str) -> Result<TextStream, DomainError>;

    async fn reset(&self, session_id: &str) -> Result<(), DomainError>;

    async fn history(&self, session_id: &str) -> Result<SessionSnapshot, DomainError>;

    /// Number of live sessions
    async fn session_count(&self) -> Result<usize, DomainError>;

    /// Append a user message and generate under one session lock.
    ///
    /// On failure the user message is removed again.
    async fn send_message(&self, session_id: &str, text: &str) -> Result<String, DomainError>;

    /// Streaming form of [`ConversationServiceTrait::send_message`]
    async fn send_message_stream(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<TextStream, DomainError>;
}

/// Conversation service implementation
pub struct ConversationService {
    sessions: Arc<dyn SessionRepository>,
    factory: Arc<dyn ChatClientFactory>,
    settings: ConversationSettings,
}

impl Debug for ConversationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ConversationService {
    pub fn new(sessions: Arc<dyn SessionRepository>, factory: Arc<dyn ChatClientFactory>) -> Self {
        Self::with_settings(sessions, factory, ConversationSettings::default())
    }

    pub fn with_settings(
        sessions: Arc<dyn SessionRepository>,
        factory: Arc<dyn ChatClientFactory>,
        settings: ConversationSettings,
    ) -> Self {
        Self {
            sessions,
            factory,
            settings,
        }
    }

    async fn session(&self, session_id: &str) -> Result<SessionHandle, DomainError> {
        let id = SessionId::new(session_id)?;

        self.sessions
            .get(&id)
            .await?
            .ok_or_else(|| DomainError::session_not_configured(session_id))
    }

    async fn generate_locked(
        &self,
        session: &mut Session,
        rollback_on_failure: bool,
    ) -> Result<String, DomainError> {
        let client = session.client();
        let request = session.to_request(self.settings.temperature, self.settings.max_tokens);

        let started = Instant::now();
        let result = client.chat(request).await;
        let outcome = if result.is_ok() {
            CallOutcome::Success
        } else {
            CallOutcome::Error
        };
        record(&*client, "blocking", started, outcome);

        match result {
            Ok(response) => {
                let text = response.content().to_string();
                session.add_assistant_message(text.clone());
                debug!(
                    session_id = %session.id(),
                    chars = text.len(),
                    finish_reason = ?response.finish_reason,
                    total_tokens = response.usage.map(|u| u.total_tokens),
                    "Recorded assistant reply"
                );
                Ok(text)
            }
            Err(e) => {
                warn!(session_id = %session.id(), error = %e, "Generation failed");
                if rollback_on_failure {
                    session.discard_pending_user_message();
                }
                Err(e)
            }
        }
    }

    async fn stream_locked(
        &self,
        mut session: OwnedMutexGuard<Session>,
        rollback_on_failure: bool,
    ) -> Result<TextStream, DomainError> {
        let client = session.client();
        let request = session.to_request(self.settings.temperature, self.settings.max_tokens);

        let started = Instant::now();
        let upstream = match client.chat_stream(request).await {
            Ok(upstream) => upstream,
            Err(e) => {
                record(&*client, "stream", started, CallOutcome::Error);
                warn!(session_id = %session.id(), error = %e, "Failed to open stream");
                if rollback_on_failure {
                    session.discard_pending_user_message();
                }
                return Err(e);
            }
        };

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let (outcome, text) = forward_chunks(upstream, &tx).await;
            record(&*client, "stream", started, outcome);

            match outcome {
                CallOutcome::Success => {
                    debug!(session_id = %session.id(), chars = text.len(), "Recorded streamed reply");
                    session.add_assistant_message(text);
                }
                CallOutcome::Error | CallOutcome::Cancelled => {
                    if outcome == CallOutcome::Cancelled {
                        info!(session_id = %session.id(), "Stream cancelled by client");
                    }
                    if rollback_on_failure {
                        session.discard_pending_user_message();
                    }
                }
            }

            // the session lock is released before the receiver sees the end of stream
            drop(session);
            drop(tx);
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

async fn forward_chunks(
    mut upstream: LlmStream,
    tx: &mpsc::Sender<Result<String, DomainError>>,
) -> (CallOutcome, String) {
    let mut text = String::new();

    while let Some(item) = upstream.next().await {
        match item {
            Ok(chunk) => {
                let Some(delta) = chunk.text() else {
                    continue;
                };

                text.push_str(delta);

                if tx.send(Ok(delta.to_string())).await.is_err() {
                    return (CallOutcome::Cancelled, text);
                }
            }
            Err(e) => {
                warn!(error = %e, "Stream failed");
                let _ = tx.send(Err(e)).await;
                return (CallOutcome::Error, text);
            }
        }
    }

    // a reply counts only once the consumer has drained every buffered chunk
    if tx.reserve_many(tx.max_capacity()).await.is_err() {
        return (CallOutcome::Cancelled, text);
    }

    (CallOutcome::Success, text)
}

fn record(client: &dyn ChatClient, mode: &'static str, started: Instant, outcome: CallOutcome) {
    record_llm_request(ProviderCall {
        provider: client.provider().as_str(),
        model: client.model(),
        mode,
        outcome,
        duration: started.elapsed(),
    });
}

#[async_trait]
impl ConversationServiceTrait for ConversationService {
    #[instrument(skip(self, config), fields(provider = %config.provider, model = %config.model_name))]
    async fn configure(&self, session_id: &str, config: ModelConfig) -> Result<(), DomainError> {
        let id = SessionId::new(session_id)?;

        let client = self
            .factory
            .create_client(&config.provider, &config.model_name, &config.credential)
            .map_err(|e| DomainError::invalid_configuration(e.to_string()))?;

        let session = Session::new(id, client, self.settings.system_prompt.clone());
        self.sessions.put(session).await?;

        record_session_configured(&config.provider);
        info!(session_id, "Session configured");

        Ok(())
    }

    async fn add_user_message(&self, session_id: &str, text: &str) -> Result<(), DomainError> {
        let handle = self.session(session_id).await?;
        handle.lock().await.add_user_message(text);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn generate(&self, session_id: &str) -> Result<String, DomainError> {
        let handle = self.session(session_id).await?;
        let mut session = handle.lock().await;

        self.generate_locked(&mut session, false).await
    }

    #[instrument(skip(self))]
    async fn generate_stream(&self, session_id: &str) -> Result<TextStream, DomainError> {
        let handle = self.session(session_id).await?;
        let session = handle.lock_owned().await;

        self.stream_locked(session, false).await
    }

    async fn reset(&self, session_id: &str) -> Result<(), DomainError> {
        let handle = self.session(session_id).await?;
        handle.lock().await.reset();

        info!(session_id, "Conversation reset");
        Ok(())
    }

    async fn history(&self, session_id: &str) -> Result<SessionSnapshot, DomainError> {
        let handle = self.session(session_id).await?;
        let session = handle.lock().await;
        let client = session.client();

        Ok(SessionSnapshot {
            session_id: session.id().to_string(),
            provider: client.provider(),
            model: client.model().to_string(),
            messages: session.messages().to_vec(),
            created_at: session.created_at(),
            updated_at: session.updated_at(),
        })
    }

    async fn session_count(&self) -> Result<usize, DomainError> {
        self.sessions.count().await
    }

    #[instrument(skip(self, text))]
    async fn send_message(&self, session_id: &str, text: &str) -> Result<String, DomainError> {
        let handle = self.session(session_id).await?;
        let mut session = handle.lock().await;

        session.add_user_message(text);
        self.generate_locked(&mut session, true).await
    }

    #[instrument(skip(self, text))]
    async fn send_message_stream(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<TextStream, DomainError> {
        let handle = self.session(session_id).await?;
        let mut session = handle.lock_owned().await;

        session.add_user_message(text);
        self.stream_locked(session, true).await
    }
}
