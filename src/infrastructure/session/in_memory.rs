//! In-memory session repository

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::session::{Session, SessionHandle, SessionId, SessionRepository};
use crate::domain::DomainError;

/// Process-local session table.
///
/// The map lock is only held for lookup and insert; each session carries its
/// own mutex. Sessions live until the process exits.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn get(&self, id: &SessionId) -> Result<Option<SessionHandle>, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).cloned())
    }

    async fn put(&self, session: Session) -> Result<SessionHandle, DomainError> {
        let id = session.id().clone();
        let handle = Arc::new(Mutex::new(session));

        let mut sessions = self.sessions.write().await;
        sessions.insert(id, Arc::clone(&handle));

        Ok(handle)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.sessions.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockChatClient;
    use crate::domain::Provider;
    use tokio_test::assert_ok;

    fn session(id: &str, prompt: &str) -> Session {
        let client = Arc::new(MockChatClient::new(Provider::OpenAi, "gpt-4"));
        Session::new(SessionId::new(id).unwrap(), client, prompt)
    }

    #[tokio::test]
    async fn test_get_missing() {
        let repo = InMemorySessionRepository::new();
        let id = SessionId::new("ghost").unwrap();

        assert!(assert_ok!(repo.get(&id).await).is_none());
        assert_eq!(assert_ok!(repo.count().await), 0);
    }

    #[tokio::test]
    async fn test_put_and_get_share_handle() {
        let repo = InMemorySessionRepository::new();
        let handle = assert_ok!(repo.put(session("s1", "sys")).await);

        handle.lock().await.add_user_message("hello");

        let id = SessionId::new("s1").unwrap();
        let fetched = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.lock().await.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_put_replaces_existing() {
        let repo = InMemorySessionRepository::new();
        let old = repo.put(session("s1", "first")).await.unwrap();
        old.lock().await.add_user_message("hello");

        repo.put(session("s1", "second")).await.unwrap();

        let id = SessionId::new("s1").unwrap();
        let current = repo.get(&id).await.unwrap().unwrap();
        let current = current.lock().await;
        assert_eq!(current.system_prompt(), "second");
        assert_eq!(current.messages().len(), 1);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
