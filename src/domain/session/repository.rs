//! Session repository trait

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Session, SessionId};
use crate::domain::error::DomainError;

#[cfg(test)]
use mockall::automock;

/// Shared handle to one session; the mutex serializes work on that session
pub type SessionHandle = Arc<Mutex<Session>>;

/// Storage for live sessions
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a session by ID
    async fn get(&self, id: &SessionId) -> Result<Option<SessionHandle>, DomainError>;

    /// Stores a session, replacing any previous one with the same ID
    async fn put(&self, session: Session) -> Result<SessionHandle, DomainError>;

    /// Number of stored sessions
    async fn count(&self) -> Result<usize, DomainError>;
}
