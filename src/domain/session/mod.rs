//! Conversation sessions

mod entity;
mod model_config;
mod repository;

pub use entity::{Session, SessionId};
pub use model_config::ModelConfig;
pub use repository::{SessionHandle, SessionRepository};

#[cfg(test)]
pub use repository::MockSessionRepository;
