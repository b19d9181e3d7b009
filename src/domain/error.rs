use thiserror::Error;

/// Failures surfaced by the conversation core
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unsupported provider: {provider}")]
    UnsupportedProvider { provider: String },

    #[error("Session not configured. Please configure a model first.")]
    SessionNotConfigured { session_id: String },

    #[error("Error configuring model: {message}")]
    InvalidConfiguration { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn unsupported_provider(provider: impl Into<String>) -> Self {
        Self::UnsupportedProvider {
            provider: provider.into(),
        }
    }

    pub fn session_not_configured(session_id: impl Into<String>) -> Self {
        Self::SessionNotConfigured {
            session_id: session_id.into(),
        }
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_provider_error() {
        let error = DomainError::unsupported_provider("unknown");
        assert_eq!(error.to_string(), "Unsupported provider: unknown");
    }

    #[test]
    fn test_session_not_configured_mentions_configuration() {
        let error = DomainError::session_not_configured("ghost");
        assert!(error.to_string().contains("configure a model first"));
    }

    #[test]
    fn test_invalid_configuration_error() {
        let error = DomainError::invalid_configuration("Unsupported provider: unknown");
        assert_eq!(
            error.to_string(),
            "Error configuring model: Unsupported provider: unknown"
        );
    }

    #[test]
    fn test_provider_error() {
        let error = DomainError::provider("openai", "HTTP 401");
        assert_eq!(error.to_string(), "Provider error: openai - HTTP 401");
    }
}
