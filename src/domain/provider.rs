//! Provider registry - the static catalogue of supported vendors and models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// A remote LLM vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Google,
}

const OPENAI_MODELS: &[&str] = &[
    "gpt-4.1-2025-04-14",
    "gpt-4-0613",
    "gpt-4.5-preview-2025-02-27",
    "gpt-4-turbo-2024-04-09",
];

const ANTHROPIC_MODELS: &[&str] = &[
    "claude-3-7-sonnet-20250219",
    "claude-3-5-sonnet-20240620",
    "claude-3-5-haiku-20241022",
];

const GOOGLE_MODELS: &[&str] = &[
    "gemini-2.0-flash-lite",
    "gemini-2.0-flash",
    "gemini-2.5-pro-preview-03-25",
];

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Anthropic, Provider::Google];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
        }
    }

    /// Models offered for this provider, in display order.
    ///
    /// Informational only: client construction accepts any model name.
    pub fn models(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => OPENAI_MODELS,
            Self::Anthropic => ANTHROPIC_MODELS,
            Self::Google => GOOGLE_MODELS,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| DomainError::unsupported_provider(s))
    }
}

/// Static lookup over [`Provider`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderRegistry;

impl ProviderRegistry {
    pub fn list_providers(&self) -> &'static [Provider] {
        &Provider::ALL
    }

    pub fn list_models(&self, provider: Provider) -> &'static [&'static str] {
        provider.models()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_providers_order() {
        let providers = ProviderRegistry.list_providers();
        let names: Vec<&str> = providers.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["openai", "anthropic", "google"]);
    }

    #[test]
    fn test_list_models() {
        let models = ProviderRegistry.list_models(Provider::OpenAi);
        assert_eq!(models[0], "gpt-4.1-2025-04-14");
        assert_eq!(models.len(), 4);
        assert_eq!(ProviderRegistry.list_models(Provider::Anthropic).len(), 3);
        assert_eq!(ProviderRegistry.list_models(Provider::Google).len(), 3);
    }

    #[test]
    fn test_parse_provider() {
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!("anthropic".parse::<Provider>().unwrap(), Provider::Anthropic);
        assert_eq!("google".parse::<Provider>().unwrap(), Provider::Google);
    }

    #[test]
    fn test_parse_unknown_provider() {
        let err = "unknown".parse::<Provider>().unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedProvider { .. }));
    }

    #[test]
    fn test_provider_serialization() {
        assert_eq!(serde_json::to_string(&Provider::OpenAi).unwrap(), "\"openai\"");
        assert_eq!(serde_json::to_string(&Provider::Google).unwrap(), "\"google\"");
    }
}
