use serde::Deserialize;

use crate::infrastructure::llm::ProviderEndpoints;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::services::{
    ConversationSettings, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE,
};

/// Application configuration.
///
/// Layered from `config/default`, `config/local` and `APP__SECTION__KEY`
/// environment variables; every field has a default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub chat: ChatConfig,
    pub providers: ProviderEndpoints,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Generation settings applied to every session
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub system_prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: Some(DEFAULT_TEMPERATURE),
            max_tokens: None,
        }
    }
}

impl From<&ChatConfig> for ConversationSettings {
    fn from(config: &ChatConfig) -> Self {
        Self {
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.chat.temperature, Some(0.7));
        assert!(config.metrics.enabled);
        assert_eq!(config.providers.google_base_url, "https://generativelanguage.googleapis.com");
    }

    #[test]
    fn test_partial_sections_fall_back_to_defaults() {
        let source = config::Config::builder()
            .add_source(config::File::from_str(
                "[server]\nport = 9000\n\n[logging]\nformat = \"json\"\n\n[providers]\nopenai_base_url = \"http://localhost:1234\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let config: AppConfig = source.try_deserialize().unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.providers.openai_base_url, "http://localhost:1234");
        assert_eq!(config.providers.anthropic_base_url, "https://api.anthropic.com");
        assert!(config.chat.system_prompt.starts_with("You are a helpful"));
    }

    #[test]
    fn test_chat_config_into_settings() {
        let chat = ChatConfig {
            system_prompt: "Be terse".to_string(),
            temperature: None,
            max_tokens: Some(256),
        };

        let settings = ConversationSettings::from(&chat);
        assert_eq!(settings.system_prompt, "Be terse");
        assert_eq!(settings.max_tokens, Some(256));
    }
}
