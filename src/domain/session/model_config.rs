use std::fmt;

/// What a session should talk to: provider, model and credential.
///
/// Lives only as long as it takes to build a client.
#[derive(Clone)]
pub struct ModelConfig {
    pub provider: String,
    pub model_name: String,
    pub credential: String,
}

impl ModelConfig {
    pub fn new(
        provider: impl Into<String>,
        model_name: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            model_name: model_name.into(),
            credential: credential.into(),
        }
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("provider", &self.provider)
            .field("model_name", &self.model_name)
            .field("credential", &"[REDACTED]")
            .finish()
    }
}
