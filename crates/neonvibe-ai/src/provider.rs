//! Provider selection: one entry point over both streaming protocols.

use std::time::Duration;

use tracing::{debug, warn};

use crate::{
    AiError, FragmentSource, FragmentStream, GeminiClient, GeminiConfig, Message,
    OpenRouterClient, OpenRouterConfig, ProviderKind,
};

/// Everything needed to open a fragment stream against one provider.
#[derive(Clone)]
pub struct AdapterConfig {
    pub provider: ProviderKind,
    /// `None` or blank means no credential is configured.
    pub api_key: Option<String>,
    /// Empty means the provider's default model.
    pub model: String,
    /// Overrides the provider's public endpoint.
    pub endpoint: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl AdapterConfig {
    pub fn new(provider: ProviderKind, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            provider,
            api_key,
            model: model.into(),
            endpoint: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }

    /// Configured model, or the provider default.
    pub fn effective_model(&self) -> &str {
        let model = self.model.trim();
        if model.is_empty() {
            self.provider.default_model()
        } else {
            model
        }
    }

    fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Build the client for the configured provider.
///
/// A missing or blank key fails with [`AiError::CredentialMissing`] before
/// anything touches the network.
pub fn connect(config: &AdapterConfig) -> Result<Box<dyn FragmentSource>, AiError> {
    let Some(key) = config.credential() else {
        warn!(provider = %config.provider, "No API key configured");
        return Err(AiError::CredentialMissing);
    };
    let model = config.effective_model();

    debug!(provider = %config.provider, model, "Connecting fragment source");

    match config.provider {
        ProviderKind::Gemini => {
            let mut gemini = GeminiConfig::new(key)
                .with_model(model)
                .with_timeouts(config.connect_timeout, config.request_timeout);
            if let Some(endpoint) = &config.endpoint {
                gemini = gemini.with_endpoint(endpoint.as_str());
            }
            Ok(Box::new(GeminiClient::new(gemini)?))
        }
        ProviderKind::OpenRouter => {
            let mut openrouter = OpenRouterConfig::new(key)
                .with_model(model)
                .with_timeouts(config.connect_timeout, config.request_timeout);
            if let Some(endpoint) = &config.endpoint {
                openrouter = openrouter.with_endpoint(endpoint.as_str());
            }
            Ok(Box::new(OpenRouterClient::new(openrouter)?))
        }
    }
}

/// Start a generation against the configured provider.
///
/// `history` is the full conversation, oldest first, ending with the
/// newest user message.
pub async fn stream_generation(
    history: &[Message],
    config: &AdapterConfig,
) -> Result<FragmentStream, AiError> {
    let source = connect(config)?;
    source.stream(history).await
}

pub(crate) fn build_http_client(
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<reqwest::Client, AiError> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|e| AiError::Transport(format!("failed to build HTTP client: {e}")))
}
