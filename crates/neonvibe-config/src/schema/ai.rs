//! AI provider configuration types.

use std::fmt;

use neonvibe_common::ProviderKind;
use serde::{Deserialize, Serialize};

/// Base URLs for both providers. Overridable for proxies and tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Gemini models collection; `/{model}:streamGenerateContent` is appended.
    pub gemini: String,
    /// OpenRouter chat completions endpoint, used as-is.
    pub openrouter: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            gemini: "https://generativelanguage.googleapis.com/v1beta/models".into(),
            openrouter: "https://openrouter.ai/api/v1/chat/completions".into(),
        }
    }
}

/// HTTP client timeouts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// Valid range: 1-3600.
    pub connect_timeout_secs: u32,
    /// Whole-request timeout, streaming included. Valid range: 1-3600.
    pub request_timeout_secs: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 300,
        }
    }
}

/// `[ai]` section: which provider, which key, which model.
#[derive(Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AiConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    /// Empty means the provider's default model.
    pub model: String,
    pub endpoints: EndpointsConfig,
    pub http: HttpConfig,
}

impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("endpoints", &self.endpoints)
            .field("http", &self.http)
            .finish()
    }
}

impl AiConfig {
    /// Configured model, or the provider default when left empty.
    pub fn effective_model(&self) -> &str {
        let model = self.model.trim();
        if model.is_empty() {
            self.provider.default_model()
        } else {
            model
        }
    }

    /// Configured key, falling back to the provider's environment variable.
    ///
    /// Returns `None` when neither is set; callers surface that as a
    /// missing credential rather than failing at load time.
    pub fn resolve_api_key(&self) -> Option<String> {
        let key = self.api_key.trim();
        if !key.is_empty() {
            return Some(key.to_string());
        }
        std::env::var(self.provider.api_key_env())
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Endpoint for the selected provider.
    pub fn endpoint(&self) -> &str {
        match self.provider {
            ProviderKind::Gemini => &self.endpoints.gemini,
            ProviderKind::OpenRouter => &self.endpoints.openrouter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_model_falls_back_per_provider() {
        let mut ai = AiConfig::default();
        assert_eq!(ai.effective_model(), "gemini-2.5-flash");
        ai.provider = ProviderKind::OpenRouter;
        assert_eq!(ai.effective_model(), "anthropic/claude-3.5-sonnet");
        ai.model = "  meta-llama/llama-3-70b ".into();
        assert_eq!(ai.effective_model(), "meta-llama/llama-3-70b");
    }

    #[test]
    fn configured_key_wins_over_environment() {
        let ai = AiConfig {
            api_key: " key-from-file ".into(),
            ..Default::default()
        };
        assert_eq!(ai.resolve_api_key().as_deref(), Some("key-from-file"));
    }

    #[test]
    fn debug_output_redacts_key() {
        let ai = AiConfig {
            api_key: "super-secret".into(),
            ..Default::default()
        };
        let debug = format!("{ai:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn endpoint_follows_provider() {
        let mut ai = AiConfig::default();
        assert!(ai.endpoint().contains("generativelanguage"));
        ai.provider = ProviderKind::OpenRouter;
        assert!(ai.endpoint().contains("openrouter.ai"));
    }
}
