//! Gemini client struct, request building and delta parsing.

use crate::prompt::SYSTEM_PROMPT;
use crate::provider::build_http_client;
use crate::{AiError, Message, Role};

use super::config::GeminiConfig;

/// Gemini streaming client.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        let http = build_http_client(config.connect_timeout, config.request_timeout)?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub(crate) fn stream_url(&self) -> String {
        format!(
            "{}/{}:streamGenerateContent?alt=sse",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Build the JSON request body for `streamGenerateContent`.
    pub(crate) fn build_request_body(&self, history: &[Message]) -> serde_json::Value {
        let contents: Vec<_> = history
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    Role::User => "user",
                    Role::Model => "model",
                };
                serde_json::json!({
                    "role": role,
                    "parts": [{ "text": msg.content }]
                })
            })
            .collect();

        serde_json::json!({
            "contents": contents,
            "systemInstruction": {
                "parts": [{ "text": SYSTEM_PROMPT }]
            }
        })
    }
}

/// Text delta of one Gemini stream event.
///
/// Joins the text parts of the first candidate. A blocked prompt or an
/// in-band error object is a provider error.
pub(crate) fn parse_delta(event: &serde_json::Value) -> Result<Option<String>, AiError> {
    if let Some(error) = event.get("error") {
        let message = error["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(AiError::ProviderLogic(message));
    }
    if let Some(reason) = event["promptFeedback"]["blockReason"].as_str() {
        return Err(AiError::ProviderLogic(format!("prompt blocked: {reason}")));
    }

    let Some(parts) = event["candidates"][0]["content"]["parts"].as_array() else {
        return Ok(None);
    };
    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();
    Ok(Some(text))
}
