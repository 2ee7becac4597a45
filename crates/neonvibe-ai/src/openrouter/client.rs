//! OpenRouter client struct, request building and delta parsing.

use crate::prompt::SYSTEM_PROMPT;
use crate::provider::build_http_client;
use crate::{AiError, Message, Role};

use super::config::OpenRouterConfig;

/// OpenRouter streaming client.
pub struct OpenRouterClient {
    pub(crate) config: OpenRouterConfig,
    pub(crate) http: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(config: OpenRouterConfig) -> Result<Self, AiError> {
        let http = build_http_client(config.connect_timeout, config.request_timeout)?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }

    /// Build the chat completions body: system prompt first, then history
    /// with `model` turns renamed to `assistant`.
    pub(crate) fn build_request_body(&self, history: &[Message]) -> serde_json::Value {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }));
        for msg in history {
            let role = match msg.role {
                Role::User => "user",
                Role::Model => "assistant",
            };
            messages.push(serde_json::json!({ "role": role, "content": msg.content }));
        }

        serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "stream": true,
        })
    }
}

/// Text delta of one chat-completions chunk.
pub(crate) fn parse_delta(chunk: &serde_json::Value) -> Result<Option<String>, AiError> {
    if let Some(error) = chunk.get("error") {
        let message = error["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(AiError::ProviderLogic(message));
    }

    Ok(chunk["choices"][0]["delta"]["content"]
        .as_str()
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_prepends_system_and_renames_model_role() {
        let client = OpenRouterClient::new(OpenRouterConfig::new("k").with_model("openai/gpt-4o"))
            .unwrap();
        let body = client.build_request_body(&[Message::user("hi"), Message::model("hello")]);

        assert_eq!(body["model"], "openai/gpt-4o");
        assert_eq!(body["stream"], true);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], SYSTEM_PROMPT);
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[2]["content"], "hello");
    }

    #[test]
    fn delta_content() {
        let chunk = serde_json::json!({ "choices": [{ "delta": { "content": "Hi" } }] });
        assert_eq!(parse_delta(&chunk).unwrap().as_deref(), Some("Hi"));
    }

    #[test]
    fn role_only_and_finish_chunks_have_no_delta() {
        let role = serde_json::json!({ "choices": [{ "delta": { "role": "assistant" } }] });
        let finish = serde_json::json!({ "choices": [{ "delta": {}, "finish_reason": "stop" }] });
        assert_eq!(parse_delta(&role).unwrap(), None);
        assert_eq!(parse_delta(&finish).unwrap(), None);
    }

    #[test]
    fn in_band_error_is_provider_error() {
        let chunk = serde_json::json!({ "error": { "code": 502, "message": "Provider returned error" } });
        assert!(
            matches!(parse_delta(&chunk), Err(AiError::ProviderLogic(m)) if m == "Provider returned error")
        );
    }
}
