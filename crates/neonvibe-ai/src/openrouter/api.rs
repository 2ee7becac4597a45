//! FragmentSource implementation for OpenRouterClient.

use async_trait::async_trait;
use tracing::debug;

use crate::streaming::fragment_stream;
use crate::{AiError, FragmentSource, FragmentStream, Message};

use super::client::{parse_delta, OpenRouterClient};
use super::config::APP_TITLE;

#[async_trait]
impl FragmentSource for OpenRouterClient {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn stream(&self, history: &[Message]) -> Result<FragmentStream, AiError> {
        let body = self.build_request_body(history);

        debug!(model = %self.config.model, messages = history.len(), "OpenRouter streaming request");

        let response = self
            .http
            .post(&self.config.endpoint)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.config.api_key))
            .header("x-title", APP_TITLE)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AiError::Transport(format!("HTTP {status}: {text}")));
        }

        Ok(fragment_stream(response.bytes_stream(), parse_delta))
    }
}
