//! FragmentSource implementation for GeminiClient.

use async_trait::async_trait;
use tracing::debug;

use crate::streaming::fragment_stream;
use crate::{AiError, FragmentSource, FragmentStream, Message};

use super::client::{parse_delta, GeminiClient};

#[async_trait]
impl FragmentSource for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn stream(&self, history: &[Message]) -> Result<FragmentStream, AiError> {
        let body = self.build_request_body(history);
        let url = self.stream_url();

        debug!(model = %self.config.model, messages = history.len(), "Gemini streaming request");

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
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

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::GeminiConfig;

    fn sse(events: &[serde_json::Value]) -> String {
        events
            .iter()
            .map(|e| format!("data: {e}\r\n\r\n"))
            .collect()
    }

    fn text_event(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
    }

    fn client_for(server: &MockServer) -> GeminiClient {
        let config = GeminiConfig::new("test-key")
            .with_model("gemini-test")
            .with_endpoint(format!("{}/v1beta/models", server.uri()));
        GeminiClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn streams_text_deltas_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{ "role": "user", "parts": [{ "text": "build a clock" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                sse(&[text_event("Sure! "), text_event("<file name=\"index.html\">")]),
                "text/event-stream",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let stream = client
            .stream(&[Message::user("build a clock")])
            .await
            .unwrap();
        let fragments: Vec<String> = stream.map(Result::unwrap).collect().await;
        assert_eq!(fragments, vec!["Sure! ", "<file name=\"index.html\">"]);
    }

    #[tokio::test]
    async fn error_status_is_transport_error_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = match client.stream(&[Message::user("x")]).await {
            Err(e) => e,
            Ok(_) => panic!("expected an error"),
        };
        assert!(matches!(&err, AiError::Transport(m) if m.contains("403") && m.contains("API key not valid")));
    }

    #[tokio::test]
    async fn blocked_prompt_ends_stream_with_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                sse(&[serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } })]),
                "text/event-stream",
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let results: Vec<_> = client
            .stream(&[Message::user("x")])
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(results.len(), 1);
        assert!(matches!(&results[0], Err(AiError::ProviderLogic(_))));
    }
}
