use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::{AppConfig, ChatError};
use crate::openai::{CompletionOptions, Message, completion};

/// Produces the next assistant reply for an outbound message list.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, ChatError>;
}

pub type SharedCompletionClient = std::sync::Arc<dyn CompletionClient + 'static>;

/// Completion client for any OpenAI compatible endpoint.
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_hostname: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(api_hostname: &str, api_key: &str, model: &str, max_tokens: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.openai_api_hostname,
            &config.openai_api_key,
            &config.openai_model,
            config.max_tokens,
        )
        .with_timeout(Duration::from_secs(config.request_timeout_secs))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Pull the assistant text out of the first choice.
pub fn first_choice_content(resp: &Value) -> Result<String, ChatError> {
    let choices = resp["choices"]
        .as_array()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ChatError::CompletionRequest("Response contained no choices".to_string()))?;

    choices[0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| {
            ChatError::CompletionRequest(format!("No message content received. Resp: {}", resp))
        })
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, ChatError> {
        let options = CompletionOptions {
            api_hostname: &self.api_hostname,
            api_key: &self.api_key,
            model: &self.model,
            max_tokens: self.max_tokens,
            timeout: self.timeout,
        };

        tracing::debug!(model = %self.model, messages = messages.len(), "Requesting completion");

        let resp = completion(&self.http, messages, &options)
            .await
            .map_err(|e| {
                tracing::error!("Completion request failed: {}. Root cause: {}", e, e.root_cause());
                ChatError::CompletionRequest(e.to_string())
            })?;

        first_choice_content(&resp)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::openai::Role;

    #[test]
    fn test_first_choice_content() {
        let resp = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ]
        });
        assert_eq!(first_choice_content(&resp).unwrap(), "first");
    }

    #[test]
    fn test_zero_choices_is_completion_error() {
        let err = first_choice_content(&json!({"choices": []})).unwrap_err();
        assert!(matches!(err, ChatError::CompletionRequest(_)));

        let err = first_choice_content(&json!({"error": "overloaded"})).unwrap_err();
        assert!(matches!(err, ChatError::CompletionRequest(_)));
    }

    #[tokio::test]
    async fn test_openai_client_complete() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(mockito::Matcher::PartialJson(json!({"max_tokens": 4096})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"X GB"}}]}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(&server.url(), "test-key", "test-model", 4096);
        let reply = client
            .complete(&[Message::new(Role::User, "What is GPU memory?")])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "X GB");
    }

    #[tokio::test]
    async fn test_openai_client_unreachable() {
        // Nothing listens on port 9 on the loopback interface
        let client = OpenAiClient::new("http://127.0.0.1:9", "test-key", "test-model", 4096)
            .with_timeout(Duration::from_secs(2));
        let err = client
            .complete(&[Message::new(Role::User, "Hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::CompletionRequest(_)));
    }
}
