use std::time::Duration;

use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

/// Settings for a single chat completion request.
#[derive(Clone, Debug)]
pub struct CompletionOptions<'a> {
    pub api_hostname: &'a str,
    pub api_key: &'a str,
    pub model: &'a str,
    pub max_tokens: u32,
    pub timeout: Duration,
}

/// Call an OpenAI compatible chat completions endpoint and return the
/// raw response body. Non-2xx statuses are returned as errors.
pub async fn completion(
    client: &reqwest::Client,
    messages: &[Message],
    options: &CompletionOptions<'_>,
) -> Result<Value, Error> {
    let payload = json!({
        "model": options.model,
        "messages": messages,
        "max_tokens": options.max_tokens,
    });
    let url = format!(
        "{}/v1/chat/completions",
        options.api_hostname.trim_end_matches("/")
    );
    let response = client
        .post(url)
        .bearer_auth(options.api_key)
        .header("Content-Type", "application/json")
        .timeout(options.timeout)
        .json(&payload)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(url: &str) -> CompletionOptions<'_> {
        CompletionOptions {
            api_hostname: url,
            api_key: "test-key",
            model: "meta-llama-3.1-70b-instruct",
            max_tokens: 4096,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), r#""system""#);
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            r#""assistant""#
        );
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!(serde_json::from_str::<Role>(r#""tool""#).is_err());
    }

    #[test]
    fn test_message_new() {
        let msg = Message::new(Role::User, "What is GPU memory?");
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"role":"user","content":"What is GPU memory?"}"#
        );
    }

    #[tokio::test]
    async fn test_completion_sends_model_messages_and_max_tokens() {
        let mut server = mockito::Server::new_async().await;

        let response_body = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1694268190,
            "model": "meta-llama-3.1-70b-instruct",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Hello!"
                },
                "finish_reason": "stop"
            }]
        }"#;

        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::Json(json!({
                "model": "meta-llama-3.1-70b-instruct",
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "Hi"}
                ],
                "max_tokens": 4096
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(response_body)
            .create_async()
            .await;

        let messages = vec![
            Message::new(Role::System, "Be brief."),
            Message::new(Role::User, "Hi"),
        ];
        let url = server.url();
        let result = completion(&reqwest::Client::new(), &messages, &options(&url)).await;

        mock.assert_async().await;
        let json = result.unwrap();
        assert_eq!(json["choices"][0]["message"]["content"], "Hello!");
    }

    #[tokio::test]
    async fn test_completion_error_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body(r#"{"error": "invalid api key"}"#)
            .create_async()
            .await;

        let messages = vec![Message::new(Role::User, "Hi")];
        let url = server.url();
        let result = completion(&reqwest::Client::new(), &messages, &options(&url)).await;

        mock.assert_async().await;
        assert!(result.is_err());
    }
}
