//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use copilot::api::AppState;
use copilot::api::app;
use copilot::chat::ContextMode;
use copilot::core::AppConfig;
use copilot::openai::{OpenAiClient, SharedCompletionClient};
use copilot::store::{SharedDocumentStore, SqliteDocumentStore};

pub const GREETING: &str = "I'm ready to answer questions about GPUs.";
pub const SYSTEM_PROMPT: &str = "You are a GPU sizing assistant.";

pub fn test_config(api_hostname: &str) -> AppConfig {
    AppConfig {
        storage_path: String::from("./"),
        db_path: String::from("./db"),
        openai_api_hostname: api_hostname.to_string(),
        openai_api_key: String::from("test-api-key"),
        openai_model: String::from("meta-llama-3.1-70b-instruct"),
        max_tokens: 4096,
        request_timeout_secs: 5,
        system_message: String::from(SYSTEM_PROMPT),
        greeting: String::from(GREETING),
        context_mode: ContextMode::FullTranscript,
    }
}

/// Creates a test application router backed by an in-memory store and
/// a completion service at `api_hostname` (usually a `mockito`
/// server).
pub async fn test_app(api_hostname: &str) -> (Router, Arc<SqliteDocumentStore>) {
    let store = Arc::new(
        SqliteDocumentStore::in_memory()
            .await
            .expect("Failed to open in-memory store"),
    );
    let router = test_app_with_store(test_config(api_hostname), store.clone());
    (router, store)
}

pub fn test_app_with_store(config: AppConfig, store: SharedDocumentStore) -> Router {
    let completion = Arc::new(OpenAiClient::from_config(&config));
    test_app_with_client(config, completion, store)
}

/// Creates a test application router with a custom completion client,
/// for controlling when replies arrive.
pub fn test_app_with_client(
    config: AppConfig,
    completion: SharedCompletionClient,
    store: SharedDocumentStore,
) -> Router {
    let app_state = AppState::new(config, completion, store);
    app(Arc::new(RwLock::new(app_state)))
}

/// Mock a successful completion that replies with `reply`.
pub async fn mock_completion(server: &mut mockito::ServerGuard, reply: &str) -> mockito::Mock {
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-123",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": reply},
                    "finish_reason": "stop"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

/// Send a request and return the status with the JSON body (`Null`
/// when the body is empty).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().uri(uri).method(method);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = body_to_string(response.into_body()).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    (status, json)
}

/// Create a session and return its ID.
pub async fn create_session(app: &Router, who: Option<&str>) -> String {
    let (status, body) = send(app, "POST", "/api/sessions", Some(json!({ "who": who }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"].as_str().unwrap().to_string()
}
