//! Integration tests for the metrics API endpoint

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_utils::{create_session, mock_completion, send, test_app};

    /// Tests getting metrics returns an empty list initially
    #[tokio::test]
    async fn it_gets_empty_metrics() {
        let server = mockito::Server::new_async().await;
        let (app, _store) = test_app(&server.url()).await;

        let (status, body) = send(&app, "GET", "/api/metrics", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"events": []}));
    }

    /// Tests session activity is counted without any message content
    #[tokio::test]
    async fn it_counts_usage_events() {
        let mut server = mockito::Server::new_async().await;
        let _mock = mock_completion(&mut server, "X GB").await;
        let (app, _store) = test_app(&server.url()).await;

        let session_id = create_session(&app, Some("alice")).await;
        create_session(&app, None).await;
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/sessions/{session_id}/messages"),
            Some(json!({"message": "secret question"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, "GET", "/api/metrics?limit_days=7", None).await;

        assert_eq!(status, StatusCode::OK);
        let events = body["events"].as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "session-started");
        assert_eq!(events[0]["total"], 2);
        assert_eq!(events[1]["event"], "message-submitted");
        assert_eq!(events[1]["total"], 1);

        let raw = body.to_string();
        assert!(!raw.contains("secret question"));
        assert!(!raw.contains("alice"));
    }
}
