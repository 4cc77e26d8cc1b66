//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

use crate::chat::SessionError;
use crate::core::ChatError;

// Errors

pub struct ApiError {
    status: StatusCode,
    error: anyhow::Error,
}

impl ApiError {
    pub fn with_status(status: StatusCode, error: impl Into<anyhow::Error>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }
}

fn status_for(error: &anyhow::Error) -> StatusCode {
    if let Some(err) = error.downcast_ref::<SessionError>() {
        return match err {
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
            SessionError::EmptyInput => StatusCode::BAD_REQUEST,
            SessionError::TurnInProgress
            | SessionError::NotInitialized
            | SessionError::NoTurnInProgress
            | SessionError::FeedbackNotEligible => StatusCode::CONFLICT,
        };
    }
    if let Some(err) = error.downcast_ref::<ChatError>() {
        return match err {
            ChatError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ChatError::CompletionRequest(_) => StatusCode::BAD_GATEWAY,
            ChatError::FeedbackWrite(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
    }
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        if self.status.is_server_error() {
            tracing::error!("{}", self.error);
        } else {
            tracing::warn!("{}", self.error);
        }

        let message = if self.status == StatusCode::INTERNAL_SERVER_ERROR {
            format!("Something went wrong: {}", self.error)
        } else {
            self.error.to_string()
        };

        (self.status, Json(json!({ "error": message }))).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        Self {
            status: status_for(&error),
            error,
        }
    }
}

// Re-export public types from each route

pub mod gpu {
    pub use crate::api::routes::gpu::public::*;
}

pub mod metrics {
    pub use crate::api::routes::metrics::public::*;
}

pub mod sessions {
    pub use crate::api::routes::sessions::public::*;
}
