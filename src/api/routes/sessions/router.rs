//! Router for the chat session API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use super::public;
use crate::analytics::UsageEvent;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::chat::{ChatSession, SessionError};
use crate::feedback::FeedbackRecord;

type SharedState = Arc<RwLock<AppState>>;

/// Settles a session if the handler future is dropped while waiting on
/// an outbound call, e.g. when the client disconnects. Otherwise the
/// session would be stuck mid-transition.
struct SettleOnDrop<F: FnOnce(&mut ChatSession)> {
    state: SharedState,
    id: String,
    settle: Option<F>,
}

impl<F: FnOnce(&mut ChatSession)> SettleOnDrop<F> {
    fn new(state: &SharedState, id: &str, settle: F) -> Self {
        Self {
            state: Arc::clone(state),
            id: id.to_string(),
            settle: Some(settle),
        }
    }

    /// The handler is past its last await and settles the session itself.
    fn disarm(mut self) {
        self.settle = None;
    }
}

impl<F: FnOnce(&mut ChatSession)> Drop for SettleOnDrop<F> {
    fn drop(&mut self) {
        let Some(settle) = self.settle.take() else {
            return;
        };
        // A poisoned lock is left alone, panicking in drop would abort
        let Ok(mut shared) = self.state.write() else {
            return;
        };
        if let Some(session) = shared.sessions.get_mut(&self.id) {
            settle(session);
            tracing::warn!(session_id = %self.id, "Request dropped before it finished, session settled");
        }
    }
}

/// Start a new chat session seeded with the greeting
async fn create_session(
    State(state): State<SharedState>,
    Json(payload): Json<public::CreateSessionRequest>,
) -> Result<(StatusCode, Json<public::SessionResponse>), ApiError> {
    let session_id = uuid::Uuid::new_v4().to_string();

    let (view, usage) = {
        let mut shared = state.write().expect("Unable to write shared state");
        let mut session = ChatSession::new(&session_id, payload.who.as_deref());
        session.initialize(&shared.config.greeting);
        let view = public::SessionResponse::from(&session);
        shared.sessions.insert(session_id.clone(), session);
        (view, shared.usage.clone())
    };

    tracing::info!(session_id = %session_id, "Chat session started");
    usage.track(UsageEvent::SessionStarted).await;

    Ok((StatusCode::CREATED, Json(view)))
}

/// Get a single chat session by ID
async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<public::SessionResponse>, ApiError> {
    let shared = state.read().expect("Unable to read shared state");
    let session = shared
        .sessions
        .get(&id)
        .ok_or_else(|| SessionError::NotFound(id.clone()))?;

    Ok(Json(public::SessionResponse::from(session)))
}

/// Tear down a chat session
async fn delete_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut shared = state.write().expect("Unable to write shared state");
    shared
        .sessions
        .remove(&id)
        .ok_or_else(|| SessionError::NotFound(id.clone()))?;

    tracing::info!(session_id = %id, "Chat session ended");
    Ok(StatusCode::NO_CONTENT)
}

/// Send a user message and wait for the assistant's reply
async fn submit_message(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<public::MessageRequest>,
) -> Result<Json<public::MessageResponse>, ApiError> {
    // The lock is only held for the state transitions, never across
    // the completion request
    let (request, completion, usage) = {
        let mut shared = state.write().expect("Unable to write shared state");
        let system_message = shared.config.system_message.clone();
        let context_mode = shared.config.context_mode;
        let completion = shared.completion.clone();
        let usage = shared.usage.clone();
        let session = shared
            .sessions
            .get_mut(&id)
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;
        let request = session.begin_turn(&payload.message, &system_message, context_mode)?;
        (request, completion, usage)
    };

    let in_flight = SettleOnDrop::new(&state, &id, |session: &mut ChatSession| {
        session.abort_turn()
    });
    usage.track(UsageEvent::MessageSubmitted).await;
    let result = completion.complete(&request).await;
    in_flight.disarm();

    let mut shared = state.write().expect("Unable to write shared state");
    // The session may have been torn down while waiting on the reply
    let session = shared
        .sessions
        .get_mut(&id)
        .ok_or_else(|| SessionError::NotFound(id.clone()))?;

    match result {
        Ok(reply) => {
            session.complete_turn(&reply)?;
            tracing::debug!(session_id = %id, turns = session.transcript().len(), "Chat turn completed");
            Ok(Json(public::MessageResponse {
                reply,
                session: public::SessionResponse::from(&*session),
            }))
        }
        Err(e) => {
            session.abort_turn();
            Err(e.into())
        }
    }
}

/// Record thumbs up/down feedback for the latest reply
async fn submit_feedback(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<public::FeedbackRequest>,
) -> Result<(StatusCode, Json<public::FeedbackResponse>), ApiError> {
    // Claiming the reply under the write lock makes a concurrent
    // duplicate submission fail with a conflict
    let (record, reply, recorder, usage) = {
        let mut shared = state.write().expect("Unable to write shared state");
        let recorder = shared.feedback.clone();
        let usage = shared.usage.clone();
        let session = shared
            .sessions
            .get_mut(&id)
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;
        if !session.feedback_eligible() {
            return Err(SessionError::FeedbackNotEligible.into());
        }
        let record = FeedbackRecord::new(
            session.identity(),
            payload.score,
            payload.text.as_deref(),
            session.transcript(),
        )?;
        let reply = session.begin_feedback()?;
        (record, reply, recorder, usage)
    };

    let in_flight = SettleOnDrop::new(&state, &id, move |session: &mut ChatSession| {
        session.feedback_failed(reply)
    });
    let result = recorder.record(&record).await;
    in_flight.disarm();

    {
        let mut shared = state.write().expect("Unable to write shared state");
        if let Some(session) = shared.sessions.get_mut(&id) {
            match &result {
                Ok(_) => session.feedback_recorded(reply),
                Err(_) => session.feedback_failed(reply),
            }
        }
    }

    let doc_id = result?;
    usage.track(UsageEvent::FeedbackSubmitted).await;

    Ok((
        StatusCode::CREATED,
        Json(public::FeedbackResponse {
            id: doc_id,
            message: "Feedback recorded!".to_string(),
        }),
    ))
}

/// Create the chat session router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(create_session))
        .route("/{id}", get(get_session).delete(delete_session))
        .route("/{id}/messages", post(submit_message))
        .route("/{id}/feedback", post(submit_feedback))
}
