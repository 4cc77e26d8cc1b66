//! Public types for the chat session API
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::ChatSession;
use crate::feedback::Score;
use crate::openai::Message;

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    // Identity label attached to feedback, anonymous when unset
    pub who: Option<String>,
}

#[derive(Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub score: Score,
    pub text: Option<String>,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub state: String,
    pub transcript: Vec<Message>,
    pub pending_response: Option<String>,
    pub feedback_eligible: bool,
    pub started_at: DateTime<Utc>,
}

impl From<&ChatSession> for SessionResponse {
    fn from(session: &ChatSession) -> Self {
        Self {
            session_id: session.id.clone(),
            state: session.state().label().to_string(),
            transcript: session.transcript().to_vec(),
            pending_response: session.pending_response().map(|s| s.to_string()),
            feedback_eligible: session.feedback_eligible(),
            started_at: session.created_at(),
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub reply: String,
    pub session: SessionResponse,
}

#[derive(Serialize)]
pub struct FeedbackResponse {
    pub id: String,
    pub message: String,
}
