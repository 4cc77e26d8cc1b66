//! Per-session conversation state.
//!
//! A session moves through a small state machine:
//!
//! `Fresh -> AwaitingInput <-> Responding -> AwaitingFeedback -> AwaitingInput`
//!
//! Turns are split in two halves so no lock needs to be held while the
//! completion request is in flight: `begin_turn` builds the outbound
//! messages and `complete_turn` / `abort_turn` settle the result.
//! Feedback is split the same way with `begin_feedback` followed by
//! `feedback_recorded` / `feedback_failed`, each tagged with the reply
//! number it rates so a write that settles late can't touch a newer
//! reply.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::ChatError;
use crate::openai::{Message, Role};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Chat session {0} not found")]
    NotFound(String),

    #[error("Message must not be empty")]
    EmptyInput,

    #[error("A response is already being generated for this session")]
    TurnInProgress,

    #[error("Session has not been initialized")]
    NotInitialized,

    #[error("No response is being generated for this session")]
    NoTurnInProgress,

    #[error("There is no response awaiting feedback")]
    FeedbackNotEligible,
}

/// How much of the transcript is sent with each completion request.
///
/// `FullTranscript` keeps conversational memory but the request grows
/// linearly with the session. `LatestTurn` keeps the request size
/// fixed and forgets everything but the system prompt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContextMode {
    #[default]
    FullTranscript,
    LatestTurn,
}

impl FromStr for ContextMode {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(ContextMode::FullTranscript),
            "latest" => Ok(ContextMode::LatestTurn),
            other => Err(ChatError::Configuration(format!(
                "Unknown context mode \"{}\", expected \"full\" or \"latest\"",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Fresh,
    AwaitingInput,
    // Holds the user's text until the reply arrives
    Responding { input: String },
    AwaitingFeedback,
    // Feedback for the latest reply is being written
    RecordingFeedback,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Fresh => "fresh",
            SessionState::AwaitingInput => "awaiting_input",
            SessionState::Responding { .. } => "responding",
            SessionState::AwaitingFeedback => "awaiting_feedback",
            SessionState::RecordingFeedback => "recording_feedback",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChatSession {
    pub id: String,
    identity: Option<String>,
    transcript: Vec<Message>,
    pending_response: Option<String>,
    // Number of replies received so far, identifies the pending one
    replies: u64,
    state: SessionState,
    created_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(id: &str, identity: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            identity: identity
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            transcript: Vec::new(),
            pending_response: None,
            replies: 0,
            state: SessionState::Fresh,
            created_at: Utc::now(),
        }
    }

    /// Seed the transcript with the greeting. Calling this again is a
    /// no-op.
    pub fn initialize(&mut self, greeting: &str) {
        if self.transcript.is_empty() {
            self.transcript
                .push(Message::new(Role::Assistant, greeting));
        }
        if self.state == SessionState::Fresh {
            self.state = SessionState::AwaitingInput;
        }
    }

    pub fn append(&mut self, message: Message) {
        self.transcript.push(message);
    }

    pub fn set_pending_response(&mut self, text: &str) {
        self.pending_response = Some(text.to_string());
    }

    pub fn pending_response(&self) -> Option<&str> {
        self.pending_response.as_deref()
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn replies(&self) -> u64 {
        self.replies
    }

    pub fn feedback_eligible(&self) -> bool {
        self.state == SessionState::AwaitingFeedback && self.pending_response.is_some()
    }

    /// Start a turn for `input` and return the messages to send to the
    /// completion service. The transcript is left untouched until the
    /// turn completes.
    pub fn begin_turn(
        &mut self,
        input: &str,
        system_prompt: &str,
        mode: ContextMode,
    ) -> Result<Vec<Message>, SessionError> {
        match self.state {
            SessionState::Fresh => return Err(SessionError::NotInitialized),
            SessionState::Responding { .. } => return Err(SessionError::TurnInProgress),
            SessionState::AwaitingInput
            | SessionState::AwaitingFeedback
            | SessionState::RecordingFeedback => {}
        }
        if input.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let user_msg = Message::new(Role::User, input);
        let mut messages = vec![Message::new(Role::System, system_prompt)];
        if mode == ContextMode::FullTranscript {
            messages.extend(self.transcript.iter().cloned());
        }
        messages.push(user_msg);

        self.state = SessionState::Responding {
            input: input.to_string(),
        };
        Ok(messages)
    }

    /// Record the reply for the in-flight turn. Appends the user and
    /// assistant messages together.
    pub fn complete_turn(&mut self, reply: &str) -> Result<(), SessionError> {
        let SessionState::Responding { input } = &self.state else {
            return Err(SessionError::NoTurnInProgress);
        };
        let user_msg = Message::new(Role::User, input);

        self.append(user_msg);
        self.append(Message::new(Role::Assistant, reply));
        self.set_pending_response(reply);
        self.replies += 1;
        self.state = SessionState::AwaitingFeedback;
        Ok(())
    }

    /// Give up on the in-flight turn without changing the transcript.
    pub fn abort_turn(&mut self) {
        if matches!(self.state, SessionState::Responding { .. }) {
            self.state = SessionState::AwaitingInput;
        }
    }

    /// Claim the pending reply for a feedback write and return its reply
    /// number. A second claim is rejected until the write settles.
    pub fn begin_feedback(&mut self) -> Result<u64, SessionError> {
        if !self.feedback_eligible() {
            return Err(SessionError::FeedbackNotEligible);
        }
        self.state = SessionState::RecordingFeedback;
        Ok(self.replies)
    }

    /// Feedback for `reply` was stored so it is no longer pending. Does
    /// nothing if a newer reply arrived in the meantime.
    pub fn feedback_recorded(&mut self, reply: u64) {
        if reply != self.replies {
            return;
        }
        self.pending_response = None;
        if matches!(
            self.state,
            SessionState::AwaitingFeedback | SessionState::RecordingFeedback
        ) {
            self.state = SessionState::AwaitingInput;
        }
    }

    /// The feedback write for `reply` failed so it can be rated again.
    pub fn feedback_failed(&mut self, reply: u64) {
        if reply == self.replies && self.state == SessionState::RecordingFeedback {
            self.state = SessionState::AwaitingFeedback;
        }
    }
}
