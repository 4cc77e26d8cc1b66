use anyhow::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::openai::Message;

/// Who the feedback is attributed to when the session has no identity.
pub const ANONYMOUS: &str = "anon";

pub const FEEDBACK_COLLECTION: &str = "feedback";

/// Thumbs up or down. Also accepts the emoji labels sent by thumbs
/// widgets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Score {
    #[serde(rename = "up", alias = "👍", alias = "thumbs_up")]
    Up,
    #[serde(rename = "down", alias = "👎", alias = "thumbs_down")]
    Down,
}

/// A single feedback submission as it is written to the document
/// store. Field names match the stored document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub who: String,
    pub up_down: Score,
    pub feedback_message: String,
    // JSON encoded transcript at the time of submission
    pub chat_history: String,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn new(
        identity: Option<&str>,
        score: Score,
        comment: Option<&str>,
        transcript: &[Message],
    ) -> Result<Self, Error> {
        let who = identity
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(ANONYMOUS)
            .to_string();
        let chat_history = serde_json::to_string(transcript)?;

        Ok(Self {
            who,
            up_down: score,
            feedback_message: comment.unwrap_or_default().to_string(),
            chat_history,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::Role;

    #[test]
    fn test_score_labels() {
        assert_eq!(serde_json::to_string(&Score::Up).unwrap(), r#""up""#);
        assert_eq!(serde_json::to_string(&Score::Down).unwrap(), r#""down""#);
        assert_eq!(serde_json::from_str::<Score>(r#""👍""#).unwrap(), Score::Up);
        assert_eq!(serde_json::from_str::<Score>(r#""👎""#).unwrap(), Score::Down);
        assert!(serde_json::from_str::<Score>(r#""meh""#).is_err());
    }

    #[test]
    fn test_new_record() {
        let before = Utc::now();
        let transcript = vec![
            Message::new(Role::Assistant, "Hi"),
            Message::new(Role::User, "What is GPU memory?"),
        ];
        let record =
            FeedbackRecord::new(Some("alice"), Score::Up, Some("great"), &transcript).unwrap();

        assert_eq!(record.who, "alice");
        assert_eq!(record.up_down, Score::Up);
        assert_eq!(record.feedback_message, "great");
        assert!(record.timestamp >= before);

        let history: Vec<Message> = serde_json::from_str(&record.chat_history).unwrap();
        assert_eq!(history, transcript);
    }

    #[test]
    fn test_anonymous_default() {
        let record = FeedbackRecord::new(None, Score::Down, Some(""), &[]).unwrap();
        assert_eq!(record.who, ANONYMOUS);
        assert_eq!(record.feedback_message, "");

        let record = FeedbackRecord::new(Some(" "), Score::Down, None, &[]).unwrap();
        assert_eq!(record.who, ANONYMOUS);
    }

    #[test]
    fn test_stored_document_shape() {
        let record = FeedbackRecord::new(None, Score::Up, None, &[]).unwrap();
        let doc = serde_json::to_value(&record).unwrap();

        assert_eq!(doc["who"], "anon");
        assert_eq!(doc["up_down"], "up");
        assert_eq!(doc["feedback_message"], "");
        assert_eq!(doc["chat_history"], "[]");
        let ts = doc["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
    }
}
