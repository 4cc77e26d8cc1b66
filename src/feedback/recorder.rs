use crate::core::ChatError;
use crate::feedback::{FEEDBACK_COLLECTION, FeedbackRecord};
use crate::store::SharedDocumentStore;

/// Writes feedback records to the `feedback` collection. There is no
/// de-duplication so every call creates a new document.
#[derive(Clone)]
pub struct FeedbackRecorder {
    store: SharedDocumentStore,
}

impl FeedbackRecorder {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self { store }
    }

    /// Persist `record` and return the new document ID.
    pub async fn record(&self, record: &FeedbackRecord) -> Result<String, ChatError> {
        let document =
            serde_json::to_value(record).map_err(|e| ChatError::FeedbackWrite(e.to_string()))?;

        let id = self
            .store
            .add(FEEDBACK_COLLECTION, document)
            .await
            .map_err(|e| {
                tracing::error!("Feedback write failed: {}. Root cause: {}", e, e.root_cause());
                ChatError::FeedbackWrite(e.to_string())
            })?;

        tracing::info!(id = %id, who = %record.who, score = ?record.up_down, "Feedback recorded");
        Ok(id)
    }
}
