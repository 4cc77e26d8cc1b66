use std::collections::HashMap;

use crate::analytics::UsageTracker;
use crate::chat::ChatSession;
use crate::core::AppConfig;
use crate::feedback::FeedbackRecorder;
use crate::openai::SharedCompletionClient;
use crate::store::SharedDocumentStore;

pub struct AppState {
    // Live chat sessions keyed by session ID
    pub sessions: HashMap<String, ChatSession>,
    pub config: AppConfig,
    pub completion: SharedCompletionClient,
    pub feedback: FeedbackRecorder,
    pub usage: UsageTracker,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        completion: SharedCompletionClient,
        store: SharedDocumentStore,
    ) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
            completion,
            feedback: FeedbackRecorder::new(store.clone()),
            usage: UsageTracker::new(store),
        }
    }
}
