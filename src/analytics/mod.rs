//! Anonymized usage counters.
//!
//! Events only carry their name and a timestamp, never message text or
//! who sent it.

use std::collections::BTreeMap;

use anyhow::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::store::SharedDocumentStore;

pub const USAGE_COLLECTION: &str = "counts";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UsageEvent {
    #[serde(rename = "session-started")]
    SessionStarted,
    #[serde(rename = "message-submitted")]
    MessageSubmitted,
    #[serde(rename = "feedback-submitted")]
    FeedbackSubmitted,
}

/// Daily total for one event.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UsageCount {
    pub event: UsageEvent,
    pub day: String,
    pub total: i64,
}

#[derive(Deserialize)]
struct StoredEvent {
    event: UsageEvent,
    timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct UsageTracker {
    store: SharedDocumentStore,
}

impl UsageTracker {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self { store }
    }

    /// Record that `event` happened. A failed write is logged and does
    /// not interrupt the caller.
    pub async fn track(&self, event: UsageEvent) {
        let doc = json!({
            "event": event,
            "timestamp": Utc::now(),
        });
        if let Err(e) = self.store.add(USAGE_COLLECTION, doc).await {
            tracing::warn!("Failed to record usage event {:?}: {}", event, e);
        }
    }

    /// Totals per event per day for the last `limit_days` days, most
    /// recent day first within each event.
    pub async fn summary(&self, limit_days: i64) -> Result<Vec<UsageCount>, Error> {
        let since = Duration::try_days(limit_days.max(0))
            .and_then(|d| Utc::now().checked_sub_signed(d))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let docs = self.store.list_since(USAGE_COLLECTION, since).await?;

        let mut totals: BTreeMap<(UsageEvent, String), i64> = BTreeMap::new();
        for doc in docs {
            let stored: StoredEvent = match serde_json::from_value(doc) {
                Ok(stored) => stored,
                Err(e) => {
                    tracing::warn!("Skipping malformed usage event: {}", e);
                    continue;
                }
            };
            if stored.timestamp < since {
                continue;
            }
            let day = stored.timestamp.format("%Y-%m-%d").to_string();
            *totals.entry((stored.event, day)).or_insert(0) += 1;
        }

        let mut counts: Vec<UsageCount> = totals
            .into_iter()
            .map(|((event, day), total)| UsageCount { event, day, total })
            .collect();
        counts.sort_by(|a, b| a.event.cmp(&b.event).then(b.day.cmp(&a.day)));
        Ok(counts)
    }
}
