//! Append-only document collections.

use anyhow::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

mod sqlite;
pub use sqlite::SqliteDocumentStore;

/// A document database that groups JSON documents into named
/// collections. Documents are only ever added, never updated.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return its generated ID.
    async fn add(&self, collection: &str, document: Value) -> Result<String, Error>;

    /// All documents in a collection, oldest first.
    async fn list(&self, collection: &str) -> Result<Vec<Value>, Error>;

    /// Documents in a collection added at or after `since`, oldest first.
    async fn list_since(
        &self,
        collection: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Value>, Error>;
}

pub type SharedDocumentStore = std::sync::Arc<dyn DocumentStore + 'static>;
