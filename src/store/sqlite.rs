use anyhow::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio_rusqlite::{Connection, params};

use super::DocumentStore;
use crate::core::db::{async_db, initialize_db};

#[derive(Clone)]
pub struct SqliteDocumentStore {
    db: Connection,
}

impl SqliteDocumentStore {
    /// Wrap an existing connection, creating the schema if needed.
    pub async fn new(db: Connection) -> Result<Self, Error> {
        db.call(|conn| {
            initialize_db(conn)?;
            Ok(())
        })
        .await?;
        Ok(Self { db })
    }

    /// Open the store at `db_path`.
    pub async fn connect(db_path: &str) -> Result<Self, Error> {
        let db = async_db(db_path).await?;
        Self::new(db).await
    }

    pub async fn in_memory() -> Result<Self, Error> {
        let db = Connection::open_in_memory().await?;
        Self::new(db).await
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn add(&self, collection: &str, document: Value) -> Result<String, Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let doc_id = id.clone();
        let collection = collection.to_owned();
        let data = document.to_string();
        self.db
            .call(move |conn| {
                let mut stmt =
                    conn.prepare("INSERT INTO document (id, collection, data) VALUES (?, ?, ?)")?;
                stmt.execute(params![doc_id, collection, data])?;
                Ok(())
            })
            .await?;

        Ok(id)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, Error> {
        let collection = collection.to_owned();
        let rows = self
            .db
            .call(move |conn| {
                let mut stmt = conn
                    .prepare("SELECT data FROM document WHERE collection = ? ORDER BY rowid ASC")?;
                let rows = stmt
                    .query_map([collection], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<String>, rusqlite::Error>>()?;
                Ok(rows)
            })
            .await?;

        parse_documents(&rows)
    }

    async fn list_since(
        &self,
        collection: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Value>, Error> {
        let collection = collection.to_owned();
        // Same format as CURRENT_TIMESTAMP so the comparison is lexical
        let since = since.format("%Y-%m-%d %H:%M:%S").to_string();
        let rows = self
            .db
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT data
                    FROM document
                    WHERE collection = ?1
                    AND created_at >= ?2
                    ORDER BY rowid ASC
                    "#,
                )?;
                let rows = stmt
                    .query_map(params![collection, since], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<String>, rusqlite::Error>>()?;
                Ok(rows)
            })
            .await?;

        parse_documents(&rows)
    }
}

fn parse_documents(rows: &[String]) -> Result<Vec<Value>, Error> {
    let documents = rows
        .iter()
        .map(|data| serde_json::from_str(data))
        .collect::<Result<Vec<Value>, _>>()?;
    Ok(documents)
}
