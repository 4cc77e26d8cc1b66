use std::path::Path;

use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

const DB_FILE_NAME: &str = "copilot.sqlite3";

/// Open the on-disk database that lives inside `db_path`.
pub async fn async_db(db_path: &str) -> Result<Connection, Error> {
    let file = Path::new(db_path).join(DB_FILE_NAME);
    let db = Connection::open(file).await?;
    Ok(db)
}

/// Create the document tables. Safe to run on every startup.
pub fn initialize_db(conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS document (
            id TEXT PRIMARY KEY,
            collection TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );
        CREATE INDEX IF NOT EXISTS idx_document_collection
            ON document (collection);
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_db_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db = async_db(dir.path().to_str().unwrap()).await.unwrap();

        let tables = db
            .call(|conn| {
                initialize_db(conn)?;
                initialize_db(conn)?;
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='document'",
                    [],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await
            .unwrap();

        assert_eq!(tables, 1);
        assert!(dir.path().join(DB_FILE_NAME).exists());
    }
}
