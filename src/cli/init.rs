use anyhow::{Result, anyhow};
use std::fs;

use crate::store::SqliteDocumentStore;

pub async fn run(db: bool, db_path: &str) -> Result<()> {
    if !db {
        return Err(anyhow!("Missing value for init \"--db\""));
    }

    println!("Initializing db...");
    fs::create_dir_all(db_path)
        .unwrap_or_else(|err| println!("Ignoring db directory create failed: {}", err));

    SqliteDocumentStore::connect(db_path).await?;
    println!("Finished initializing db");

    Ok(())
}
