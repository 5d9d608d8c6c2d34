//! SQLite database connection management.
//!
//! Provides a connection pool to the SQLite database with WAL mode enabled so
//! that concurrent HTTP requests can read while one writes. The database file
//! and its parent directories are created automatically if they don't exist.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use knowledge_hub_core::repository::KnowledgeRepository;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Create a connection pool to the configured SQLite database.
///
/// - Creates the database file and parent directories if they don't exist.
/// - Enables WAL journal mode for concurrent read/write.
/// - Waits up to 5 seconds on a locked database before failing a write.
/// - Returns a pool with up to 5 connections.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::debug!(path = %db_path.display(), "opened sqlite pool");
    Ok(pool)
}

/// Connect and wire a [`KnowledgeRepository`] over a [`SqliteStore`].
///
/// Returns the pool alongside so the caller can close it when done.
pub async fn open_repository(config: &Config) -> Result<(KnowledgeRepository, SqlitePool)> {
    let pool = connect(config).await?;
    let store = Arc::new(SqliteStore::new(pool.clone()));
    Ok((KnowledgeRepository::new(store), pool))
}
