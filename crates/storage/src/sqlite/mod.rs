use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

use crate::repository::Storage;

mod attempt_repo;
mod mapping;
mod migrate;

/// Quiz attempt store backed by a `SQLite` pool.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Open the database at `database_url` and bring its schema up to date.
    ///
    /// File databases are created when missing.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the URL is malformed, the database cannot
    /// be opened, or a schema step fails.
    pub async fn open(database_url: &str) -> Result<Self, SqliteInitError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let version = migrate::upgrade(&pool).await?;
        tracing::debug!(schema_version = version, "sqlite attempt store ready");
        Ok(Self { pool })
    }
}

impl Storage {
    /// `Storage` whose attempts live in `SQLite`.
    ///
    /// # Errors
    ///
    /// See [`SqliteRepository::open`].
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::open(database_url).await?;
        Ok(Self {
            attempts: Arc::new(repo),
        })
    }
}
