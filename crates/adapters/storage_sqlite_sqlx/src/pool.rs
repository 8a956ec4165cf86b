//! Opening the climahub database.
//!
//! The schema holds three tables: `areas`, `zones` and a single-row
//! `settings` table for the options and the global state. Migrations are
//! embedded at compile time and run on every start.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

use crate::error::StorageError;

/// Where the configuration snapshot lives.
pub struct Config {
    /// `SQLite` connection URL, e.g. `sqlite:climahub.db?mode=rwc` for the
    /// daemon or `sqlite::memory:` for tests.
    pub database_url: String,
}

impl Config {
    /// Open the database, creating the file on first start, and bring the
    /// schema up to date.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] when the URL is rejected or the
    /// connection fails, and [`StorageError::Migration`] when the schema
    /// cannot be migrated.
    pub async fn build(self) -> Result<Database, StorageError> {
        Database::initialize(&self.database_url).await
    }
}

/// An open climahub database. Hand [`Database::pool`] to
/// [`crate::SqliteConfigStore::new`].
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn initialize(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!(database_url, "database ready");

        Ok(Self { pool })
    }

    /// Connection pool shared by every store built on this database.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
