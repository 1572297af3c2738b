//! Database client for Calboard
//!
//! Thin wrapper around an SQLx SQLite pool, shared by the concrete store
//! implementations.

use calboard_common::services::StoreError;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::info;

/// Database client holding the shared connection pool.
#[derive(Debug, Clone)]
pub struct DbClient {
    pool: SqlitePool,
}

impl DbClient {
    /// Connects to the database at `url` and returns a client.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError::Connection` when the URL is empty or the
    /// connection attempt fails.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        if url.is_empty() {
            return Err(StoreError::Connection("database URL is empty".to_string()));
        }

        // Single connection: `sqlite::memory:` databases exist per connection,
        // so a larger pool would not see the same tables.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        info!("connected to database");
        Ok(Self { pool })
    }

    /// Access to the underlying pool for query execution.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates all tables used by Calboard when they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        let credentials = r#"
            CREATE TABLE IF NOT EXISTS credentials (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner TEXT NOT NULL,
                organization TEXT NOT NULL,
                access_token TEXT NOT NULL DEFAULT '',
                refresh_token TEXT NOT NULL DEFAULT '',
                created_at INTEGER NOT NULL DEFAULT (strftime('%s','now')),
                UNIQUE(owner, organization)
            )
        "#;

        let professionals = r#"
            CREATE TABLE IF NOT EXISTS professionals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                phone TEXT,
                email TEXT,
                token TEXT,
                organization TEXT,
                created_at INTEGER NOT NULL DEFAULT (strftime('%s','now'))
            )
        "#;

        sqlx::query(credentials)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        sqlx::query(professionals)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        info!("database schema initialized");
        Ok(())
    }
}
