//! `SQLite` connection pool setup

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::errors::StoreError;

/// Turn a configured database path into a `SQLite` URL.
///
/// Values already starting with `sqlite:` are returned unchanged.
pub fn database_url(path: &str) -> String {
    if path.starts_with("sqlite:") {
        path.to_string()
    } else {
        format!("sqlite:{path}")
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Database connection pool for the log store
///
/// File databases use WAL journaling with NORMAL synchronous mode. In-memory
/// databases are pinned to a single long-lived connection, since every
/// `SQLite` memory connection is its own database.
pub struct DatabaseConnection {
    pool: SqlitePool,
}

impl DatabaseConnection {
    /// Open the pool, connecting immediately
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let options = Self::connect_options(database_url)?;
        ensure_parent_dir(database_url)?;
        let pool = Self::pool_options(database_url)
            .connect_with(options)
            .await
            .map_err(|e| {
                StoreError::ConnectionPoolError(format!("Failed to create connection pool: {e}"))
            })?;
        Ok(Self { pool })
    }

    /// Build the pool without connecting; the first query opens the database.
    ///
    /// Lets the logger be constructed outside of an async context.
    pub fn lazy(database_url: &str) -> Result<Self, StoreError> {
        let options = Self::connect_options(database_url)?;
        ensure_parent_dir(database_url)?;
        let pool = Self::pool_options(database_url).connect_lazy_with(options);
        Ok(Self { pool })
    }

    fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                StoreError::ConnectionPoolError(format!("Invalid database URL: {e}"))
            })?
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        if is_memory_url(database_url) {
            Ok(options)
        } else {
            Ok(options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal))
        }
    }

    fn pool_options(database_url: &str) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(10));
        if is_memory_url(database_url) {
            options
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            options
                .min_connections(0)
                .max_connections(4)
                .idle_timeout(Duration::from_secs(30))
                .max_lifetime(Duration::from_secs(1800))
        }
    }

    /// Apply pending migrations. Only new migrations run on repeated calls.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Underlying connection pool
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn ensure_parent_dir(database_url: &str) -> Result<(), StoreError> {
    if is_memory_url(database_url) {
        return Ok(());
    }
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::ConnectionPoolError(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
    }
    Ok(())
}
