//! Subcommand implementations

pub mod emit;
pub mod entries;
pub mod fetch;
pub mod files;
pub mod sweep;

use anyhow::{Context, Result};

use crate::domain::models::LoggerConfig;
use crate::infrastructure::database::SqliteLogStore;

/// Open and migrate the configured local store
pub(crate) async fn open_store(config: &LoggerConfig) -> Result<SqliteLogStore> {
    SqliteLogStore::open(&config.database_path)
        .await
        .with_context(|| format!("Failed to open log store at {}", config.database_path))
}
