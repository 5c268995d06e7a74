//! Domain errors for the logging pipeline.

use thiserror::Error;

use super::models::ParseSeverityError;

/// Errors raised by a log store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// A SQL statement failed
    #[error("Query failed: {0}")]
    QueryFailed(#[from] sqlx::Error),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(#[from] sqlx::migrate::MigrateError),

    /// A stored payload could not be encoded or decoded
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A stored timestamp could not be parsed
    #[error("DateTime parse error: {0}")]
    DateTimeParseError(#[from] chrono::ParseError),

    /// A stored level column outside the known ordinals
    #[error("Invalid stored level ordinal: {0}")]
    InvalidLevel(i64),

    /// The connection pool could not be created
    #[error("Connection pool error: {0}")]
    ConnectionPoolError(String),
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while building or configuring the logger
#[derive(Debug, Error)]
pub enum LoggerError {
    /// The configured level name is not recognized
    #[error("Invalid log level: {0}")]
    InvalidLevel(#[from] ParseSeverityError),

    /// `remote_logging_url` is not an absolute http(s) URL
    #[error("Invalid remote logging URL {url}: {reason}")]
    InvalidRemoteUrl {
        /// The rejected value
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The default HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    /// The store could not be set up
    #[error("Log store unavailable: {0}")]
    Store(#[from] StoreError),
}
