//! Log storage port

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::errors::StoreResult;
use crate::domain::models::{EntryQuery, LogFile, LogFileSummary, LogRecord};

/// Text to append to one day file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAppend {
    /// Day file name
    pub name: String,
    /// Date partition of the file
    pub date: String,
    /// Newline-terminated formatted lines
    pub chunk: String,
    /// New last-modified time of the file
    pub modified_at: DateTime<Utc>,
}

/// Everything one drain pass writes, applied atomically
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    /// Day-file chunks, one per touched file
    pub appends: Vec<FileAppend>,
    /// Records to index individually
    pub records: Vec<LogRecord>,
    /// Cap on a day file's size; oldest whole lines are dropped to fit
    pub max_file_size: u64,
}

/// Embedded store holding two collections: day-partitioned files and
/// individually indexed records (by level, date and source).
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Create collections and indexes if missing. Safe to call repeatedly.
    async fn prepare(&self) -> StoreResult<()>;

    /// Append file chunks and insert records in one transaction.
    /// Records receive strictly increasing ids in slice order.
    async fn write_batch(&self, batch: &WriteBatch) -> StoreResult<()>;

    /// All day files, least recently modified first
    async fn list_files(&self) -> StoreResult<Vec<LogFileSummary>>;

    /// Day file by name, with its content
    async fn get_file(&self, name: &str) -> StoreResult<Option<LogFile>>;

    /// Returns whether a file was removed
    async fn delete_file(&self, name: &str) -> StoreResult<bool>;

    /// Distinct date partitions present among indexed records, ascending
    async fn entry_dates(&self) -> StoreResult<Vec<String>>;

    /// Delete records whose date is not in `keep`; returns rows removed
    async fn delete_entries_except(&self, keep: &[String]) -> StoreResult<u64>;

    /// Indexed records matching `query`, in insertion order
    async fn query_entries(&self, query: &EntryQuery) -> StoreResult<Vec<LogRecord>>;
}
