//! `SQLite` log store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tokio::sync::OnceCell;

use super::connection::{database_url, DatabaseConnection};
use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::{
    iso_timestamp, EntryQuery, LogFile, LogFileSummary, LogRecord, Severity,
};
use crate::domain::ports::{LogStore, WriteBatch};

type RecordRow = (i64, String, i64, String, Option<String>, String, String);

/// `SQLite` implementation of `LogStore`
///
/// - `log_files`: one row per day file, keyed by name
/// - `log_entries`: one row per entry, autoincrement id, indexed by level,
///   date and source
///
/// Timestamps are stored as millisecond RFC 3339 strings so that text
/// ordering matches chronological ordering.
pub struct SqliteLogStore {
    connection: DatabaseConnection,
    prepared: OnceCell<()>,
}

impl SqliteLogStore {
    /// Store over an existing connection; migrations run on first use
    pub const fn new(connection: DatabaseConnection) -> Self {
        Self {
            connection,
            prepared: OnceCell::const_new(),
        }
    }

    /// Store over a lazily opened pool for the configured database path
    pub fn open_lazy(path: &str) -> StoreResult<Self> {
        Ok(Self::new(DatabaseConnection::lazy(&database_url(path))?))
    }

    /// Store over an eagerly opened and migrated pool
    pub async fn open(path: &str) -> StoreResult<Self> {
        let store = Self::new(DatabaseConnection::new(&database_url(path)).await?);
        store.prepare().await?;
        Ok(store)
    }

    fn pool(&self) -> &SqlitePool {
        self.connection.pool()
    }

    /// Close the underlying pool
    pub async fn close(&self) {
        self.connection.close().await;
    }
}

/// Drop whole lines from the front until `content` fits in `max` bytes.
///
/// A final line larger than `max` is kept on its own. A zero cap disables
/// trimming.
pub(crate) fn cap_content(content: String, max: u64) -> String {
    let max = usize::try_from(max).unwrap_or(usize::MAX);
    if max == 0 || content.len() <= max {
        return content;
    }
    let mut start = 0;
    while content.len() - start > max {
        match content[start..].find('\n') {
            Some(i) if start + i + 1 < content.len() => start += i + 1,
            _ => break,
        }
    }
    content[start..].to_string()
}

fn parse_timestamp(s: &str) -> StoreResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

fn record_from_row(row: RecordRow) -> StoreResult<LogRecord> {
    let (id, message, level, timestamp, additional_info, source, date) = row;
    let level = u8::try_from(level)
        .ok()
        .and_then(|l| Severity::try_from(l).ok())
        .ok_or(StoreError::InvalidLevel(level))?;
    Ok(LogRecord {
        id: Some(id),
        message,
        level,
        timestamp: parse_timestamp(&timestamp)?,
        additional_info: additional_info
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?,
        source,
        date,
    })
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl LogStore for SqliteLogStore {
    async fn prepare(&self) -> StoreResult<()> {
        self.prepared
            .get_or_try_init(|| async { self.connection.migrate().await })
            .await?;
        Ok(())
    }

    async fn write_batch(&self, batch: &WriteBatch) -> StoreResult<()> {
        let mut tx = self.pool().begin().await?;

        for append in &batch.appends {
            let existing: Option<(String,)> =
                sqlx::query_as("SELECT content FROM log_files WHERE name = ?")
                    .bind(&append.name)
                    .fetch_optional(&mut *tx)
                    .await?;

            let content = match existing {
                Some((mut content,)) => {
                    content.push_str(&append.chunk);
                    content
                }
                None => append.chunk.clone(),
            };
            let content = cap_content(content, batch.max_file_size);
            let size = to_i64(content.len() as u64);

            sqlx::query(
                r"
                INSERT INTO log_files (name, date, content, last_modified, size_bytes)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(name) DO UPDATE SET
                    content = excluded.content,
                    last_modified = excluded.last_modified,
                    size_bytes = excluded.size_bytes
                ",
            )
            .bind(&append.name)
            .bind(&append.date)
            .bind(&content)
            .bind(iso_timestamp(&append.modified_at))
            .bind(size)
            .execute(&mut *tx)
            .await?;
        }

        for record in &batch.records {
            let additional_info = record
                .additional_info
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;

            sqlx::query(
                r"
                INSERT INTO log_entries (message, level, timestamp, additional_info, source, date)
                VALUES (?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(&record.message)
            .bind(i64::from(record.level.ordinal()))
            .bind(iso_timestamp(&record.timestamp))
            .bind(additional_info)
            .bind(&record.source)
            .bind(&record.date)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_files(&self) -> StoreResult<Vec<LogFileSummary>> {
        let rows: Vec<(String, String, String, i64)> = sqlx::query_as(
            r"
            SELECT name, date, last_modified, size_bytes
            FROM log_files
            ORDER BY last_modified ASC, name ASC
            ",
        )
        .fetch_all(self.pool())
        .await?;

        rows.into_iter()
            .map(|(name, date, last_modified, size_bytes)| {
                Ok(LogFileSummary {
                    name,
                    date,
                    last_modified: parse_timestamp(&last_modified)?,
                    size_bytes: u64::try_from(size_bytes).unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn get_file(&self, name: &str) -> StoreResult<Option<LogFile>> {
        let row: Option<(String, String, String, String, i64)> = sqlx::query_as(
            "SELECT name, date, content, last_modified, size_bytes FROM log_files WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(self.pool())
        .await?;

        row.map(|(name, date, content, last_modified, size_bytes)| {
            Ok(LogFile {
                name,
                date,
                content,
                last_modified: parse_timestamp(&last_modified)?,
                size_bytes: u64::try_from(size_bytes).unwrap_or_default(),
            })
        })
        .transpose()
    }

    async fn delete_file(&self, name: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM log_files WHERE name = ?")
            .bind(name)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn entry_dates(&self) -> StoreResult<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT date FROM log_entries ORDER BY date ASC")
                .fetch_all(self.pool())
                .await?;
        Ok(rows.into_iter().map(|(date,)| date).collect())
    }

    async fn delete_entries_except(&self, keep: &[String]) -> StoreResult<u64> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM log_entries");
        if !keep.is_empty() {
            builder.push(" WHERE date NOT IN (");
            let mut separated = builder.separated(", ");
            for date in keep {
                separated.push_bind(date);
            }
            separated.push_unseparated(")");
        }
        let result = builder.build().execute(self.pool()).await?;
        Ok(result.rows_affected())
    }

    async fn query_entries(&self, query: &EntryQuery) -> StoreResult<Vec<LogRecord>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, message, level, timestamp, additional_info, source, date FROM log_entries WHERE 1 = 1",
        );
        if let Some(level) = query.level {
            builder.push(" AND level = ");
            builder.push_bind(i64::from(level.ordinal()));
        }
        if let Some(date) = &query.date {
            builder.push(" AND date = ");
            builder.push_bind(date);
        }
        if let Some(source) = &query.source {
            builder.push(" AND source = ");
            builder.push_bind(source);
        }
        builder.push(" ORDER BY id ASC");
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(to_i64(limit as u64));
        }

        let rows: Vec<RecordRow> = builder.build_query_as().fetch_all(self.pool()).await?;
        rows.into_iter().map(record_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::LogEntry;
    use crate::domain::ports::FileAppend;
    use chrono::TimeZone;
    use serde_json::json;

    async fn memory_store() -> SqliteLogStore {
        SqliteLogStore::open("sqlite::memory:")
            .await
            .expect("failed to open store")
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    fn append(date: &str, chunk: &str, modified_at: DateTime<Utc>) -> FileAppend {
        FileAppend {
            name: LogFile::name_for_date(date),
            date: date.to_string(),
            chunk: chunk.to_string(),
            modified_at,
        }
    }

    #[test]
    fn test_cap_content_drops_oldest_lines() {
        let content = "aaaa\nbbbb\ncccc\n".to_string();
        assert_eq!(cap_content(content.clone(), 0), content);
        assert_eq!(cap_content(content.clone(), 100), content);
        assert_eq!(cap_content(content.clone(), 10), "bbbb\ncccc\n");
        assert_eq!(cap_content(content, 2), "cccc\n");
    }

    #[tokio::test]
    async fn test_append_creates_then_extends_file() {
        let store = memory_store().await;

        let first = WriteBatch {
            appends: vec![append("2025-06-01", "one\n", at(1, 1))],
            records: vec![],
            max_file_size: 0,
        };
        store.write_batch(&first).await.unwrap();

        let second = WriteBatch {
            appends: vec![append("2025-06-01", "two\n", at(1, 2))],
            records: vec![],
            max_file_size: 0,
        };
        store.write_batch(&second).await.unwrap();

        let file = store.get_file("app_2025-06-01.log").await.unwrap().unwrap();
        assert_eq!(file.content, "one\ntwo\n");
        assert_eq!(file.size_bytes, 8);
        assert_eq!(file.last_modified, at(1, 2));
    }

    #[tokio::test]
    async fn test_records_round_trip_in_insert_order() {
        let store = memory_store().await;
        let entries = [
            LogEntry::new(Severity::Info, "A.one", "first", Some(json!({"k": 1})), at(2, 1)),
            LogEntry::new(Severity::Error, "B.two", "second", None, at(2, 2)),
            LogEntry::new(Severity::Info, "A.one", "third", None, at(3, 1)),
        ];
        let batch = WriteBatch {
            appends: vec![],
            records: entries.iter().map(LogEntry::to_record).collect(),
            max_file_size: 0,
        };
        store.write_batch(&batch).await.unwrap();

        let all = store.query_entries(&EntryQuery::default()).await.unwrap();
        let messages: Vec<_> = all.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, ["first", "second", "third"]);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(all[0].additional_info, Some(json!({"k": 1})));

        let by_source = store
            .query_entries(&EntryQuery {
                source: Some("A.one".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_source.len(), 2);

        let by_level_and_date = store
            .query_entries(&EntryQuery {
                level: Some(Severity::Info),
                date: Some("2025-06-03".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_level_and_date.len(), 1);
        assert_eq!(by_level_and_date[0].message, "third");

        let limited = store
            .query_entries(&EntryQuery {
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_list_files_orders_by_last_modified() {
        let store = memory_store().await;
        let batch = WriteBatch {
            appends: vec![
                append("2025-06-05", "x\n", at(9, 0)),
                append("2025-06-04", "y\n", at(7, 0)),
                append("2025-06-06", "z\n", at(8, 0)),
            ],
            records: vec![],
            max_file_size: 0,
        };
        store.write_batch(&batch).await.unwrap();

        let names: Vec<_> = store
            .list_files()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.date)
            .collect();
        assert_eq!(names, ["2025-06-04", "2025-06-06", "2025-06-05"]);
    }

    #[tokio::test]
    async fn test_delete_entries_except() {
        let store = memory_store().await;
        let records = (1..=3)
            .map(|day| LogEntry::new(Severity::Info, "S", "m", None, at(day, 0)).to_record())
            .collect();
        store
            .write_batch(&WriteBatch {
                appends: vec![],
                records,
                max_file_size: 0,
            })
            .await
            .unwrap();

        let removed = store
            .delete_entries_except(&["2025-06-02".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.entry_dates().await.unwrap(), ["2025-06-02"]);

        let removed = store.delete_entries_except(&[]).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.entry_dates().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_file() {
        let store = memory_store().await;
        store
            .write_batch(&WriteBatch {
                appends: vec![append("2025-06-01", "a\n", at(1, 0))],
                records: vec![],
                max_file_size: 0,
            })
            .await
            .unwrap();
        assert!(store.delete_file("app_2025-06-01.log").await.unwrap());
        assert!(!store.delete_file("app_2025-06-01.log").await.unwrap());
        assert!(store.list_files().await.unwrap().is_empty());
    }
}
