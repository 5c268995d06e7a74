//! Log entries, persisted records and day files

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::severity::Severity;

/// Source label stored for records whose caller did not supply one
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Format an instant as ISO-8601 with millisecond precision and a `Z` suffix.
pub fn iso_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Calendar date partition (`YYYY-MM-DD`, UTC) of an instant.
pub fn date_partition(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

fn serialize_iso<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&iso_timestamp(at))
}

fn is_empty(s: &str) -> bool {
    s.is_empty()
}

/// A single accepted log call.
///
/// Created once by the logger facade and never mutated afterwards. Sinks
/// receive their own clone. Serializes to the remote wire format:
/// `{message, level, timestamp, additionalInfo?, source?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Message text
    pub message: String,
    /// Severity of the entry
    pub level: Severity,
    /// Creation instant, stamped by the logger's clock
    #[serde(serialize_with = "serialize_iso")]
    pub timestamp: DateTime<Utc>,
    /// Optional structured payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<Value>,
    /// Caller label, e.g. `Component.method`; may be empty
    #[serde(skip_serializing_if = "is_empty")]
    pub source: String,
}

impl LogEntry {
    /// Entry stamped with `timestamp`
    pub fn new(
        level: Severity,
        source: impl Into<String>,
        message: impl Into<String>,
        additional_info: Option<Value>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            message: message.into(),
            level,
            timestamp,
            additional_info,
            source: source.into(),
        }
    }

    /// Date partition (`YYYY-MM-DD`) of the entry's timestamp
    pub fn date(&self) -> String {
        date_partition(&self.timestamp)
    }

    /// Name of the day file this entry belongs to (`app_YYYY-MM-DD.log`).
    pub fn file_name(&self) -> String {
        LogFile::name_for_date(&self.date())
    }

    /// One line of a day file:
    /// `[<timestamp>] [<LEVEL>] <message>` plus ` | <json>` when a payload exists.
    pub fn file_line(&self) -> String {
        let mut line = format!(
            "[{}] [{}] {}",
            iso_timestamp(&self.timestamp),
            self.level,
            self.message
        );
        if let Some(info) = &self.additional_info {
            line.push_str(" | ");
            line.push_str(&info.to_string());
        }
        line
    }

    /// The individually indexed form of this entry
    pub fn to_record(&self) -> LogRecord {
        LogRecord {
            id: None,
            message: self.message.clone(),
            level: self.level,
            timestamp: self.timestamp,
            additional_info: self.additional_info.clone(),
            source: if self.source.is_empty() {
                UNKNOWN_SOURCE.to_string()
            } else {
                self.source.clone()
            },
            date: self.date(),
        }
    }
}

/// Individually indexed persisted entry.
///
/// `id` is the store's strictly increasing key; `None` until inserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// Store key, `None` until inserted
    pub id: Option<i64>,
    /// Message text
    pub message: String,
    /// Severity of the entry
    pub level: Severity,
    /// Creation instant
    #[serde(serialize_with = "serialize_iso")]
    pub timestamp: DateTime<Utc>,
    /// Structured payload, already redacted
    pub additional_info: Option<Value>,
    /// Caller label, `unknown` when the entry had none
    pub source: String,
    /// Date partition, `YYYY-MM-DD`
    pub date: String,
}

/// Day-partitioned log file with its accumulated content
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFile {
    /// `app_YYYY-MM-DD.log`
    pub name: String,
    /// Date partition, `YYYY-MM-DD`
    pub date: String,
    /// Newline-terminated formatted lines
    pub content: String,
    /// Time of the latest append
    #[serde(serialize_with = "serialize_iso")]
    pub last_modified: DateTime<Utc>,
    /// Content length in bytes
    pub size_bytes: u64,
}

impl LogFile {
    /// File name for a date partition
    pub fn name_for_date(date: &str) -> String {
        format!("app_{date}.log")
    }

    /// Metadata of this file without its content
    pub fn summary(&self) -> LogFileSummary {
        LogFileSummary {
            name: self.name.clone(),
            date: self.date.clone(),
            last_modified: self.last_modified,
            size_bytes: self.size_bytes,
        }
    }
}

/// File metadata without content, as listed by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFileSummary {
    /// `app_YYYY-MM-DD.log`
    pub name: String,
    /// Date partition, `YYYY-MM-DD`
    pub date: String,
    /// Time of the latest append
    #[serde(serialize_with = "serialize_iso")]
    pub last_modified: DateTime<Utc>,
    /// Content length in bytes
    pub size_bytes: u64,
}

/// Filter over indexed records. Every field is optional; results come back in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryQuery {
    /// Exact level match
    pub level: Option<Severity>,
    /// Date partition, `YYYY-MM-DD`
    pub date: Option<String>,
    /// Exact source label
    pub source: Option<String>,
    /// Maximum number of records
    pub limit: Option<usize>,
}
