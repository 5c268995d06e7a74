//! `applog entries`: query indexed records.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use super::open_store;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{EntryQuery, LogRecord, LoggerConfig, Severity};
use crate::domain::ports::LogStore;

/// Arguments of `applog entries`
#[derive(Args, Debug, Default)]
pub struct EntriesArgs {
    /// Only records at this level
    #[arg(short, long)]
    pub level: Option<String>,

    /// Only records in this date partition (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Only records with this source label
    #[arg(short, long)]
    pub source: Option<String>,

    /// Maximum number of records
    #[arg(short = 'n', long, default_value = "50")]
    pub limit: usize,
}

impl EntriesArgs {
    fn to_query(&self) -> Result<EntryQuery> {
        let level = self
            .level
            .as_deref()
            .map(str::parse::<Severity>)
            .transpose()
            .context("Invalid --level")?;
        Ok(EntryQuery {
            level,
            date: self.date.clone(),
            source: self.source.clone(),
            limit: (self.limit > 0).then_some(self.limit),
        })
    }
}

/// Indexed records matching a query
#[derive(Debug, Serialize)]
pub struct EntryListOutput {
    /// Matching records in insertion order
    pub entries: Vec<LogRecord>,
    /// Number of records returned
    pub total: usize,
}

impl CommandOutput for EntryListOutput {
    fn to_human(&self) -> String {
        if self.entries.is_empty() {
            return "No log entries found.".to_string();
        }
        format!(
            "Found {} entr{}:\n{}",
            self.total,
            if self.total == 1 { "y" } else { "ies" },
            TableFormatter::new().format_entries(&self.entries)
        )
    }
}

/// Query indexed records from the local store.
pub async fn execute(args: EntriesArgs, config: &LoggerConfig, json_mode: bool) -> Result<()> {
    let query = args.to_query()?;
    let store = open_store(config).await?;
    let entries = store
        .query_entries(&query)
        .await
        .context("Failed to query log entries")?;
    store.close().await;

    let total = entries.len();
    output(&EntryListOutput { entries, total }, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_from_args() {
        let args = EntriesArgs {
            level: Some("error".to_string()),
            date: Some("2025-01-31".to_string()),
            source: None,
            limit: 10,
        };
        let query = args.to_query().unwrap();
        assert_eq!(query.level, Some(Severity::Error));
        assert_eq!(query.date.as_deref(), Some("2025-01-31"));
        assert_eq!(query.limit, Some(10));
    }

    #[test]
    fn test_zero_limit_means_unbounded() {
        let query = EntriesArgs::default().to_query().unwrap();
        assert_eq!(query.limit, None);
        assert_eq!(query, EntryQuery::default());
    }

    #[test]
    fn test_bad_level_is_rejected() {
        let args = EntriesArgs {
            level: Some("loud".to_string()),
            ..Default::default()
        };
        assert!(args.to_query().is_err());
    }
}
