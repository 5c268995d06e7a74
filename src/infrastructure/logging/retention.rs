//! Retention sweep over persisted day files
//!
//! Keeps the `max_files` most recently modified day files and removes
//! indexed entries whose date no longer has a retained file.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::domain::errors::StoreResult;
use crate::domain::ports::LogStore;

/// Outcome of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Names of the day files removed, oldest first
    pub files_deleted: Vec<String>,
    /// Indexed records removed with those files
    pub entries_deleted: u64,
    /// Day files left in the store
    pub files_retained: usize,
}

impl SweepReport {
    /// Whether the sweep removed nothing
    pub fn is_noop(&self) -> bool {
        self.files_deleted.is_empty() && self.entries_deleted == 0
    }
}

/// Keeps the most recently modified day files up to a cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    max_files: usize,
}

impl RetentionPolicy {
    /// A zero cap is treated as one so today's file always survives.
    pub fn new(max_files: usize) -> Self {
        Self {
            max_files: max_files.max(1),
        }
    }

    /// Number of day files kept
    pub const fn max_files(&self) -> usize {
        self.max_files
    }

    /// Apply the policy. Running it again without new writes is a no-op.
    pub async fn sweep(&self, store: &dyn LogStore) -> StoreResult<SweepReport> {
        let files = store.list_files().await?;
        let excess = files.len().saturating_sub(self.max_files);

        let mut report = SweepReport::default();
        for file in &files[..excess] {
            if store.delete_file(&file.name).await? {
                report.files_deleted.push(file.name.clone());
            }
        }

        let retained: BTreeSet<String> = files[excess..].iter().map(|f| f.date.clone()).collect();
        report.files_retained = files.len() - excess;

        let dates = store.entry_dates().await?;
        if dates.iter().any(|d| !retained.contains(d)) {
            let keep: Vec<String> = retained.into_iter().collect();
            report.entries_deleted = store.delete_entries_except(&keep).await?;
        }

        if report.is_noop() {
            debug!(files = report.files_retained, "retention sweep found nothing to remove");
        } else {
            info!(
                files_deleted = report.files_deleted.len(),
                entries_deleted = report.entries_deleted,
                files_retained = report.files_retained,
                "retention sweep removed old logs"
            );
        }
        Ok(report)
    }
}
