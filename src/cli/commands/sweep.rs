//! `applog sweep`: apply the retention policy to the local store.

use anyhow::{Context, Result};
use serde::Serialize;

use super::open_store;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::LoggerConfig;
use crate::infrastructure::logging::{RetentionPolicy, SweepReport};

/// Result of a manual retention sweep
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepOutput {
    /// Retention cap the sweep applied
    pub max_log_files: usize,
    /// What the sweep removed
    #[serde(flatten)]
    pub report: SweepReport,
}

impl CommandOutput for SweepOutput {
    fn to_human(&self) -> String {
        if self.report.is_noop() {
            return format!(
                "Nothing to remove ({} file(s) within the limit of {})",
                self.report.files_retained, self.max_log_files
            );
        }
        let mut lines = vec![format!(
            "Removed {} file(s) and {} indexed entr{}",
            self.report.files_deleted.len(),
            self.report.entries_deleted,
            if self.report.entries_deleted == 1 { "y" } else { "ies" }
        )];
        lines.extend(self.report.files_deleted.iter().map(|name| format!("  - {name}")));
        lines.join("\n")
    }
}

/// Apply the retention policy from `config` to the local store.
pub async fn execute(config: &LoggerConfig, json_mode: bool) -> Result<()> {
    let store = open_store(config).await?;
    let report = RetentionPolicy::new(config.max_log_files)
        .sweep(&store)
        .await
        .context("Retention sweep failed")?;
    store.close().await;

    output(
        &SweepOutput {
            max_log_files: config.max_log_files,
            report,
        },
        json_mode,
    );
    Ok(())
}
