//! `applog files`: inspect persisted day files.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use super::open_store;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{LogFile, LogFileSummary, LoggerConfig};
use crate::domain::ports::LogStore;

/// Arguments of `applog files`
#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Files subcommand
    #[command(subcommand)]
    pub command: FilesCommands,
}

/// Subcommands of `applog files`
#[derive(Subcommand, Debug)]
pub enum FilesCommands {
    /// List day files, least recently modified first
    List,
    /// Print the content of one day file
    Show {
        /// File name, e.g. app_2025-01-31.log
        name: String,
    },
}

/// Listing of persisted day files
#[derive(Debug, Serialize)]
pub struct FileListOutput {
    /// Day files, least recently modified first
    pub files: Vec<LogFileSummary>,
    /// Number of files listed
    pub total: usize,
}

impl CommandOutput for FileListOutput {
    fn to_human(&self) -> String {
        if self.files.is_empty() {
            return "No log files found.".to_string();
        }
        format!(
            "Found {} log file(s):\n{}",
            self.total,
            TableFormatter::new().format_files(&self.files)
        )
    }
}

/// One day file with its content
#[derive(Debug, Serialize)]
pub struct FileShowOutput {
    /// File metadata and content
    #[serde(flatten)]
    pub file: LogFile,
}

impl CommandOutput for FileShowOutput {
    fn to_human(&self) -> String {
        self.file.content.trim_end().to_string()
    }
}

/// List day files or print one of them.
pub async fn execute(args: FilesArgs, config: &LoggerConfig, json_mode: bool) -> Result<()> {
    let store = open_store(config).await?;

    match args.command {
        FilesCommands::List => {
            let files = store.list_files().await.context("Failed to list log files")?;
            let total = files.len();
            output(&FileListOutput { files, total }, json_mode);
        }
        FilesCommands::Show { name } => {
            let file = store
                .get_file(&name)
                .await
                .context("Failed to read log file")?
                .with_context(|| format!("Log file not found: {name}"))?;
            output(&FileShowOutput { file }, json_mode);
        }
    }

    store.close().await;
    Ok(())
}
