//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::entries::EntriesArgs;
use super::commands::emit::EmitArgs;
use super::commands::fetch::FetchArgs;
use super::commands::files::FilesArgs;

/// Command-line interface of the `applog` binary
#[derive(Parser, Debug)]
#[command(name = "applog")]
#[command(about = "Applog - leveled application logging with local retention", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Extra YAML configuration layer, applied below environment variables
    #[arg(short, long, global = true, env = "APPLOG_CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log one entry through the configured sinks
    Emit(EmitArgs),

    /// Inspect persisted day files
    Files(FilesArgs),

    /// Query individually indexed entries
    Entries(EntriesArgs),

    /// Apply the retention policy to the local store
    Sweep,

    /// Perform a GET request through the logging interceptor
    Fetch(FetchArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_emit_with_global_flags() {
        let cli = Cli::try_parse_from([
            "applog", "emit", "error", "Billing.charge", "card declined", "--info",
            r#"{"orderId":5}"#, "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Emit(args) => {
                assert_eq!(args.level, "error");
                assert_eq!(args.source, "Billing.charge");
                assert_eq!(args.info.as_deref(), Some(r#"{"orderId":5}"#));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_fetch_headers() {
        let cli = Cli::try_parse_from([
            "applog",
            "fetch",
            "http://localhost/api",
            "--header",
            "Accept: application/json",
            "-H",
            "X-Trace: 1",
            "--no-log",
        ])
        .unwrap();
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.headers.len(), 2);
                assert!(args.no_log);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
