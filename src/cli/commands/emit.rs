//! `applog emit`: log one entry through the configured sinks.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{LoggerConfig, Severity};
use crate::services::Logger;

/// Arguments of `applog emit`
#[derive(Args, Debug)]
pub struct EmitArgs {
    /// Level name (trace, debug, info, warn, error, fatal)
    pub level: String,

    /// Caller label, e.g. `Component.method`
    pub source: String,

    /// Message text
    pub message: String,

    /// Additional JSON payload
    #[arg(short, long)]
    pub info: Option<String>,
}

/// What happened to the emitted entry
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitOutput {
    /// Level of the entry
    pub level: Severity,
    /// Source label of the entry
    pub source: String,
    /// Whether the level filter let the entry through
    pub accepted: bool,
    /// Whether a remote endpoint is configured
    pub remote: bool,
    /// Whether the entry was queued for the local store
    pub persisted: bool,
    /// Entries dropped by full sink queues during this run
    pub dropped: u64,
}

impl CommandOutput for EmitOutput {
    fn to_human(&self) -> String {
        if !self.accepted {
            return format!("{} entry filtered out by the configured level", self.level);
        }
        let mut sinks = vec!["console"];
        if self.remote {
            sinks.push("remote");
        }
        if self.persisted {
            sinks.push("local store");
        }
        format!("{} entry sent to {}", self.level, sinks.join(", "))
    }
}

/// Log one entry through a logger built from `config`, then flush and shut it down.
pub async fn execute(args: EmitArgs, config: &LoggerConfig, json_mode: bool) -> Result<()> {
    let level: Severity = args
        .level
        .parse()
        .with_context(|| format!("Invalid level '{}'", args.level))?;
    let info: Option<Value> = args
        .info
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("--info must be valid JSON")?;

    let logger = Logger::from_config(config.clone()).context("Failed to build logger")?;
    let accepted = level != Severity::Off && logger.should_log(level);
    logger.log(level, &args.source, args.message, info);
    logger.flush().await;
    logger.shutdown().await;

    let stats = logger.stats();
    let result = EmitOutput {
        level,
        source: args.source,
        accepted,
        remote: accepted && stats.remote_enabled && level.is_remotable(),
        persisted: accepted && stats.persistence_enabled,
        dropped: stats.remote_dropped + stats.persistence_dropped,
    };
    output(&result, json_mode);
    Ok(())
}
