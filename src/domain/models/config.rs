//! Logger configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::severity::{ParseSeverityError, Severity};

/// Logger configuration, loaded once at startup.
///
/// The facade copies what it needs out of this at construction and at its
/// single `configure` call; it is never replaced while logging is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggerConfig {
    /// Production build flag
    #[serde(default)]
    pub production: bool,

    /// Minimum level name (trace, debug, info, warn, error, fatal, off).
    /// Defaults to warn in production and debug otherwise.
    #[serde(default)]
    pub level: Option<String>,

    /// Endpoint receiving INFO+ entries as JSON POSTs
    #[serde(default)]
    pub remote_logging_url: Option<String>,

    /// Persist entries to the local store
    #[serde(default)]
    pub save_to_file: bool,

    /// Number of day files to retain
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,

    /// Per-day file size cap in bytes
    #[serde(default = "default_max_log_size")]
    pub max_log_size: u64,

    /// Path to the SQLite log store
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Capacity of each asynchronous sink queue (drop-oldest on overflow)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// URL fragment identifying logging traffic the interceptor must ignore
    #[serde(default = "default_log_endpoint_marker")]
    pub log_endpoint_marker: String,

    /// Route trace/debug console output through the general log channel.
    /// Detected from the terminal when unset.
    #[serde(default)]
    pub interactive: Option<bool>,

    /// The crate's own tracing output
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Output format of internal diagnostics
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticsFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Settings for the tracing subscriber installed by the binary.
///
/// Internal diagnostics never pass through the leveled logger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosticsConfig {
    /// Default filter directive (trace, debug, info, warn, error);
    /// `RUST_LOG` takes precedence
    #[serde(default = "default_diagnostics_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: DiagnosticsFormat,

    /// Also write JSON diagnostics to a daily file in this directory
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_diagnostics_level() -> String {
    "warn".to_string()
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            level: default_diagnostics_level(),
            format: DiagnosticsFormat::default(),
            log_dir: None,
        }
    }
}

const fn default_max_log_files() -> usize {
    5
}

const fn default_max_log_size() -> u64 {
    10 * 1024 * 1024
}

fn default_database_path() -> String {
    ".applog/logs.db".to_string()
}

const fn default_queue_capacity() -> usize {
    10_000
}

fn default_log_endpoint_marker() -> String {
    "/logs".to_string()
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            production: false,
            level: None,
            remote_logging_url: None,
            save_to_file: false,
            max_log_files: default_max_log_files(),
            max_log_size: default_max_log_size(),
            database_path: default_database_path(),
            queue_capacity: default_queue_capacity(),
            log_endpoint_marker: default_log_endpoint_marker(),
            interactive: None,
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl LoggerConfig {
    /// Minimum level, falling back to the build-mode default.
    pub fn minimum_level(&self) -> Result<Severity, ParseSeverityError> {
        match &self.level {
            Some(name) => name.parse(),
            None if self.production => Ok(Severity::Warn),
            None => Ok(Severity::Debug),
        }
    }

    /// `production` or `development`
    pub const fn environment_name(&self) -> &'static str {
        if self.production {
            "production"
        } else {
            "development"
        }
    }
}

/// Optional overrides accepted by `Logger::configure`.
///
/// Unset fields keep their current value; a zero count or size is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigureOptions {
    /// Turn file logging on or off
    pub save_to_file: Option<bool>,
    /// New retention cap on day files
    pub max_log_files: Option<usize>,
    /// New size cap on a single day file, in bytes
    pub max_log_size: Option<u64>,
}
