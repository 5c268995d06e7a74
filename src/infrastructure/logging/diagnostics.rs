//! Tracing subscriber for the crate's own diagnostics

use anyhow::{Context, Result};
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::domain::models::{DiagnosticsConfig, DiagnosticsFormat};

type Base = Layered<EnvFilter, Registry>;

/// Keeps the non-blocking file writer alive for the life of the process
pub struct DiagnosticsGuard {
    _guard: Option<WorkerGuard>,
}

/// Install the global tracing subscriber for the crate's own diagnostics.
///
/// Output goes to stderr so it never mixes with command output; a daily
/// rolling JSON file is added when `log_dir` is set. `RUST_LOG` overrides
/// the configured level.
///
/// # Errors
/// Returns an error for an unknown level or when a subscriber is already
/// installed.
pub fn init_diagnostics(config: &DiagnosticsConfig) -> Result<DiagnosticsGuard> {
    let default_level = parse_log_level(&config.level)?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(default_level).into())
        .from_env_lossy();

    let stderr_layer: Box<dyn Layer<Base> + Send + Sync> = match config.format {
        DiagnosticsFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_current_span(true)
            .with_target(true)
            .boxed(),
        DiagnosticsFormat::Pretty => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(io::stderr)
            .with_target(true)
            .boxed(),
    };

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = rolling::daily(dir, "applog-diagnostics.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install diagnostics subscriber")?;

    tracing::debug!(
        level = %config.level,
        format = ?config.format,
        file_output = config.log_dir.is_some(),
        "diagnostics initialized"
    );

    Ok(DiagnosticsGuard { _guard: guard })
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid diagnostics level: {level}"),
    }
}
