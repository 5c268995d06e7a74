//! Applog - leveled application logging
//!
//! Entries pass a minimum-level gate and fan out to three sinks: the
//! console, a remote collector (INFO and above), and a local `SQLite`
//! store with day-partitioned files and bounded retention. Payloads bound
//! for the remote collector or the store are redacted first. An HTTP
//! interceptor records outgoing requests through the same logger.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): severity, entries, configuration, port traits
//! - **Service Layer** (`services`): the `Logger` facade
//! - **Infrastructure Layer** (`infrastructure`): sinks, store, transport
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use applog::{Logger, LoggerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let logger = Logger::from_config(LoggerConfig::default())?;
//!     logger.error("Billing.charge", "card declined", None);
//!     logger.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{LoggerError, StoreError};
pub use domain::models::{
    ConfigureOptions, HttpErrorResponse, HttpRequest, HttpResponse, LevelFilter, LogEntry,
    LoggerConfig, Severity,
};
pub use domain::ports::{Clock, ConsoleWriter, HttpTransport, LogStore};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::http::{LoggingInterceptor, ReqwestTransport};
pub use services::{Logger, LoggerBuilder, LoggerStats};
