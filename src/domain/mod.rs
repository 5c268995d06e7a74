//! Domain layer for the logging pipeline
//!
//! Severity, entries, configuration and the port traits the infrastructure
//! adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{LoggerError, StoreError, StoreResult};
