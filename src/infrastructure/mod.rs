//! Infrastructure layer module
//!
//! Adapters behind the domain ports:
//! - `SQLite` log store (sqlx)
//! - `reqwest` transport and the logging interceptor
//! - Console, remote and persistence sinks
//! - Configuration loading (figment)
//! - System and manual clocks

pub mod clock;
pub mod config;
pub mod database;
pub mod http;
pub mod logging;
