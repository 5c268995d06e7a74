//! Embedded `SQLite` storage for day files and indexed records

pub mod connection;
pub mod log_store_repo;

pub use connection::{database_url, DatabaseConnection};
pub use log_store_repo::SqliteLogStore;
