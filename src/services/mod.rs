//! Service layer: the logger facade

pub mod logger_service;

pub use logger_service::{Logger, LoggerBuilder, LoggerStats};
