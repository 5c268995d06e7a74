//! Layered configuration loading and validation

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use reqwest::Url;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::LoggerConfig;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `level` is not a level name
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error, fatal, off")]
    InvalidLogLevel(String),

    /// `diagnostics.level` is not a filter directive
    #[error("Invalid diagnostics level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidDiagnosticsLevel(String),

    /// `max_log_files` is zero
    #[error("Invalid max_log_files: {0}. Must be at least 1")]
    InvalidMaxLogFiles(usize),

    /// `max_log_size` is zero
    #[error("Invalid max_log_size: {0}. Must be at least 1 byte")]
    InvalidMaxLogSize(u64),

    /// `queue_capacity` is zero
    #[error("Invalid queue_capacity: {0}. Must be at least 1")]
    InvalidQueueCapacity(usize),

    /// `database_path` is empty
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    /// `remote_logging_url` is not an absolute http(s) URL
    #[error("Invalid remote_logging_url {url}: {reason}")]
    InvalidRemoteUrl {
        /// The rejected value
        url: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .applog/config.yaml (project config)
    /// 3. .applog/local.yaml (local overrides, optional)
    /// 4. `extra`, when given (e.g. `--config`)
    /// 5. Environment variables (`APPLOG_*`, nested keys split on `__`)
    pub fn figment(extra: Option<&Path>) -> Figment {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(LoggerConfig::default()))
            .merge(Yaml::file(".applog/config.yaml"))
            .merge(Yaml::file(".applog/local.yaml"));
        if let Some(path) = extra {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed("APPLOG_").split("__"))
    }

    /// Load and validate configuration from the standard locations
    pub fn load() -> Result<LoggerConfig> {
        Self::load_with(None)
    }

    /// Load and validate configuration with an optional extra YAML layer
    pub fn load_with(extra: Option<&Path>) -> Result<LoggerConfig> {
        let config: LoggerConfig = Self::figment(extra)
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, ignoring other layers
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<LoggerConfig> {
        let config: LoggerConfig = Figment::new()
            .merge(Serialized::defaults(LoggerConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &LoggerConfig) -> Result<(), ConfigError> {
        if config.minimum_level().is_err() {
            return Err(ConfigError::InvalidLogLevel(
                config.level.clone().unwrap_or_default(),
            ));
        }

        let valid_diagnostics_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_diagnostics_levels.contains(&config.diagnostics.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidDiagnosticsLevel(
                config.diagnostics.level.clone(),
            ));
        }

        if config.max_log_files == 0 {
            return Err(ConfigError::InvalidMaxLogFiles(config.max_log_files));
        }

        if config.max_log_size == 0 {
            return Err(ConfigError::InvalidMaxLogSize(config.max_log_size));
        }

        if config.queue_capacity == 0 {
            return Err(ConfigError::InvalidQueueCapacity(config.queue_capacity));
        }

        if config.database_path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if let Some(url) = &config.remote_logging_url {
            Url::parse(url).map_err(|e| ConfigError::InvalidRemoteUrl {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }
}
