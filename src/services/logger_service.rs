//! Leveled logger facade
//!
//! Every accepted call becomes one immutable `LogEntry` that is written to
//! the console in-line and handed by value to the remote and persistence
//! sinks, which run on their own worker tasks. No sink failure reaches the
//! caller.

use reqwest::Url;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::domain::errors::{LoggerError, StoreError};
use crate::domain::models::{
    ConfigureOptions, LevelFilter, LogEntry, LoggerConfig, Severity,
};
use crate::domain::ports::{Clock, ConsoleWriter, HttpTransport, LogStore};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::database::SqliteLogStore;
use crate::infrastructure::http::ReqwestTransport;
use crate::infrastructure::logging::persistence::DEFAULT_REDRAIN_DELAY;
use crate::infrastructure::logging::redaction::{redact_entry, to_payload};
use crate::infrastructure::logging::{
    ConsoleSink, PersistenceSettings, PersistenceSink, RemoteSink, TerminalConsole,
};

/// Queue counters of the asynchronous sinks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerStats {
    /// Whether a remote endpoint is configured
    pub remote_enabled: bool,
    /// Entries waiting to be sent
    pub remote_pending: usize,
    /// Entries discarded before sending
    pub remote_dropped: u64,
    /// Whether file logging is active
    pub persistence_enabled: bool,
    /// Entries waiting for the next drain pass
    pub persistence_pending: usize,
    /// Entries discarded before persisting
    pub persistence_dropped: u64,
}

/// Builder wiring the logger to its collaborators.
///
/// Anything left unset falls back to the production implementation: the
/// terminal console, a `reqwest` transport, the `SQLite` store at
/// `database_path`, and the system clock.
pub struct LoggerBuilder {
    config: LoggerConfig,
    console: Option<Arc<dyn ConsoleWriter>>,
    transport: Option<Arc<dyn HttpTransport>>,
    store: Option<Arc<dyn LogStore>>,
    clock: Option<Arc<dyn Clock>>,
    runtime: Option<Handle>,
    redrain_delay: Duration,
}

impl LoggerBuilder {
    /// Builder for `config` with every collaborator unset
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            config,
            console: None,
            transport: None,
            store: None,
            clock: None,
            runtime: None,
            redrain_delay: DEFAULT_REDRAIN_DELAY,
        }
    }

    /// Console writer; defaults to the terminal
    #[must_use]
    pub fn console(mut self, console: Arc<dyn ConsoleWriter>) -> Self {
        self.console = Some(console);
        self
    }

    /// Transport for the remote sink
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Store for the persistence sink
    #[must_use]
    pub fn store(mut self, store: Arc<dyn LogStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Time source for entry timestamps
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Runtime hosting the sink workers; defaults to the current one
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Pause between drain passes
    #[must_use]
    pub const fn redrain_delay(mut self, delay: Duration) -> Self {
        self.redrain_delay = delay;
        self
    }

    /// Validate the configuration and start the configured sinks.
    pub fn build(self) -> Result<Logger, LoggerError> {
        let minimum = self.config.minimum_level()?;
        if let Some(url) = &self.config.remote_logging_url {
            validate_endpoint(url)?;
        }

        let (writer, detected_interactive): (Arc<dyn ConsoleWriter>, bool) = match self.console
        {
            Some(writer) => (writer, false),
            None => {
                let terminal = TerminalConsole::new();
                let interactive = terminal.is_interactive();
                (Arc::new(terminal), interactive)
            }
        };
        let interactive = self
            .config
            .interactive
            .unwrap_or(!self.config.production && detected_interactive);
        let console = ConsoleSink::new(writer, interactive, self.config.production);

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        let runtime = self.runtime.or_else(|| Handle::try_current().ok());
        let store: Option<Arc<dyn LogStore>> = match self.store {
            Some(store) => Some(store),
            None if self.config.save_to_file => {
                let store = open_default_store(&self.config.database_path, runtime.as_ref())?;
                if store.is_none() {
                    console.report_failure("Error setting up file logging", &NO_RUNTIME);
                }
                store
            }
            None => None,
        };

        let mut logger = Logger {
            filter: LevelFilter::new(minimum),
            console,
            remote: None,
            persistence: None,
            transport,
            store,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock::new())),
            runtime,
            redrain_delay: self.redrain_delay,
            config: self.config,
        };
        logger.start_sinks();
        Ok(logger)
    }
}

const NO_RUNTIME: &str = "no tokio runtime available";

/// Lazily opened store at `path`. The pool starts a maintenance task on
/// creation, so without a runtime no store is opened.
fn open_default_store(
    path: &str,
    runtime: Option<&Handle>,
) -> Result<Option<Arc<dyn LogStore>>, StoreError> {
    let Some(runtime) = runtime else {
        return Ok(None);
    };
    let _guard = runtime.enter();
    Ok(Some(Arc::new(SqliteLogStore::open_lazy(path)?)))
}

fn validate_endpoint(url: &str) -> Result<(), LoggerError> {
    Url::parse(url)
        .map(|_| ())
        .map_err(|e| LoggerError::InvalidRemoteUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })
}

/// The public logging entry point.
///
/// Configure it once at startup through `&mut self`, then share it as
/// `Arc<Logger>`; the severity methods only need `&self`.
pub struct Logger {
    filter: LevelFilter,
    console: ConsoleSink,
    remote: Option<RemoteSink>,
    persistence: Option<PersistenceSink>,
    transport: Arc<dyn HttpTransport>,
    store: Option<Arc<dyn LogStore>>,
    clock: Arc<dyn Clock>,
    runtime: Option<Handle>,
    redrain_delay: Duration,
    config: LoggerConfig,
}

impl Logger {
    /// Start a builder for `config`
    pub fn builder(config: LoggerConfig) -> LoggerBuilder {
        LoggerBuilder::new(config)
    }

    /// Logger with the default collaborators for `config`
    pub fn from_config(config: LoggerConfig) -> Result<Self, LoggerError> {
        LoggerBuilder::new(config).build()
    }

    /// Replace the level and remote endpoint, apply `options`, and restart
    /// the asynchronous sinks.
    ///
    /// Meant to be called once during application start-up, before any
    /// business logic logs. Entries already queued by replaced sinks are
    /// still delivered by their workers.
    pub fn configure(
        &mut self,
        level: Severity,
        remote_endpoint: Option<String>,
        options: ConfigureOptions,
    ) -> Result<(), LoggerError> {
        let remote_endpoint = remote_endpoint.filter(|url| !url.is_empty());
        if let Some(url) = &remote_endpoint {
            validate_endpoint(url)?;
        }

        self.filter = LevelFilter::new(level);
        self.config.level = Some(level.as_str().to_lowercase());
        self.config.remote_logging_url = remote_endpoint;
        if let Some(save) = options.save_to_file {
            self.config.save_to_file = save;
        }
        if let Some(files) = options.max_log_files.filter(|n| *n > 0) {
            self.config.max_log_files = files;
        }
        if let Some(size) = options.max_log_size.filter(|n| *n > 0) {
            self.config.max_log_size = size;
        }

        if self.config.save_to_file && self.store.is_none() {
            match open_default_store(&self.config.database_path, self.runtime.as_ref()) {
                Ok(Some(store)) => self.store = Some(store),
                Ok(None) => self
                    .console
                    .report_failure("Error setting up file logging", &NO_RUNTIME),
                Err(e) => self
                    .console
                    .report_failure("Error setting up file logging", &e),
            }
        }

        self.start_sinks();
        debug!(
            level = %level,
            remote = self.remote.is_some(),
            persistence = self.persistence.is_some(),
            "logger reconfigured"
        );
        Ok(())
    }

    fn start_sinks(&mut self) {
        self.remote = None;
        self.persistence = None;

        let wants_remote = self.config.remote_logging_url.is_some();
        let wants_persistence = self.config.save_to_file && self.store.is_some();
        if !wants_remote && !wants_persistence {
            return;
        }
        let Some(runtime) = self.runtime.clone() else {
            self.console
                .report_failure("Asynchronous log sinks disabled", &NO_RUNTIME);
            return;
        };

        if let Some(endpoint) = self.config.remote_logging_url.clone() {
            self.remote = Some(RemoteSink::spawn(
                endpoint,
                self.transport.clone(),
                self.console.clone(),
                self.config.queue_capacity,
                &runtime,
            ));
        }

        if let (true, Some(store)) = (self.config.save_to_file, self.store.clone()) {
            let settings = PersistenceSettings {
                max_files: self.config.max_log_files,
                max_file_size: self.config.max_log_size,
                capacity: self.config.queue_capacity,
                redrain_delay: self.redrain_delay,
            };
            self.persistence = Some(PersistenceSink::spawn(
                store,
                self.console.clone(),
                self.clock.clone(),
                settings,
                &runtime,
            ));
        }
    }

    /// Whether a call at `level` would be accepted
    pub fn should_log(&self, level: Severity) -> bool {
        self.filter.should_log(level)
    }

    /// Minimum accepted level
    pub const fn minimum_level(&self) -> Severity {
        self.filter.minimum()
    }

    /// Configuration the logger was built with
    pub const fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Store behind the persistence sink, if file logging is set up
    pub fn store(&self) -> Option<Arc<dyn LogStore>> {
        self.store.clone()
    }

    /// Log at `level`. `Off` is never accepted.
    pub fn log(
        &self,
        level: Severity,
        source: &str,
        message: impl Into<String>,
        additional_info: Option<Value>,
    ) {
        if !self.filter.should_log(level) || level == Severity::Off {
            return;
        }
        let entry = LogEntry::new(level, source, message, additional_info, self.clock.now());
        self.console.emit(&entry);

        if self.remote.is_none() && self.persistence.is_none() {
            return;
        }
        let outbound = redact_entry(&entry);
        if let Some(remote) = &self.remote {
            remote.emit(outbound.clone());
        }
        if let Some(persistence) = &self.persistence {
            persistence.persist(outbound);
        }
    }

    /// Log with any serializable payload. A payload that fails to serialize
    /// is replaced by a placeholder.
    pub fn log_with<T: Serialize + ?Sized>(
        &self,
        level: Severity,
        source: &str,
        message: impl Into<String>,
        payload: &T,
    ) {
        if self.filter.should_log(level) {
            self.log(level, source, message, Some(to_payload(payload)));
        }
    }

    /// Log at TRACE
    pub fn trace(&self, source: &str, message: impl Into<String>, additional_info: Option<Value>) {
        self.log(Severity::Trace, source, message, additional_info);
    }

    /// Log at DEBUG
    pub fn debug(&self, source: &str, message: impl Into<String>, additional_info: Option<Value>) {
        self.log(Severity::Debug, source, message, additional_info);
    }

    /// Log at INFO
    pub fn info(&self, source: &str, message: impl Into<String>, additional_info: Option<Value>) {
        self.log(Severity::Info, source, message, additional_info);
    }

    /// Log at WARN
    pub fn warn(&self, source: &str, message: impl Into<String>, additional_info: Option<Value>) {
        self.log(Severity::Warn, source, message, additional_info);
    }

    /// Log at ERROR
    pub fn error(&self, source: &str, message: impl Into<String>, additional_info: Option<Value>) {
        self.log(Severity::Error, source, message, additional_info);
    }

    /// Log at FATAL
    pub fn fatal(&self, source: &str, message: impl Into<String>, additional_info: Option<Value>) {
        self.log(Severity::Fatal, source, message, additional_info);
    }

    /// Log an unhandled error at ERROR with its type name and cause chain.
    pub fn report_error<E: std::error::Error + ?Sized>(&self, source: &str, error: &E) {
        let name = std::any::type_name::<E>();
        let mut chain = Vec::new();
        let mut cause = error.source();
        while let Some(inner) = cause {
            chain.push(inner.to_string());
            cause = inner.source();
        }
        self.error(
            source,
            format!("{name}: {error}"),
            Some(json!({
                "name": name,
                "message": error.to_string(),
                "chain": chain,
            })),
        );
    }

    /// Log the start-up line with the crate version and build environment.
    pub fn announce_startup(&self) {
        self.info(
            "Application",
            "Application initialized",
            Some(json!({
                "version": env!("CARGO_PKG_VERSION"),
                "environment": self.config.environment_name(),
            })),
        );
    }

    /// Current queue counters of the asynchronous sinks
    pub fn stats(&self) -> LoggerStats {
        LoggerStats {
            remote_enabled: self.remote.is_some(),
            remote_pending: self.remote.as_ref().map_or(0, RemoteSink::pending),
            remote_dropped: self.remote.as_ref().map_or(0, RemoteSink::dropped),
            persistence_enabled: self.persistence.is_some(),
            persistence_pending: self
                .persistence
                .as_ref()
                .map_or(0, PersistenceSink::pending),
            persistence_dropped: self
                .persistence
                .as_ref()
                .map_or(0, PersistenceSink::dropped),
        }
    }

    /// Wait until everything logged so far has been persisted.
    pub async fn flush(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.flush().await;
        }
    }

    /// Drain both sinks and stop their workers. Later log calls still reach
    /// the console.
    pub async fn shutdown(&self) {
        if let Some(remote) = &self.remote {
            remote.shutdown().await;
        }
        if let Some(persistence) = &self.persistence {
            persistence.shutdown().await;
        }
        info!("logger sinks stopped");
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("minimum", &self.filter.minimum())
            .field("remote", &self.remote.as_ref().map(RemoteSink::endpoint))
            .field("persistence", &self.persistence.is_some())
            .finish_non_exhaustive()
    }
}
