//! Domain models

pub mod config;
pub mod entry;
pub mod http;
pub mod level_filter;
pub mod severity;

pub use config::{ConfigureOptions, DiagnosticsConfig, DiagnosticsFormat, LoggerConfig};
pub use entry::{
    date_partition, iso_timestamp, EntryQuery, LogEntry, LogFile, LogFileSummary, LogRecord,
    UNKNOWN_SOURCE,
};
pub use http::{HttpErrorResponse, HttpRequest, HttpResponse, RequestBody, RequestContext};
pub use level_filter::LevelFilter;
pub use severity::{LevelColor, ParseSeverityError, Severity};
