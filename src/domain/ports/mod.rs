//! Port trait definitions
//!
//! Interfaces the logging pipeline consumes from its collaborators:
//! - LogStore: embedded storage for day files and indexed records
//! - HttpTransport: outbound HTTP, wrapped by the interceptor
//! - ConsoleWriter: severity channels of the process console
//! - Clock: wall-clock source

pub mod clock;
pub mod console;
pub mod http_transport;
pub mod log_store;

pub use clock::Clock;
pub use console::{ConsoleChannel, ConsoleLine, ConsoleWriter};
pub use http_transport::HttpTransport;
pub use log_store::{FileAppend, LogStore, WriteBatch};
