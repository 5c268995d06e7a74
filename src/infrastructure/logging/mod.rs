//! Logging infrastructure
//!
//! Sinks and support for the leveled logger:
//! - Console sink with severity channels and colors
//! - Remote sink (INFO+ JSON POSTs)
//! - Local persistence sink with a single drain worker
//! - Retention sweep over day files
//! - Redaction of sensitive payload fields
//! - The crate's own tracing diagnostics

pub mod console;
pub mod diagnostics;
pub mod persistence;
pub mod queue;
pub mod redaction;
pub mod remote;
pub mod retention;

pub use console::{CapturedConsole, ConsoleSink, TerminalConsole};
pub use diagnostics::{init_diagnostics, DiagnosticsGuard};
pub use persistence::{PersistenceSettings, PersistenceSink};
pub use queue::{BoundedQueue, PushOutcome};
pub use remote::RemoteSink;
pub use retention::{RetentionPolicy, SweepReport};
