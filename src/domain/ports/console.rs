//! Console output port

use crate::domain::models::LevelColor;

/// Output channel of the process console.
///
/// `Log` is the general-purpose channel used for trace/debug output in
/// interactive development, where the debug channel is often hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleChannel {
    /// General output
    Log,
    /// Debug channel, often hidden by default
    Debug,
    /// Informational channel
    Info,
    /// Warning channel
    Warn,
    /// Error channel, also used for sink failures
    Error,
}

/// A fully formatted console line plus the color it should be shown in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    /// Channel the line is written to
    pub channel: ConsoleChannel,
    /// Formatted text without a trailing newline
    pub text: String,
    /// Display color
    pub color: LevelColor,
}

/// Destination for console lines.
///
/// Implementations must not panic; write failures are dropped.
pub trait ConsoleWriter: Send + Sync {
    /// Write one line
    fn write(&self, line: &ConsoleLine);
}
