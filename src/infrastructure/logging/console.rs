//! Console sink and console writers
//!
//! Formatting is `[<timestamp>] [<LEVEL>] [<source>] <message>`, followed by
//! ` | <json>` when the entry carries a payload. The `[<source>]` segment is
//! omitted for entries without a source.

use console::{Style, Term};
use std::fmt::Display;
use std::sync::{Arc, Mutex};

use super::redaction::sanitize;
use crate::domain::models::{iso_timestamp, LevelColor, LogEntry, Severity};
use crate::domain::ports::{ConsoleChannel, ConsoleLine, ConsoleWriter};

/// Synchronous sink writing every accepted entry to the console
#[derive(Clone)]
pub struct ConsoleSink {
    writer: Arc<dyn ConsoleWriter>,
    interactive: bool,
    redact_payloads: bool,
}

impl ConsoleSink {
    /// `interactive` routes trace/debug through the general log channel;
    /// `redact_payloads` scrubs payloads before display.
    pub fn new(writer: Arc<dyn ConsoleWriter>, interactive: bool, redact_payloads: bool) -> Self {
        Self {
            writer,
            interactive,
            redact_payloads,
        }
    }

    /// Channel a level is written to
    pub const fn channel_for(level: Severity, interactive: bool) -> ConsoleChannel {
        match level {
            Severity::Trace | Severity::Debug if interactive => ConsoleChannel::Log,
            Severity::Trace | Severity::Debug => ConsoleChannel::Debug,
            Severity::Info => ConsoleChannel::Info,
            Severity::Warn => ConsoleChannel::Warn,
            Severity::Error | Severity::Fatal | Severity::Off => ConsoleChannel::Error,
        }
    }

    /// `[<timestamp>] [<LEVEL>] [<source>] <message>` plus ` | <json>` for a payload
    pub fn format_line(&self, entry: &LogEntry) -> String {
        let mut line = format!("[{}] [{}]", iso_timestamp(&entry.timestamp), entry.level);
        if !entry.source.is_empty() {
            line.push_str(" [");
            line.push_str(&entry.source);
            line.push(']');
        }
        line.push(' ');
        line.push_str(&entry.message);

        if let Some(info) = &entry.additional_info {
            let shown = if self.redact_payloads {
                sanitize(info)
            } else {
                info.clone()
            };
            line.push_str(" | ");
            line.push_str(&shown.to_string());
        }
        line
    }

    /// Format and write one entry
    pub fn emit(&self, entry: &LogEntry) {
        let line = ConsoleLine {
            channel: Self::channel_for(entry.level, self.interactive),
            text: self.format_line(entry),
            color: entry.level.color(),
        };
        self.writer.write(&line);
    }

    /// Last-resort reporting for sink failures. Goes to the error channel
    /// only and never back into the pipeline.
    pub fn report_failure(&self, context: &str, error: &dyn Display) {
        self.writer.write(&ConsoleLine {
            channel: ConsoleChannel::Error,
            text: format!("{context}: {error}"),
            color: LevelColor::Red,
        });
    }
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("interactive", &self.interactive)
            .field("redact_payloads", &self.redact_payloads)
            .finish_non_exhaustive()
    }
}

/// Writer for the process terminal.
///
/// Log, debug and info lines go to stdout; warn and error lines to stderr.
/// Colors are applied when the terminal supports them.
#[derive(Debug, Clone)]
pub struct TerminalConsole {
    stdout: Term,
    stderr: Term,
}

impl TerminalConsole {
    /// Writer over the process stdout and stderr
    pub fn new() -> Self {
        Self {
            stdout: Term::stdout(),
            stderr: Term::stderr(),
        }
    }

    /// Whether stdout is attached to an interactive terminal
    pub fn is_interactive(&self) -> bool {
        self.stdout.is_term()
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleWriter for TerminalConsole {
    fn write(&self, line: &ConsoleLine) {
        let term = match line.channel {
            ConsoleChannel::Log | ConsoleChannel::Debug | ConsoleChannel::Info => &self.stdout,
            ConsoleChannel::Warn | ConsoleChannel::Error => &self.stderr,
        };
        let styled = Style::new()
            .color256(line.color.ansi256())
            .apply_to(&line.text);
        let _ = term.write_line(&styled.to_string());
    }
}

/// In-memory writer keeping every line, for tests and embedding
#[derive(Debug, Default)]
pub struct CapturedConsole {
    lines: Mutex<Vec<ConsoleLine>>,
}

impl CapturedConsole {
    /// Empty capture
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line written so far
    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Text of every line written so far
    pub fn texts(&self) -> Vec<String> {
        self.lines().into_iter().map(|l| l.text).collect()
    }

    /// Forget every captured line
    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }
}

impl ConsoleWriter for CapturedConsole {
    fn write(&self, line: &ConsoleLine) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.clone());
        }
    }
}
