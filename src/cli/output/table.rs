//! Table output for log files and indexed entries using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::{format_size, truncate};
use crate::domain::models::{iso_timestamp, LogFileSummary, LogRecord, Severity};

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    /// Formatter with colors enabled when the terminal supports them
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    /// Formatter with explicit color and width settings
    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Table of day files
    pub fn format_files(&self, files: &[LogFileSummary]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["Name", "Date", "Size", "Last Modified"]));

        for file in files {
            table.add_row(vec![
                Cell::new(&file.name),
                Cell::new(&file.date),
                Cell::new(format_size(file.size_bytes)),
                Cell::new(iso_timestamp(&file.last_modified)),
            ]);
        }
        table.to_string()
    }

    /// Table of indexed records, colored by level
    pub fn format_entries(&self, records: &[LogRecord]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["ID", "Timestamp", "Level", "Source", "Message"]));

        for record in records {
            let level = if self.use_colors {
                Cell::new(record.level).fg(level_color(record.level))
            } else {
                Cell::new(record.level)
            };
            table.add_row(vec![
                Cell::new(record.id.map_or_else(|| "-".to_string(), |id| id.to_string())),
                Cell::new(iso_timestamp(&record.timestamp)),
                level,
                Cell::new(truncate(&record.source, 32)),
                Cell::new(truncate(&record.message, 60)),
            ]);
        }
        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
        .collect()
}

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

const fn level_color(level: Severity) -> Color {
    match level {
        Severity::Trace => Color::Grey,
        Severity::Debug => Color::Blue,
        Severity::Info => Color::Green,
        Severity::Warn => Color::Yellow,
        Severity::Error => Color::Red,
        Severity::Fatal => Color::Magenta,
        Severity::Off => Color::Black,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_files() {
        let files = vec![LogFileSummary {
            name: "app_2025-01-02.log".to_string(),
            date: "2025-01-02".to_string(),
            last_modified: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            size_bytes: 2048,
        }];
        let output = TableFormatter::with_config(false, None).format_files(&files);
        assert!(output.contains("app_2025-01-02.log"));
        assert!(output.contains("2.0 KiB"));
    }

    #[test]
    fn test_format_entries() {
        let record = LogRecord {
            id: Some(7),
            message: "saved".to_string(),
            level: Severity::Warn,
            timestamp: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            additional_info: None,
            source: "Profile.save".to_string(),
            date: "2025-01-02".to_string(),
        };
        let output = TableFormatter::with_config(false, Some(160)).format_entries(&[record]);
        assert!(output.contains("WARN"));
        assert!(output.contains("Profile.save"));
        assert!(output.contains("saved"));
    }
}
