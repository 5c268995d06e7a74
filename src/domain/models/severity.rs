//! Log severity levels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered log severity.
///
/// `Off` is a sentinel: used as a minimum level it disables every log call,
/// and no entry is ever created with it.
///
/// On the wire a severity travels as its ordinal (`Trace = 0` .. `Off = 6`).
///
/// # Examples
///
/// ```
/// use applog::domain::models::Severity;
///
/// assert!(Severity::Error > Severity::Info);
/// assert_eq!(Severity::Warn.ordinal(), 3);
/// assert_eq!("fatal".parse::<Severity>().unwrap(), Severity::Fatal);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Severity {
    /// Finest-grained tracing
    Trace = 0,
    /// Development diagnostics
    Debug = 1,
    /// Normal operation
    Info = 2,
    /// Something unexpected but recoverable
    Warn = 3,
    /// A failed operation
    Error = 4,
    /// The application cannot continue
    Fatal = 5,
    /// Disables logging; never attached to an entry
    Off = 6,
}

impl Severity {
    /// Every severity, lowest first.
    pub const ALL: [Self; 7] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Fatal,
        Self::Off,
    ];

    /// Upper-case level name as it appears in formatted lines
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
            Self::Off => "OFF",
        }
    }

    /// Wire ordinal, `Trace = 0` to `Off = 6`
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Console color associated with the level.
    pub const fn color(self) -> LevelColor {
        match self {
            Self::Trace => LevelColor::Gray,
            Self::Debug => LevelColor::Blue,
            Self::Info => LevelColor::Green,
            Self::Warn => LevelColor::Orange,
            Self::Error => LevelColor::Red,
            Self::Fatal => LevelColor::Purple,
            Self::Off => LevelColor::Black,
        }
    }

    /// Whether entries of this level may be shipped to the remote endpoint
    pub fn is_remotable(self) -> bool {
        self >= Self::Info && self != Self::Off
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name or ordinal is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseSeverityError {
    /// Not a level name
    #[error("unknown log level name: {0}")]
    UnknownName(String),

    /// Not a level ordinal
    #[error("unknown log level ordinal: {0}")]
    UnknownOrdinal(u8),
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            "off" => Ok(Self::Off),
            _ => Err(ParseSeverityError::UnknownName(s.to_string())),
        }
    }
}

impl From<Severity> for u8 {
    fn from(level: Severity) -> Self {
        level.ordinal()
    }
}

impl TryFrom<u8> for Severity {
    type Error = ParseSeverityError;

    fn try_from(value: u8) -> Result<Self, ParseSeverityError> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(ParseSeverityError::UnknownOrdinal(value))
    }
}

/// Named console colors, one per severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelColor {
    /// TRACE
    Gray,
    /// DEBUG
    Blue,
    /// INFO
    Green,
    /// WARN
    Orange,
    /// ERROR
    Red,
    /// FATAL
    Purple,
    /// OFF
    Black,
}

impl LevelColor {
    /// Lower-case color name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Purple => "purple",
            Self::Black => "black",
        }
    }

    /// 256-color terminal palette index
    pub const fn ansi256(self) -> u8 {
        match self {
            Self::Gray => 245,
            Self::Blue => 33,
            Self::Green => 34,
            Self::Orange => 208,
            Self::Red => 196,
            Self::Purple => 129,
            Self::Black => 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_total() {
        for pair in Severity::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_parse_names_case_insensitive() {
        assert_eq!("TRACE".parse::<Severity>().unwrap(), Severity::Trace);
        assert_eq!("Debug".parse::<Severity>().unwrap(), Severity::Debug);
        assert_eq!(" warn ".parse::<Severity>().unwrap(), Severity::Warn);
        assert_eq!("off".parse::<Severity>().unwrap(), Severity::Off);
        assert!(matches!(
            "verbose".parse::<Severity>(),
            Err(ParseSeverityError::UnknownName(_))
        ));
    }

    #[test]
    fn test_serializes_as_ordinal() {
        assert_eq!(serde_json::to_value(Severity::Error).unwrap(), serde_json::json!(4));
        let level: Severity = serde_json::from_value(serde_json::json!(2)).unwrap();
        assert_eq!(level, Severity::Info);
        assert!(serde_json::from_value::<Severity>(serde_json::json!(9)).is_err());
    }

    #[test]
    fn test_try_from_ordinal() {
        assert_eq!(Severity::try_from(4_u8), Ok(Severity::Error));
        assert_eq!(Severity::try_from(6_u8), Ok(Severity::Off));
        assert_eq!(
            Severity::try_from(7_u8),
            Err(ParseSeverityError::UnknownOrdinal(7))
        );
    }

    #[test]
    fn test_colors() {
        let names: Vec<_> = Severity::ALL[..6].iter().map(|l| l.color().name()).collect();
        assert_eq!(names, ["gray", "blue", "green", "orange", "red", "purple"]);
    }

    #[test]
    fn test_remotable_levels() {
        assert!(!Severity::Trace.is_remotable());
        assert!(!Severity::Debug.is_remotable());
        assert!(Severity::Info.is_remotable());
        assert!(Severity::Fatal.is_remotable());
    }
}
