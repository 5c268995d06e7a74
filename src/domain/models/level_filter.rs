//! Minimum-level gate

use super::severity::Severity;

/// Accept/reject decision for a log call given the configured minimum level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelFilter {
    minimum: Severity,
}

impl LevelFilter {
    /// Filter accepting `minimum` and above
    pub const fn new(minimum: Severity) -> Self {
        Self { minimum }
    }

    /// Configured minimum level
    pub const fn minimum(&self) -> Severity {
        self.minimum
    }

    /// `level >= minimum`, and never anything when the minimum is `Off`.
    pub fn should_log(&self, level: Severity) -> bool {
        self.minimum != Severity::Off && level >= self.minimum
    }
}

impl Default for LevelFilter {
    fn default() -> Self {
        Self::new(Severity::Debug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gating_matches_ordering_for_every_pair() {
        for minimum in Severity::ALL {
            let filter = LevelFilter::new(minimum);
            for level in Severity::ALL {
                let expected = level >= minimum && minimum != Severity::Off;
                assert_eq!(
                    filter.should_log(level),
                    expected,
                    "minimum={minimum} level={level}"
                );
            }
        }
    }

    #[test]
    fn test_off_rejects_fatal() {
        let filter = LevelFilter::new(Severity::Off);
        assert!(!filter.should_log(Severity::Fatal));
        assert!(!filter.should_log(Severity::Off));
    }

    #[test]
    fn test_trace_minimum_accepts_all_real_levels() {
        let filter = LevelFilter::new(Severity::Trace);
        assert!(filter.should_log(Severity::Trace));
        assert!(filter.should_log(Severity::Fatal));
    }
}
