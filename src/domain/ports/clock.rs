//! Wall-clock port

use chrono::{DateTime, Utc};

/// Wall-clock source used to stamp entries and file modification times
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}
