use std::fmt;

use chrono::{NaiveDateTime, Timelike};

/// Coarse time-bucket key: a local timestamp truncated to the start of its minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinuteKey(NaiveDateTime);

impl MinuteKey {
    pub fn of(timestamp: NaiveDateTime) -> Self {
        // Seconds and nanoseconds of zero are always valid, so neither call can fail.
        let truncated = timestamp
            .with_second(0)
            .and_then(|value| value.with_nanosecond(0))
            .unwrap_or(timestamp);
        Self(truncated)
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for MinuteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M"))
    }
}
