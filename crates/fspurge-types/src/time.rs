use std::fmt;

use chrono::{DateTime, Utc};

/// `ctime(3)`-style layout without the trailing newline.
const HUMAN_READABLE_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// A wall-clock instant in UTC, at whole-second precision for reporting.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcTime {
    inner: DateTime<Utc>,
}

impl UtcTime {
    pub fn now() -> Self {
        Self { inner: Utc::now() }
    }

    /// Create from whole seconds since the Unix epoch. Values chrono cannot
    /// represent collapse to the epoch.
    pub fn from_timestamp(secs: i64) -> Self {
        Self {
            inner: DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default(),
        }
    }

    /// Seconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.inner.timestamp()
    }

    /// Render as e.g. `Thu Jan  1 00:00:00 1970`.
    pub fn human_readable(&self) -> String {
        self.inner.format(HUMAN_READABLE_FORMAT).to_string()
    }
}

impl fmt::Debug for UtcTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UtcTime({})", self.inner.to_rfc3339())
    }
}

impl fmt::Display for UtcTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.to_rfc3339())
    }
}
