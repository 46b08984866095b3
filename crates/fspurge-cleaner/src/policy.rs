//! Retention policy.

use fspurge_types::UtcTime;

use crate::config::PurgeOptions;

/// Whether a file last accessed at `atime` and last modified at `mtime`
/// may be removed under the cutoff `basis`.
///
/// Both times must be strictly before the cutoff. Zero is an ordinary
/// timestamp here; see [`RetentionPolicy`] for the opt-in that keeps such
/// files.
pub fn is_eligible_for_removal(atime: i64, mtime: i64, basis: i64) -> bool {
    atime < basis && mtime < basis
}

/// The cutoff instant of a run, fixed when the run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RemovalBasisTime(i64);

impl RemovalBasisTime {
    pub fn from_timestamp(secs: i64) -> Self {
        Self(secs)
    }

    /// The explicit cutoff from `options`, or `now` minus the retention
    /// window.
    pub fn resolve(options: &PurgeOptions, now: UtcTime) -> Self {
        match options.explicit_basis_time() {
            Some(secs) => Self(secs),
            None => {
                let window =
                    i64::try_from(options.retention_window().as_secs()).unwrap_or(i64::MAX);
                Self(now.timestamp().saturating_sub(window))
            }
        }
    }

    pub fn timestamp(&self) -> i64 {
        self.0
    }

    pub fn as_utc(&self) -> UtcTime {
        UtcTime::from_timestamp(self.0)
    }
}

/// Outcome of applying the policy to one regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Remove,
    Keep,
}

/// The policy a run applies to every regular file.
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    basis: RemovalBasisTime,
    keep_unset_times: bool,
}

impl RetentionPolicy {
    pub fn new(basis: RemovalBasisTime) -> Self {
        Self {
            basis,
            keep_unset_times: false,
        }
    }

    pub fn from_options(options: &PurgeOptions, now: UtcTime) -> Self {
        Self {
            basis: RemovalBasisTime::resolve(options, now),
            keep_unset_times: options.keep_unset_times,
        }
    }

    /// Treat a zero access or modification time as "never recorded" and
    /// keep the file.
    pub fn keep_unset_times(mut self, keep: bool) -> Self {
        self.keep_unset_times = keep;
        self
    }

    pub fn basis(&self) -> RemovalBasisTime {
        self.basis
    }

    pub fn decide(&self, atime: i64, mtime: i64) -> Decision {
        if self.keep_unset_times && (atime == 0 || mtime == 0) {
            return Decision::Keep;
        }
        if is_eligible_for_removal(atime, mtime, self.basis.timestamp()) {
            Decision::Remove
        } else {
            Decision::Keep
        }
    }
}
