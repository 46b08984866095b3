//! Per-run state.

use std::io::Write;

use fspurge_types::UtcTime;

use crate::config::PurgeOptions;
use crate::policy::RetentionPolicy;
use crate::run_log::RunLog;
use crate::stats::PurgeStats;

/// Everything one purge run owns: its options, its fixed policy, the
/// counters and the run log. Nothing here is shared between runs.
pub struct RunContext<W: Write = Box<dyn Write + Send>> {
    pub options: PurgeOptions,
    pub policy: RetentionPolicy,
    pub stats: PurgeStats,
    pub log: RunLog<W>,
    pub started_at: UtcTime,
}

impl<W: Write> RunContext<W> {
    /// Start a run at `started_at`. The removal-basis time is fixed here and
    /// does not move for the rest of the run.
    pub fn new(options: PurgeOptions, log: RunLog<W>, started_at: UtcTime) -> Self {
        let policy = RetentionPolicy::from_options(&options, started_at);
        Self {
            options,
            policy,
            stats: PurgeStats::default(),
            log,
            started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_fixed_at_start() {
        let started_at = UtcTime::from_timestamp(10_000_000);
        let ctx = RunContext::new(PurgeOptions::default(), RunLog::new(Vec::new()), started_at);
        assert_eq!(
            ctx.policy.basis().timestamp(),
            10_000_000 - crate::config::DEFAULT_RETENTION_SECS as i64
        );
        assert_eq!(ctx.stats, PurgeStats::default());
    }
}
