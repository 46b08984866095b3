//! Run report: the key/value records that open and close a run log.

use std::io::Write;

use fspurge_types::UtcTime;

use crate::policy::RemovalBasisTime;
use crate::run_log::RunLog;
use crate::stats::PurgeStats;

/// The fixed parameters of a run, as reported in its log.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub directory: String,
    pub dry_run: bool,
    pub started_at: UtcTime,
    pub basis: RemovalBasisTime,
}

impl RunReport {
    /// Records written before the walk starts.
    pub fn write_header<W: Write>(&self, log: &mut RunLog<W>) {
        log.kv("directory", &self.directory);
        log.kv("dry_run", self.dry_run);
        log.kv("current_time", self.started_at.timestamp());
        log.kv("current_time_str", self.started_at.human_readable());
        log.kv("removal_basis_time", self.basis.timestamp());
        log.kv("removal_basis_time_str", self.basis.as_utc().human_readable());
    }

    /// Records written after the walk: timing, counters, ratios and the
    /// final success flag.
    pub fn write_footer<W: Write>(
        &self,
        log: &mut RunLog<W>,
        stats: &PurgeStats,
        finished_at: UtcTime,
        success: bool,
    ) {
        log.kv("finish_time", finished_at.timestamp());
        log.kv("finish_time_str", finished_at.human_readable());
        log.kv("duration_seconds", self.duration_secs(finished_at));

        log.kv("removed_bytes", stats.removed_bytes);
        log.kv("removed_files", stats.removed_files);
        log.kv("failed_removed_bytes", stats.failed_removed_bytes);
        log.kv("failed_removed_files", stats.failed_removed_files);
        log.kv("kept_bytes", stats.kept_bytes);
        log.kv("kept_files", stats.kept_files);
        log.kv("directories", stats.directories);
        log.kv("symlinks", stats.symlinks);
        log.kv("unknown", stats.unknown);

        log.kv("percent_bytes_removed", format!("{:.6}", stats.percent_bytes_removed()));
        log.kv("percent_files_removed", format!("{:.6}", stats.percent_files_removed()));
        log.kv("pre_purge_avg_file_size", format!("{:.6}", stats.pre_purge_avg_file_size()));
        log.kv("post_purge_avg_file_size", format!("{:.6}", stats.post_purge_avg_file_size()));
        log.kv("purged_avg_file_size", format!("{:.6}", stats.purged_avg_file_size()));

        log.kv("purge_success", success);
        log.flush();
    }

    /// Whole seconds since the run started. A clock that stepped backwards
    /// yields zero.
    pub fn duration_secs(&self, finished_at: UtcTime) -> u64 {
        u64::try_from(finished_at.timestamp() - self.started_at.timestamp()).unwrap_or(0)
    }
}
