//! Run counters and derived ratios.

use serde::{Deserialize, Serialize};

/// Counters accumulated over one purge run. They only ever grow.
///
/// Every regular file lands in exactly one of the removed, failed or kept
/// buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeStats {
    pub removed_bytes: u64,
    pub removed_files: u64,
    pub failed_removed_bytes: u64,
    pub failed_removed_files: u64,
    pub kept_bytes: u64,
    pub kept_files: u64,
    pub directories: u64,
    pub symlinks: u64,
    pub unknown: u64,
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl PurgeStats {
    pub fn record_removed(&mut self, size: u64) {
        self.removed_files += 1;
        self.removed_bytes += size;
    }

    pub fn record_failed(&mut self, size: u64) {
        self.failed_removed_files += 1;
        self.failed_removed_bytes += size;
    }

    pub fn record_kept(&mut self, size: u64) {
        self.kept_files += 1;
        self.kept_bytes += size;
    }

    pub fn record_directory(&mut self) {
        self.directories += 1;
    }

    pub fn record_symlink(&mut self) {
        self.symlinks += 1;
    }

    pub fn record_unknown(&mut self) {
        self.unknown += 1;
    }

    /// Regular files seen, whatever happened to them.
    pub fn total_files(&self) -> u64 {
        self.removed_files + self.failed_removed_files + self.kept_files
    }

    pub fn total_bytes(&self) -> u64 {
        self.removed_bytes + self.failed_removed_bytes + self.kept_bytes
    }

    pub fn percent_bytes_removed(&self) -> f64 {
        ratio(self.removed_bytes, self.total_bytes()) * 100.0
    }

    pub fn percent_files_removed(&self) -> f64 {
        ratio(self.removed_files, self.total_files()) * 100.0
    }

    pub fn pre_purge_avg_file_size(&self) -> f64 {
        ratio(self.total_bytes(), self.total_files())
    }

    pub fn post_purge_avg_file_size(&self) -> f64 {
        ratio(
            self.failed_removed_bytes + self.kept_bytes,
            self.failed_removed_files + self.kept_files,
        )
    }

    pub fn purged_avg_file_size(&self) -> f64 {
        ratio(self.removed_bytes, self.removed_files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ratios_are_zero() {
        let stats = PurgeStats::default();
        for value in [
            stats.percent_bytes_removed(),
            stats.percent_files_removed(),
            stats.pre_purge_avg_file_size(),
            stats.post_purge_avg_file_size(),
            stats.purged_avg_file_size(),
        ] {
            assert_eq!(value, 0.0);
            assert!(!value.is_nan());
        }
    }

    #[test]
    fn test_all_removed_leaves_post_average_zero() {
        let mut stats = PurgeStats::default();
        stats.record_removed(100);
        stats.record_removed(300);
        assert_eq!(stats.percent_files_removed(), 100.0);
        assert_eq!(stats.purged_avg_file_size(), 200.0);
        assert_eq!(stats.post_purge_avg_file_size(), 0.0);
    }

    #[test]
    fn test_ratios() {
        let mut stats = PurgeStats::default();
        stats.record_removed(300);
        stats.record_failed(100);
        stats.record_kept(600);
        stats.record_kept(0);

        assert_eq!(stats.total_files(), 4);
        assert_eq!(stats.total_bytes(), 1000);
        assert_eq!(stats.percent_bytes_removed(), 30.0);
        assert_eq!(stats.percent_files_removed(), 25.0);
        assert_eq!(stats.pre_purge_avg_file_size(), 250.0);
        assert!((stats.post_purge_avg_file_size() - 700.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.purged_avg_file_size(), 300.0);
    }

    #[test]
    fn test_non_file_counters() {
        let mut stats = PurgeStats::default();
        stats.record_directory();
        stats.record_directory();
        stats.record_symlink();
        stats.record_unknown();
        assert_eq!((stats.directories, stats.symlinks, stats.unknown), (2, 1, 1));
        assert_eq!(stats.total_files(), 0);
    }

    #[test]
    fn test_serialize() {
        let mut stats = PurgeStats::default();
        stats.record_kept(5);
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["kept_bytes"], 5);
        assert_eq!(json["removed_files"], 0);
    }
}
