//! Configuration for a purge run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::OptionsError;

/// Default retention window: 31 days.
pub const DEFAULT_RETENTION_SECS: u64 = 31 * 24 * 60 * 60;

/// Entries requested per listing call.
pub const DEFAULT_BATCH_LIMIT: u32 = 60;

/// Options for one purge run. Immutable once the run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeOptions {
    /// Compute and report removals without deleting anything.
    #[serde(default)]
    pub dry_run: bool,

    /// Directory receiving the run log.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Write an `R` line for every file removed (or that would be).
    #[serde(default)]
    pub log_removed_files: bool,

    /// Write a `K` line for every file kept.
    #[serde(default)]
    pub log_kept_files: bool,

    /// Explicit cutoff in seconds since the epoch. `None` or 0 means
    /// "now minus the retention window".
    #[serde(default)]
    pub removal_basis_time: Option<i64>,

    #[serde(default = "default_retention")]
    pub retention_window_secs: u64,

    #[serde(default = "default_batch_limit")]
    pub batch_limit: u32,

    /// Keep files whose access or modification time is unset (zero).
    #[serde(default)]
    pub keep_unset_times: bool,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/log/fspurge")
}

fn default_retention() -> u64 {
    DEFAULT_RETENTION_SECS
}

fn default_batch_limit() -> u32 {
    DEFAULT_BATCH_LIMIT
}

impl Default for PurgeOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            log_dir: default_log_dir(),
            log_removed_files: false,
            log_kept_files: false,
            removal_basis_time: None,
            retention_window_secs: default_retention(),
            batch_limit: default_batch_limit(),
            keep_unset_times: false,
        }
    }
}

impl PurgeOptions {
    /// Load options from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, OptionsError> {
        let text = std::fs::read_to_string(path).map_err(|source| OptionsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| OptionsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn retention_window(&self) -> Duration {
        Duration::from_secs(self.retention_window_secs)
    }

    /// The explicit cutoff, if one was supplied. Zero counts as unset.
    pub fn explicit_basis_time(&self) -> Option<i64> {
        self.removal_basis_time.filter(|t| *t != 0)
    }

    /// Listing batch size, never below one entry.
    pub fn effective_batch_limit(&self) -> u32 {
        self.batch_limit.max(1)
    }
}
