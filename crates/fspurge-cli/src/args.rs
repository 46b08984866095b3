//! Command-line arguments.

use std::path::PathBuf;

use fspurge_cleaner::PurgeOptions;
use fspurge_client::StoreConfig;
use fspurge_logging::LogConfig;

/// Remove files not accessed or modified within the retention window.
///
/// Walks the directory subtree at TARGET and removes every regular file
/// whose access time and modification time both predate the removal-basis
/// time (by default 31 days before the run starts). Directories and
/// symbolic links are never removed. Must be run as root.
///
/// Setting the DRY_RUN environment variable to a non-zero integer forces a
/// dry run; it cannot turn off --dry-run.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "fspurge", version, about)]
pub struct PurgeArgs {
    /// Directory subtree to purge. It is never removed itself.
    pub target: PathBuf,

    /// Report what would be removed without removing anything.
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Directory receiving the run log [default: /var/log/fspurge].
    #[arg(short = 'l', long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log the path of every removed file.
    #[arg(long)]
    pub log_removed_files: bool,

    /// Log the path of every kept file.
    #[arg(long)]
    pub log_kept_files: bool,

    /// Explicit cutoff in seconds since the epoch (decimal or 0x-prefixed
    /// hex). 0 means the default window.
    #[arg(short = 'r', long, value_name = "EPOCH_SECS", value_parser = parse_epoch)]
    pub removal_basis_time: Option<i64>,

    /// Keep files whose access or modification time is unset (0).
    #[arg(long)]
    pub keep_unset_times: bool,

    /// Entries requested per directory listing call.
    #[arg(long, value_name = "N")]
    pub batch_limit: Option<u32>,

    /// TOML file with run options; command-line flags take precedence.
    #[arg(long, value_name = "FILE", env = "FSPURGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Also write diagnostics to rolling files in this directory.
    #[arg(long, value_name = "DIR")]
    pub trace_log_dir: Option<PathBuf>,

    /// More diagnostics on stderr (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Where the store is mounted locally.
#[derive(Debug, Clone, clap::Args)]
pub struct StoreArgs {
    /// Local path at which the store's root is mounted.
    #[arg(long, value_name = "DIR", env = "FSPURGE_MOUNT_ROOT", default_value = "/")]
    pub mount_root: PathBuf,

    /// File system id to report instead of one derived from the mount.
    #[arg(long, value_name = "ID")]
    pub fs_id: Option<i32>,
}

fn parse_epoch(s: &str) -> Result<i64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => s.parse::<i64>(),
    };
    parsed.map_err(|e| format!("not a timestamp: {e}"))
}

impl PurgeArgs {
    /// Layer the command-line flags over `base`. Boolean flags can only
    /// switch features on.
    pub fn apply_to(&self, base: PurgeOptions) -> PurgeOptions {
        let mut options = base;
        options.dry_run |= self.dry_run;
        options.log_removed_files |= self.log_removed_files;
        options.log_kept_files |= self.log_kept_files;
        options.keep_unset_times |= self.keep_unset_times;
        if let Some(dir) = &self.log_dir {
            options.log_dir = dir.clone();
        }
        if let Some(basis) = self.removal_basis_time {
            options.removal_basis_time = Some(basis);
        }
        if let Some(limit) = self.batch_limit {
            options.batch_limit = limit;
        }
        options
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            mount_root: self.store.mount_root.clone(),
            fs_id: self.store.fs_id,
        }
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            log_dir: self.trace_log_dir.clone(),
            ..LogConfig::default()
        }
        .with_verbosity(self.verbose)
    }
}
