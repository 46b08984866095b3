//! Retention-based purge engine.
//!
//! A run walks one directory subtree of the store in batched listings,
//! classifies every entry, and removes regular files whose last access and
//! last modification both predate the run's removal-basis time. Directories
//! and symlinks are never removed. Counters for everything seen are
//! aggregated into [`PurgeStats`] and written, together with the run's
//! parameters and derived ratios, to a tab-separated run log.
//!
//! The walk keeps an explicit stack of directory frames rather than
//! recursing, so tree depth costs heap memory (one listing batch per level)
//! instead of call stack.

pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod policy;
pub mod report;
pub mod run;
pub mod run_log;
pub mod stats;
pub mod walker;

pub use classify::{classify, ClassifyError, EntryKind, EntryStat};
pub use config::PurgeOptions;
pub use context::RunContext;
pub use error::{OptionsError, PurgeError};
pub use policy::{is_eligible_for_removal, Decision, RemovalBasisTime, RetentionPolicy};
pub use report::RunReport;
pub use run::{PurgeRun, RunSummary};
pub use run_log::RunLog;
pub use stats::PurgeStats;
pub use walker::{child_path, PurgeWalker, RemoveOutcome};
