//! One `fspurge` invocation end to end.

use std::process::ExitCode;

use anyhow::Context;

use fspurge_cleaner::{PurgeOptions, PurgeRun, RunContext, RunLog, RunSummary};
use fspurge_client::LocalStore;
use fspurge_types::UtcTime;

use crate::args::PurgeArgs;
use crate::env::{log_file_path, normalize_target, validate_target, Environment};

/// Check the invocation, open the store and run the purge.
///
/// `Err` means the run never started (not root, bad options, bad target,
/// unusable mount). A run that started always yields a summary, which
/// carries its own fatal error if the walk was cut short.
pub async fn run(args: &PurgeArgs, env: &Environment) -> anyhow::Result<RunSummary> {
    env.check_privileged()?;

    let base = match &args.config {
        Some(path) => PurgeOptions::load(path)?,
        None => PurgeOptions::default(),
    };
    let mut options = args.apply_to(base);
    if env.dry_run_forced() && !options.dry_run {
        tracing::info!("DRY_RUN is set, forcing a dry run");
        options.dry_run = true;
    }

    let target = normalize_target(&args.target)?;
    validate_target(&target)?;

    let store = LocalStore::open(args.store_config()).context("cannot open store")?;

    let started_at = UtcTime::now();
    let log_path = log_file_path(&options.log_dir, started_at.timestamp(), &target);
    tracing::debug!(path = %log_path.display(), "Run log");
    let log = RunLog::create_or_stderr(&log_path);

    let mut purge = PurgeRun::new(&store, RunContext::new(options, log, started_at));
    Ok(purge.execute(&target).await)
}

pub fn exit_code(result: &anyhow::Result<RunSummary>) -> ExitCode {
    match result {
        Ok(summary) if summary.success() => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
