//! Run driver: one purge of one target directory, from header to footer.

use std::io::Write;

use fspurge_proto::LookupReq;
use fspurge_stubs::IStoreStub;
use fspurge_types::UtcTime;

use crate::context::RunContext;
use crate::error::PurgeError;
use crate::policy::RemovalBasisTime;
use crate::report::RunReport;
use crate::run_log::RunLog;
use crate::stats::PurgeStats;
use crate::walker::PurgeWalker;

/// What a finished run reports back to its caller.
#[derive(Debug)]
pub struct RunSummary {
    pub stats: PurgeStats,
    pub started_at: UtcTime,
    pub finished_at: UtcTime,
    pub basis: RemovalBasisTime,
    /// The fatal error that ended the run early, if any.
    pub error: Option<PurgeError>,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

pub struct PurgeRun<'a, S: IStoreStub + ?Sized, W: Write> {
    store: &'a S,
    ctx: RunContext<W>,
}

impl<'a, S: IStoreStub + ?Sized, W: Write> PurgeRun<'a, S, W> {
    pub fn new(store: &'a S, ctx: RunContext<W>) -> Self {
        Self { store, ctx }
    }

    /// Purge `target`, an absolute local path, writing the full run log.
    ///
    /// Fatal errors do not escape: they end the walk, mark the log with
    /// `purge_success false` and are returned in the summary.
    pub async fn execute(&mut self, target: &str) -> RunSummary {
        let report = RunReport {
            directory: target.to_string(),
            dry_run: self.ctx.options.dry_run,
            started_at: self.ctx.started_at,
            basis: self.ctx.policy.basis(),
        };
        tracing::info!(
            path = target,
            dry_run = report.dry_run,
            removal_basis_time = report.basis.timestamp(),
            "Starting purge"
        );
        report.write_header(&mut self.ctx.log);

        let result = self.purge(target).await;

        let finished_at = UtcTime::now();
        report.write_footer(&mut self.ctx.log, &self.ctx.stats, finished_at, result.is_ok());

        match &result {
            Ok(()) => tracing::info!(
                path = target,
                removed_files = self.ctx.stats.removed_files,
                failed_removed_files = self.ctx.stats.failed_removed_files,
                kept_files = self.ctx.stats.kept_files,
                "Purge finished"
            ),
            Err(e) => tracing::error!(path = target, error = %e, "Purge failed"),
        }

        RunSummary {
            stats: self.ctx.stats,
            started_at: report.started_at,
            finished_at,
            basis: report.basis,
            error: result.err(),
        }
    }

    pub fn into_log(self) -> RunLog<W> {
        self.ctx.log
    }

    async fn purge(&mut self, target: &str) -> Result<(), PurgeError> {
        let resolved = self
            .store
            .resolve(target)
            .await
            .map_err(|status| PurgeError::Resolve {
                path: target.to_string(),
                status,
            })?;

        let internal_path = if resolved.internal_path.is_empty() {
            "/".to_string()
        } else {
            resolved.internal_path
        };
        tracing::debug!(
            path = target,
            fs_id = %resolved.fs_id,
            internal_path = %internal_path,
            "Resolved target"
        );

        let dir = self
            .store
            .lookup(LookupReq {
                fs_id: resolved.fs_id,
                path: internal_path,
                follow: false,
            })
            .await
            .map_err(|status| PurgeError::Lookup {
                path: target.to_string(),
                status,
            })?
            .object;

        PurgeWalker::new(self.store, &mut self.ctx)
            .walk_and_purge(target, dir)
            .await
    }
}
