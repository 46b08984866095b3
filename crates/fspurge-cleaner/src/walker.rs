//! Tree walker and purge engine.
//!
//! The walk is depth-first over an explicit stack of directory frames. Each
//! frame owns its directory's absolute path, the listing cursor and the
//! entries of the current batch still to be processed, so a level is always
//! in one of four states:
//!
//! - fetching: no pending entries and the cursor is not at the end
//! - processing: pending entries remain
//! - recursing: a child frame sits above it on the stack
//! - done: no pending entries and the cursor is at the end; the frame is popped
//!
//! A failed listing or an entry that cannot be classified ends the whole walk.
//! A failed removal is counted and the walk carries on.
//!
//! Every directory handle the walk receives is handed back to the store with
//! `forget` once its frame is popped, or when a fatal error unwinds the stack.

use std::collections::VecDeque;
use std::io::Write;

use fspurge_proto::{DirEntry, ListReq, ListToken, ObjectRef, RemoveReq, SysAttr};
use fspurge_stubs::IStoreStub;
use fspurge_types::{Status, StatusCode};

use crate::classify::{classify, EntryKind, EntryStat};
use crate::context::RunContext;
use crate::error::PurgeError;
use crate::policy::Decision;

/// Join a directory path and an entry name.
pub fn child_path(parent: &str, name: &str) -> String {
    let mut path = String::with_capacity(parent.len() + 1 + name.len());
    path.push_str(parent);
    if !parent.ends_with('/') {
        path.push('/');
    }
    path.push_str(name);
    path
}

/// What happened to one removal-eligible file.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum RemoveOutcome {
    Removed,
    /// Dry run: counted as removed, nothing deleted.
    Simulated,
    Failed(Status),
}

struct Frame {
    path: String,
    dir: ObjectRef,
    token: ListToken,
    pending: VecDeque<(DirEntry, SysAttr)>,
    entries_seen: u64,
}

impl Frame {
    fn new(path: String, dir: ObjectRef) -> Self {
        Self {
            path,
            dir,
            token: ListToken::Start,
            pending: VecDeque::new(),
            entries_seen: 0,
        }
    }
}

/// Walks one subtree of a store on behalf of a run.
pub struct PurgeWalker<'a, S: IStoreStub + ?Sized, W: Write> {
    store: &'a S,
    ctx: &'a mut RunContext<W>,
}

impl<'a, S: IStoreStub + ?Sized, W: Write> PurgeWalker<'a, S, W> {
    pub fn new(store: &'a S, ctx: &'a mut RunContext<W>) -> Self {
        Self { store, ctx }
    }

    /// Purge the directory `dir`, whose absolute path is `path`, and
    /// everything below it.
    pub async fn walk_and_purge(&mut self, path: &str, dir: ObjectRef) -> Result<(), PurgeError> {
        let mut stack = vec![Frame::new(path.to_string(), dir)];
        let result = self.walk(&mut stack).await;

        // Only a fatal error leaves frames behind.
        while let Some(frame) = stack.pop() {
            for (entry, _) in &frame.pending {
                self.store.forget(ObjectRef::new(frame.dir.fs_id, entry.handle));
            }
            self.store.forget(frame.dir);
        }
        result
    }

    async fn walk(&mut self, stack: &mut Vec<Frame>) -> Result<(), PurgeError> {
        let limit = self.ctx.options.effective_batch_limit();

        while let Some(frame) = stack.last_mut() {
            if let Some((entry, attr)) = frame.pending.pop_front() {
                frame.entries_seen += 1;
                let entry_path = child_path(&frame.path, &entry.name);
                let entry_ref = ObjectRef::new(frame.dir.fs_id, entry.handle);
                let stat = classify(&attr, entry_ref).map_err(|source| {
                    tracing::error!(path = %entry_path, error = %source, "Cannot classify entry");
                    PurgeError::Classify {
                        path: entry_path.clone(),
                        source,
                    }
                })?;

                match stat.kind {
                    EntryKind::Regular => {
                        let parent = frame.dir;
                        self.purge_file(parent, &entry.name, &entry_path, &stat)
                            .await;
                    }
                    EntryKind::Directory => {
                        self.ctx.stats.record_directory();
                        stack.push(Frame::new(entry_path, entry_ref));
                    }
                    EntryKind::Symlink => {
                        tracing::trace!(path = %entry_path, "Skipping symlink");
                        self.ctx.stats.record_symlink();
                    }
                    EntryKind::Unknown => {
                        tracing::error!(
                            path = %entry_path,
                            objtype = attr.objtype,
                            "Unrecognized object type"
                        );
                        self.ctx.stats.record_unknown();
                    }
                }
                continue;
            }

            if frame.token.is_end() {
                tracing::debug!(
                    path = %frame.path,
                    entries = frame.entries_seen,
                    "Finished directory"
                );
                self.store.forget(frame.dir);
                stack.pop();
                continue;
            }

            self.fetch_batch(frame, limit).await?;
        }

        Ok(())
    }

    async fn fetch_batch(&self, frame: &mut Frame, limit: u32) -> Result<(), PurgeError> {
        let list_err = |status: Status| {
            tracing::error!(path = %frame.path, error = %status, "Listing failed");
            PurgeError::List {
                path: frame.path.clone(),
                status,
            }
        };

        let rsp = self
            .store
            .list(ListReq {
                dir: frame.dir,
                token: frame.token.clone(),
                limit,
            })
            .await
            .map_err(list_err)?;

        if rsp.entries.len() != rsp.attrs.len() {
            return Err(list_err(Status::with_message(
                StatusCode::DATA_CORRUPTION,
                format!(
                    "{} entries but {} attribute records",
                    rsp.entries.len(),
                    rsp.attrs.len()
                ),
            )));
        }
        if rsp.entries.is_empty() && !rsp.token.is_end() && rsp.token == frame.token {
            return Err(list_err(Status::with_message(
                StatusCode::DATA_CORRUPTION,
                "listing cursor did not advance",
            )));
        }

        tracing::trace!(
            path = %frame.path,
            count = rsp.entries.len(),
            last = rsp.token.is_end(),
            "Fetched batch"
        );
        frame.token = rsp.token;
        frame.pending.extend(rsp.entries.into_iter().zip(rsp.attrs));
        Ok(())
    }

    async fn purge_file(&mut self, parent: ObjectRef, name: &str, path: &str, stat: &EntryStat) {
        match self.ctx.policy.decide(stat.atime, stat.mtime) {
            Decision::Keep => {
                if self.ctx.options.log_kept_files {
                    self.ctx.log.kept(path);
                }
                self.ctx.stats.record_kept(stat.size);
            }
            Decision::Remove => {
                if self.ctx.options.log_removed_files {
                    self.ctx.log.removed(path);
                }
                match self.remove(parent, name).await {
                    RemoveOutcome::Removed | RemoveOutcome::Simulated => {
                        self.ctx.stats.record_removed(stat.size);
                    }
                    RemoveOutcome::Failed(status) => {
                        tracing::warn!(path = %path, error = %status, "Failed to remove file");
                        self.ctx.stats.record_failed(stat.size);
                    }
                }
            }
        }
    }

    /// Remove `name` from `parent` unless this is a dry run.
    pub async fn remove(&self, parent: ObjectRef, name: &str) -> RemoveOutcome {
        if self.ctx.options.dry_run {
            return RemoveOutcome::Simulated;
        }
        let req = RemoveReq {
            parent,
            name: name.to_string(),
        };
        match self.store.remove(req).await {
            Ok(_) => RemoveOutcome::Removed,
            Err(status) => RemoveOutcome::Failed(status),
        }
    }
}
