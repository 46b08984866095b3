//! Store client over a locally mounted file system.

use std::collections::HashMap;
use std::fs::{self, Metadata};
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use fspurge_proto::{
    DirEntry, ListReq, ListRsp, ListToken, LookupReq, LookupRsp, ObjectRef, ObjectType,
    RemoveReq, RemoveRsp, ResolvedPath, SysAttr,
};
use fspurge_stubs::IStoreStub;
use fspurge_types::{
    make_error, make_error_msg, FsId, Handle, Result, Status, StatusCode, StoreCode,
};

use crate::config::StoreConfig;
use crate::error::{ClientError, ClientResult};

/// A store client for a file system mounted at `mount_root`.
///
/// Handles are issued by the client, a fresh one for every object a lookup
/// or listing returns. Inode numbers are not unique once another file system
/// is mounted below the root, so they never serve as handles.
///
/// The client remembers the local path behind every directory handle until
/// the caller forgets it, and keeps a sorted name snapshot of each directory
/// whose listing is in progress so that batches resume by name.
pub struct LocalStore {
    root: PathBuf,
    fs_id: FsId,
    next_handle: AtomicU64,
    dirs: Mutex<HashMap<Handle, PathBuf>>,
    snapshots: Mutex<HashMap<Handle, Arc<Vec<String>>>>,
}

impl LocalStore {
    /// Probe the mount root and build a client for it.
    pub fn open(config: StoreConfig) -> ClientResult<Self> {
        if !config.mount_root.is_absolute() {
            return Err(ClientError::Config(format!(
                "mount_root must be absolute: {}",
                config.mount_root.display()
            )));
        }
        let meta = fs::metadata(&config.mount_root)?;
        if !meta.is_dir() {
            return Err(ClientError::Config(format!(
                "mount_root is not a directory: {}",
                config.mount_root.display()
            )));
        }
        let fs_id = match config.fs_id {
            Some(0) => return Err(ClientError::Config("fs_id 0 is reserved".to_string())),
            Some(id) => FsId(id),
            None => fs_id_from_dev(meta.dev()),
        };

        tracing::debug!(
            mount_root = %config.mount_root.display(),
            fs_id = %fs_id,
            "Opened local store"
        );

        Ok(Self {
            root: config.mount_root,
            fs_id,
            next_handle: AtomicU64::new(1),
            dirs: Mutex::new(HashMap::new()),
            snapshots: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fs_id(&self) -> FsId {
        self.fs_id
    }

    /// Number of directory handles not yet forgotten.
    pub fn open_dirs(&self) -> usize {
        self.dirs.lock().len()
    }

    fn issue_handle(&self, path: PathBuf, meta: &Metadata) -> Handle {
        let handle = Handle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        if meta.is_dir() {
            self.dirs.lock().insert(handle, path);
        }
        handle
    }

    fn local_path(&self, internal: &str) -> PathBuf {
        self.root.join(internal.trim_start_matches('/'))
    }

    fn dir_path(&self, handle: Handle) -> Result<PathBuf> {
        self.dirs.lock().get(&handle).cloned().ok_or_else(|| {
            Status::with_message(
                StoreCode::INVALID_HANDLE,
                format!("handle {} was never looked up", handle),
            )
        })
    }

    fn check_fs(&self, fs_id: FsId) -> Result<()> {
        if fs_id != self.fs_id {
            return make_error_msg(
                StoreCode::NO_FILE_SYSTEM,
                format!("fs_id {} is not served here", fs_id),
            );
        }
        Ok(())
    }

    /// Sorted names of `dir`. A listing from `Start` always takes a fresh
    /// snapshot; continuations reuse it.
    fn snapshot(&self, handle: Handle, dir: &Path, token: &ListToken) -> Result<Arc<Vec<String>>> {
        if !matches!(token, ListToken::Start) {
            if let Some(names) = self.snapshots.lock().get(&handle) {
                return Ok(names.clone());
            }
        }

        let read_err = |e: io::Error| Status::from_io(&e, format!("readdir {}", dir.display()));
        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    tracing::warn!(
                        dir = %dir.display(),
                        name = ?raw,
                        "Skipping non-UTF8 entry name"
                    );
                }
            }
        }
        names.sort_unstable();

        let names = Arc::new(names);
        self.snapshots.lock().insert(handle, names.clone());
        Ok(names)
    }
}

/// Fold a device number into a non-null file system id.
fn fs_id_from_dev(dev: u64) -> FsId {
    let folded = ((dev ^ (dev >> 32)) & i32::MAX as u64) as i32;
    if folded == 0 {
        FsId(1)
    } else {
        FsId(folded)
    }
}

/// Build the store attribute record for a local `lstat` result.
///
/// Anything other than a regular file, directory or symlink is reported with
/// an object type of 0, which no store kind uses.
pub fn attr_from_metadata(meta: &Metadata) -> SysAttr {
    let ft = meta.file_type();
    let objtype = if ft.is_file() {
        ObjectType::Metafile as u8
    } else if ft.is_dir() {
        ObjectType::Directory as u8
    } else if ft.is_symlink() {
        ObjectType::Symlink as u8
    } else {
        0
    };

    SysAttr {
        owner: meta.uid(),
        group: meta.gid(),
        perms: meta.mode() & 0o7777,
        atime: meta.atime(),
        mtime: meta.mtime(),
        ctime: meta.ctime(),
        size: meta.len(),
        objtype,
        dirent_count: 0,
        blksize: meta.blksize(),
        dfile_count: 0,
        link_target: None,
    }
}

#[async_trait]
impl IStoreStub for LocalStore {
    async fn resolve(&self, path: &str) -> Result<ResolvedPath> {
        let path = Path::new(path);
        if !path.is_absolute() {
            return make_error_msg(
                StatusCode::INVALID_ARG,
                format!("not an absolute path: {}", path.display()),
            );
        }
        let rest = path.strip_prefix(&self.root).map_err(|_| {
            Status::with_message(
                StoreCode::NO_FILE_SYSTEM,
                format!("{} is not under {}", path.display(), self.root.display()),
            )
        })?;
        let rest = rest.to_str().ok_or_else(|| {
            Status::with_message(StatusCode::INVALID_ARG, "path is not valid UTF-8")
        })?;

        Ok(ResolvedPath {
            fs_id: self.fs_id,
            internal_path: if rest.is_empty() {
                String::new()
            } else {
                format!("/{}", rest)
            },
        })
    }

    async fn lookup(&self, req: LookupReq) -> Result<LookupRsp> {
        self.check_fs(req.fs_id)?;
        let path = self.local_path(&req.path);
        let meta = if req.follow {
            fs::metadata(&path)
        } else {
            fs::symlink_metadata(&path)
        }
        .map_err(|e| Status::from_io(&e, format!("lookup {}", path.display())))?;

        let handle = self.issue_handle(path, &meta);
        Ok(LookupRsp {
            object: ObjectRef::new(self.fs_id, handle),
        })
    }

    async fn list(&self, req: ListReq) -> Result<ListRsp> {
        self.check_fs(req.dir.fs_id)?;
        let dir = self.dir_path(req.dir.handle)?;
        let names = self.snapshot(req.dir.handle, &dir, &req.token)?;

        let mut pos = match &req.token {
            ListToken::Start => 0,
            ListToken::After(prev) => names.partition_point(|n| n.as_str() <= prev.as_str()),
            ListToken::End => return make_error(StoreCode::INVALID_TOKEN),
        };
        let limit = req.limit.max(1) as usize;

        let cap = limit.min(names.len().saturating_sub(pos));
        let mut entries = Vec::with_capacity(cap);
        let mut attrs = Vec::with_capacity(cap);
        while pos < names.len() && entries.len() < limit {
            let name = &names[pos];
            pos += 1;

            let path = dir.join(name);
            let meta = match fs::symlink_metadata(&path) {
                Ok(meta) => meta,
                // Removed since the snapshot was taken.
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(Status::from_io(&e, format!("lstat {}", path.display()))),
            };

            let mut attr = attr_from_metadata(&meta);
            if meta.file_type().is_symlink() {
                attr.link_target = fs::read_link(&path)
                    .ok()
                    .map(|t| t.to_string_lossy().into_owned());
            }
            let handle = self.issue_handle(path, &meta);

            entries.push(DirEntry {
                name: name.clone(),
                handle,
            });
            attrs.push(attr);
        }

        let token = if pos < names.len() {
            ListToken::After(names[pos - 1].clone())
        } else {
            self.snapshots.lock().remove(&req.dir.handle);
            ListToken::End
        };

        Ok(ListRsp {
            entries,
            attrs,
            token,
        })
    }

    async fn remove(&self, req: RemoveReq) -> Result<RemoveRsp> {
        self.check_fs(req.parent.fs_id)?;
        if req.name.is_empty() || req.name == "." || req.name == ".." || req.name.contains('/') {
            return make_error_msg(
                StatusCode::INVALID_ARG,
                format!("invalid entry name {:?}", req.name),
            );
        }
        let path = self.dir_path(req.parent.handle)?.join(&req.name);
        let meta = fs::symlink_metadata(&path)
            .map_err(|e| Status::from_io(&e, format!("lstat {}", path.display())))?;
        if meta.is_dir() {
            return make_error_msg(StoreCode::IS_DIRECTORY, path.display().to_string());
        }
        fs::remove_file(&path)
            .map_err(|e| Status::from_io(&e, format!("unlink {}", path.display())))?;
        Ok(RemoveRsp {})
    }

    fn forget(&self, dir: ObjectRef) {
        if dir.fs_id != self.fs_id {
            return;
        }
        self.snapshots.lock().remove(&dir.handle);
        self.dirs.lock().remove(&dir.handle);
    }
}
