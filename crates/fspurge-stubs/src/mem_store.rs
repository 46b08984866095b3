//! In-memory store backed by a handle table of `BTreeMap` directories.
//!
//! This provides a fully functional [`IStoreStub`] implementation for tests:
//! trees are built with [`MemStore::insert`], listings come back in name order
//! in bounded batches, and individual listing or removal calls can be made to
//! fail. All state lives behind a `parking_lot::Mutex`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use fspurge_proto::{
    DirEntry, ListReq, ListRsp, ListToken, LookupReq, LookupRsp, ObjectRef, ObjectType,
    RemoveReq, RemoveRsp, ResolvedPath, SysAttr,
};
use fspurge_types::{
    make_error, make_error_msg, FsId, Handle, Result, Status, StatusCode, StoreCode,
};

use crate::store_stub::IStoreStub;

/// Handle of the file system root.
pub const MEM_ROOT_HANDLE: Handle = Handle(1);

struct MemNode {
    name: String,
    parent: Handle,
    attr: SysAttr,
    children: BTreeMap<String, Handle>,
}

struct MemTree {
    nodes: HashMap<Handle, MemNode>,
    next_handle: u64,
    failing_lists: HashSet<String>,
    failing_removes: HashSet<String>,
}

impl MemTree {
    fn node(&self, handle: Handle) -> Result<&MemNode> {
        self.nodes.get(&handle).ok_or_else(|| {
            Status::with_message(StoreCode::INVALID_HANDLE, format!("handle {}", handle))
        })
    }

    fn path_of(&self, handle: Handle) -> String {
        let mut parts = Vec::new();
        let mut cur = handle;
        while cur != MEM_ROOT_HANDLE {
            match self.nodes.get(&cur) {
                Some(node) => {
                    parts.push(node.name.as_str());
                    cur = node.parent;
                }
                None => break,
            }
        }
        parts.reverse();
        format!("/{}", parts.join("/"))
    }

    fn child_path(&self, parent: Handle, name: &str) -> String {
        let parent_path = self.path_of(parent);
        if parent_path == "/" {
            format!("/{}", name)
        } else {
            format!("{}/{}", parent_path, name)
        }
    }

    fn walk(&self, path: &str) -> Result<Handle> {
        let mut cur = MEM_ROOT_HANDLE;
        for component in path.split('/').filter(|c| !c.is_empty()) {
            let node = self.node(cur)?;
            if node.attr.object_type() != Some(ObjectType::Directory) {
                return make_error_msg(StoreCode::NOT_DIRECTORY, self.path_of(cur));
            }
            cur = *node
                .children
                .get(component)
                .ok_or_else(|| Status::with_message(StoreCode::NOT_FOUND, path.to_string()))?;
        }
        Ok(cur)
    }

    fn alloc(&mut self, parent: Handle, name: &str, attr: SysAttr) -> Handle {
        self.next_handle += 1;
        let handle = Handle(self.next_handle);
        self.nodes.insert(
            handle,
            MemNode {
                name: name.to_string(),
                parent,
                attr,
                children: BTreeMap::new(),
            },
        );
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.insert(name.to_string(), handle);
        }
        handle
    }
}

/// In-memory tree store mounted at a fixed local path prefix.
pub struct MemStore {
    fs_id: FsId,
    mount: String,
    tree: Mutex<MemTree>,
    list_calls: AtomicUsize,
    remove_calls: AtomicUsize,
}

impl MemStore {
    /// Create a store holding an empty root directory, mounted at `mount`.
    pub fn new(mount: impl Into<String>) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            MEM_ROOT_HANDLE,
            MemNode {
                name: String::new(),
                parent: Handle::NULL,
                attr: SysAttr::directory(0),
                children: BTreeMap::new(),
            },
        );
        let mount = mount.into();
        Self {
            fs_id: FsId(1),
            mount: mount.trim_end_matches('/').to_string(),
            tree: Mutex::new(MemTree {
                nodes,
                next_handle: MEM_ROOT_HANDLE.0,
                failing_lists: HashSet::new(),
                failing_removes: HashSet::new(),
            }),
            list_calls: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
        }
    }

    pub fn fs_id(&self) -> FsId {
        self.fs_id
    }

    /// Insert an object at a file-system-relative path, creating missing
    /// parent directories. An existing object at `path` is replaced.
    pub fn insert(&self, path: &str, attr: SysAttr) -> Handle {
        let mut tree = self.tree.lock();
        let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        let Some((leaf, dirs)) = components.split_last() else {
            return MEM_ROOT_HANDLE;
        };

        let mut cur = MEM_ROOT_HANDLE;
        for dir in dirs {
            let existing = tree.nodes.get(&cur).and_then(|n| n.children.get(*dir).copied());
            cur = match existing {
                Some(h) => h,
                None => tree.alloc(cur, dir, SysAttr::directory(0)),
            };
        }

        let existing = tree.nodes.get(&cur).and_then(|n| n.children.get(*leaf).copied());
        if let Some(old) = existing {
            tree.nodes.remove(&old);
        }
        tree.alloc(cur, leaf, attr)
    }

    /// Create a directory (and its parents) at `path`.
    pub fn mkdir(&self, path: &str) -> Handle {
        self.insert(path, SysAttr::directory(0))
    }

    /// Make every listing of the directory at `path` fail.
    pub fn fail_list(&self, path: &str) {
        self.tree.lock().failing_lists.insert(normalize(path));
    }

    /// Make removal of the entry at `path` fail.
    pub fn fail_remove(&self, path: &str) {
        self.tree.lock().failing_removes.insert(normalize(path));
    }

    /// Whether an object exists at the file-system-relative `path`.
    pub fn exists(&self, path: &str) -> bool {
        self.tree.lock().walk(path).is_ok()
    }

    /// Number of regular files currently stored.
    pub fn file_count(&self) -> usize {
        self.tree
            .lock()
            .nodes
            .values()
            .filter(|n| n.attr.object_type() == Some(ObjectType::Metafile))
            .count()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::Relaxed)
    }

    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::Relaxed)
    }
}

fn normalize(path: &str) -> String {
    let trimmed: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
    format!("/{}", trimmed.join("/"))
}

#[async_trait]
impl IStoreStub for MemStore {
    async fn resolve(&self, path: &str) -> Result<ResolvedPath> {
        let path = path.trim_end_matches('/');
        let rest = match path.strip_prefix(self.mount.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => {
                return make_error_msg(
                    StoreCode::NO_FILE_SYSTEM,
                    format!("no file system mounted for {}", path),
                )
            }
        };
        Ok(ResolvedPath {
            fs_id: self.fs_id,
            internal_path: rest.to_string(),
        })
    }

    async fn lookup(&self, req: LookupReq) -> Result<LookupRsp> {
        if req.fs_id != self.fs_id {
            return make_error(StoreCode::NO_FILE_SYSTEM);
        }
        let tree = self.tree.lock();
        let handle = tree.walk(&req.path)?;
        if req.follow && tree.node(handle)?.attr.object_type() == Some(ObjectType::Symlink) {
            return make_error_msg(StatusCode::NOT_IMPLEMENTED, "symlink follow");
        }
        Ok(LookupRsp {
            object: ObjectRef::new(self.fs_id, handle),
        })
    }

    async fn list(&self, req: ListReq) -> Result<ListRsp> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        if req.dir.fs_id != self.fs_id {
            return make_error(StoreCode::NO_FILE_SYSTEM);
        }

        let tree = self.tree.lock();
        let dir = tree.node(req.dir.handle)?;
        if dir.attr.object_type() != Some(ObjectType::Directory) {
            return make_error(StoreCode::NOT_DIRECTORY);
        }
        let dir_path = tree.path_of(req.dir.handle);
        if tree.failing_lists.contains(&dir_path) {
            return make_error_msg(StatusCode::FAULT_INJECTION, format!("list {}", dir_path));
        }

        let lower = match &req.token {
            ListToken::Start => Bound::Unbounded,
            ListToken::After(name) => Bound::Excluded(name.clone()),
            ListToken::End => return make_error(StoreCode::INVALID_TOKEN),
        };
        let limit = req.limit.max(1) as usize;

        let mut entries = Vec::new();
        let mut attrs = Vec::new();
        let mut range = dir.children.range((lower, Bound::Unbounded)).peekable();
        while entries.len() < limit {
            let Some((name, handle)) = range.next() else {
                break;
            };
            let child = tree.node(*handle)?;
            let mut attr = child.attr.clone();
            if attr.object_type() == Some(ObjectType::Directory) {
                attr.dirent_count = child.children.len() as u64;
            }
            entries.push(DirEntry {
                name: name.clone(),
                handle: *handle,
            });
            attrs.push(attr);
        }

        let token = match (range.peek(), entries.last()) {
            (Some(_), Some(last)) => ListToken::After(last.name.clone()),
            _ => ListToken::End,
        };
        Ok(ListRsp {
            entries,
            attrs,
            token,
        })
    }

    async fn remove(&self, req: RemoveReq) -> Result<RemoveRsp> {
        self.remove_calls.fetch_add(1, Ordering::Relaxed);
        let mut tree = self.tree.lock();
        let parent = tree.node(req.parent.handle)?;
        let handle = *parent.children.get(&req.name).ok_or_else(|| {
            Status::with_message(StoreCode::NOT_FOUND, req.name.clone())
        })?;
        if tree.node(handle)?.attr.object_type() == Some(ObjectType::Directory) {
            return make_error(StoreCode::IS_DIRECTORY);
        }
        let path = tree.child_path(req.parent.handle, &req.name);
        if tree.failing_removes.contains(&path) {
            return make_error_msg(StatusCode::FAULT_INJECTION, format!("remove {}", path));
        }

        tree.nodes.remove(&handle);
        if let Some(p) = tree.nodes.get_mut(&req.parent.handle) {
            p.children.remove(&req.name);
        }
        Ok(RemoveRsp {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn list_all(store: &MemStore, dir: ObjectRef, limit: u32) -> Vec<String> {
        let mut names = Vec::new();
        let mut token = ListToken::Start;
        loop {
            let rsp = store
                .list(ListReq {
                    dir,
                    token: token.clone(),
                    limit,
                })
                .await
                .unwrap();
            assert_eq!(rsp.entries.len(), rsp.attrs.len());
            names.extend(rsp.entries.into_iter().map(|e| e.name));
            if rsp.token.is_end() {
                break;
            }
            token = rsp.token;
        }
        names
    }

    #[tokio::test]
    async fn test_resolve_under_mount() {
        let store = MemStore::new("/mnt/fs");
        let r = store.resolve("/mnt/fs/users/a").await.unwrap();
        assert_eq!(r.internal_path, "/users/a");
        let r = store.resolve("/mnt/fs").await.unwrap();
        assert_eq!(r.internal_path, "");
        assert!(store.resolve("/mnt/fsx/a").await.is_err());
        assert!(store.resolve("/other").await.is_err());
    }

    #[tokio::test]
    async fn test_lookup_and_batched_list() {
        let store = MemStore::new("/mnt/fs");
        for i in 0..7 {
            store.insert(&format!("/d/f{}", i), SysAttr::file(1, 0, 0));
        }
        let dir = store
            .lookup(LookupReq {
                fs_id: store.fs_id(),
                path: "/d".into(),
                follow: false,
            })
            .await
            .unwrap()
            .object;

        let names = list_all(&store, dir, 3).await;
        assert_eq!(names, vec!["f0", "f1", "f2", "f3", "f4", "f5", "f6"]);
        assert_eq!(store.list_calls(), 3);
    }

    #[tokio::test]
    async fn test_directory_attr_reports_entry_count() {
        let store = MemStore::new("/mnt/fs");
        store.insert("/d/a", SysAttr::file(1, 0, 0));
        store.insert("/d/b", SysAttr::file(1, 0, 0));
        let root = ObjectRef::new(store.fs_id(), MEM_ROOT_HANDLE);
        let rsp = store
            .list(ListReq {
                dir: root,
                token: ListToken::Start,
                limit: 60,
            })
            .await
            .unwrap();
        assert_eq!(rsp.attrs[0].dirent_count, 2);
    }

    #[tokio::test]
    async fn test_remove_between_batches_skips_nothing() {
        let store = MemStore::new("/mnt/fs");
        for i in 0..4 {
            store.insert(&format!("/f{}", i), SysAttr::file(1, 0, 0));
        }
        let root = ObjectRef::new(store.fs_id(), MEM_ROOT_HANDLE);
        let first = store
            .list(ListReq {
                dir: root,
                token: ListToken::Start,
                limit: 2,
            })
            .await
            .unwrap();
        for e in &first.entries {
            store
                .remove(RemoveReq {
                    parent: root,
                    name: e.name.clone(),
                })
                .await
                .unwrap();
        }
        let second = store
            .list(ListReq {
                dir: root,
                token: first.token,
                limit: 2,
            })
            .await
            .unwrap();
        let names: Vec<_> = second.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["f2", "f3"]);
        assert!(second.token.is_end());
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let store = MemStore::new("/mnt/fs");
        store.insert("/d/keep", SysAttr::file(1, 0, 0));
        store.fail_list("/d");
        store.fail_remove("/d/keep");

        let d = store
            .lookup(LookupReq {
                fs_id: store.fs_id(),
                path: "/d".into(),
                follow: false,
            })
            .await
            .unwrap()
            .object;
        let err = store
            .list(ListReq {
                dir: d,
                token: ListToken::Start,
                limit: 60,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), StatusCode::FAULT_INJECTION);

        let err = store
            .remove(RemoveReq {
                parent: d,
                name: "keep".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), StatusCode::FAULT_INJECTION);
        assert!(store.exists("/d/keep"));
    }

    #[tokio::test]
    async fn test_remove_refuses_directories() {
        let store = MemStore::new("/mnt/fs");
        store.mkdir("/sub");
        let root = ObjectRef::new(store.fs_id(), MEM_ROOT_HANDLE);
        let err = store
            .remove(RemoveReq {
                parent: root,
                name: "sub".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), StoreCode::IS_DIRECTORY);
        assert!(store.exists("/sub"));
    }
}
