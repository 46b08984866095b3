//! Store stub trait and mock implementation.

use async_trait::async_trait;
use fspurge_proto::{
    ListReq, ListRsp, ListToken, LookupReq, LookupRsp, ObjectRef, RemoveReq, RemoveRsp,
    ResolvedPath,
};
use fspurge_types::{FsId, Handle, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Client-side stub for calling the store.
///
/// Calls are awaited one at a time by a purge run; implementations do not
/// need to support concurrent use of the same directory.
#[async_trait]
pub trait IStoreStub: Send + Sync {
    /// Map a local absolute path onto its backing file system.
    async fn resolve(&self, path: &str) -> Result<ResolvedPath>;
    /// Resolve a file-system-relative path to an object reference.
    async fn lookup(&self, req: LookupReq) -> Result<LookupRsp>;
    /// Read one batch of a directory together with each entry's attributes.
    async fn list(&self, req: ListReq) -> Result<ListRsp>;
    /// Remove one non-directory entry by name.
    async fn remove(&self, req: RemoveReq) -> Result<RemoveRsp>;
    /// Release whatever the client holds for `dir`, a directory the caller
    /// is done with. Later calls naming `dir` may fail.
    fn forget(&self, _dir: ObjectRef) {}
}

// ---------------------------------------------------------------------------
// Mock implementation
// ---------------------------------------------------------------------------

type Handler<Req, Rsp> = Box<dyn Fn(Req) -> Result<Rsp> + Send + Sync>;
type Observer<T> = Box<dyn Fn(T) + Send + Sync>;

/// A configurable mock for [`IStoreStub`].
///
/// Each call can be overridden with a closure. If no handler is installed
/// the mock answers as a store holding a single empty root directory.
pub struct MockStoreStub {
    pub resolve_handler: Mutex<Option<Handler<String, ResolvedPath>>>,
    pub lookup_handler: Mutex<Option<Handler<LookupReq, LookupRsp>>>,
    pub list_handler: Mutex<Option<Handler<ListReq, ListRsp>>>,
    pub remove_handler: Mutex<Option<Handler<RemoveReq, RemoveRsp>>>,
    pub forget_handler: Mutex<Option<Observer<ObjectRef>>>,
}

/// File system id reported by the mock's default handlers.
pub const MOCK_FS_ID: FsId = FsId(1);
/// Root handle reported by the mock's default handlers.
pub const MOCK_ROOT_HANDLE: Handle = Handle(1);

impl MockStoreStub {
    pub fn new() -> Self {
        Self {
            resolve_handler: Mutex::new(None),
            lookup_handler: Mutex::new(None),
            list_handler: Mutex::new(None),
            remove_handler: Mutex::new(None),
            forget_handler: Mutex::new(None),
        }
    }

    /// Wrap in an `Arc` for convenient sharing.
    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn on_resolve(
        &self,
        f: impl Fn(String) -> Result<ResolvedPath> + Send + Sync + 'static,
    ) {
        *self.resolve_handler.lock() = Some(Box::new(f));
    }

    pub fn on_lookup(
        &self,
        f: impl Fn(LookupReq) -> Result<LookupRsp> + Send + Sync + 'static,
    ) {
        *self.lookup_handler.lock() = Some(Box::new(f));
    }

    pub fn on_list(&self, f: impl Fn(ListReq) -> Result<ListRsp> + Send + Sync + 'static) {
        *self.list_handler.lock() = Some(Box::new(f));
    }

    pub fn on_remove(
        &self,
        f: impl Fn(RemoveReq) -> Result<RemoveRsp> + Send + Sync + 'static,
    ) {
        *self.remove_handler.lock() = Some(Box::new(f));
    }

    pub fn on_forget(&self, f: impl Fn(ObjectRef) + Send + Sync + 'static) {
        *self.forget_handler.lock() = Some(Box::new(f));
    }
}

impl Default for MockStoreStub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IStoreStub for MockStoreStub {
    async fn resolve(&self, path: &str) -> Result<ResolvedPath> {
        let guard = self.resolve_handler.lock();
        match guard.as_ref() {
            Some(f) => f(path.to_string()),
            None => Ok(ResolvedPath {
                fs_id: MOCK_FS_ID,
                internal_path: String::new(),
            }),
        }
    }

    async fn lookup(&self, req: LookupReq) -> Result<LookupRsp> {
        let guard = self.lookup_handler.lock();
        match guard.as_ref() {
            Some(f) => f(req),
            None => Ok(LookupRsp {
                object: ObjectRef::new(req.fs_id, MOCK_ROOT_HANDLE),
            }),
        }
    }

    async fn list(&self, req: ListReq) -> Result<ListRsp> {
        let guard = self.list_handler.lock();
        match guard.as_ref() {
            Some(f) => f(req),
            None => Ok(ListRsp {
                entries: Vec::new(),
                attrs: Vec::new(),
                token: ListToken::End,
            }),
        }
    }

    async fn remove(&self, req: RemoveReq) -> Result<RemoveRsp> {
        let guard = self.remove_handler.lock();
        match guard.as_ref() {
            Some(f) => f(req),
            None => Ok(RemoveRsp {}),
        }
    }

    fn forget(&self, dir: ObjectRef) {
        if let Some(f) = self.forget_handler.lock().as_ref() {
            f(dir);
        }
    }
}

/// Blanket implementation so `Arc<T>` can be used wherever `T: IStoreStub`.
#[async_trait]
impl<T: IStoreStub + ?Sized> IStoreStub for Arc<T> {
    async fn resolve(&self, path: &str) -> Result<ResolvedPath> {
        (**self).resolve(path).await
    }
    async fn lookup(&self, req: LookupReq) -> Result<LookupRsp> {
        (**self).lookup(req).await
    }
    async fn list(&self, req: ListReq) -> Result<ListRsp> {
        (**self).list(req).await
    }
    async fn remove(&self, req: RemoveReq) -> Result<RemoveRsp> {
        (**self).remove(req).await
    }
    fn forget(&self, dir: ObjectRef) {
        (**self).forget(dir)
    }
}
