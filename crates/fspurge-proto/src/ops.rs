//! Store request/response message types.

use fspurge_types::FsId;
use serde::{Deserialize, Serialize};

use crate::types::{DirEntry, ObjectRef, SysAttr};

// ---- Resolve ----

/// A local absolute path mapped onto its backing file system.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedPath {
    pub fs_id: FsId,
    /// Path relative to the file system root; empty means the root itself.
    pub internal_path: String,
}

// ---- Lookup ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LookupReq {
    pub fs_id: FsId,
    pub path: String,
    /// Follow a trailing symlink.
    pub follow: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LookupRsp {
    pub object: ObjectRef,
}

// ---- List ----

/// Continuation position within a directory listing.
///
/// Positions are names rather than offsets so that removing entries from a
/// directory between two batches does not make the next batch skip entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListToken {
    /// Beginning of the directory.
    #[default]
    Start,
    /// Resume with the first entry whose name sorts after this one.
    After(String),
    /// No more entries.
    End,
}

impl ListToken {
    pub fn is_end(&self) -> bool {
        matches!(self, ListToken::End)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListReq {
    pub dir: ObjectRef,
    pub token: ListToken,
    /// Maximum number of entries to return.
    pub limit: u32,
}

/// One batch of a listing. `entries[i]` is described by `attrs[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListRsp {
    pub entries: Vec<DirEntry>,
    pub attrs: Vec<SysAttr>,
    /// Where the next batch starts, or `End`.
    pub token: ListToken,
}

// ---- Remove ----

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoveReq {
    pub parent: ObjectRef,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoveRsp {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_token_default_is_start() {
        assert_eq!(ListToken::default(), ListToken::Start);
        assert!(!ListToken::After("x".into()).is_end());
        assert!(ListToken::End.is_end());
    }

    #[test]
    fn test_list_rsp_json() {
        let rsp = ListRsp {
            entries: vec![DirEntry {
                name: "a".into(),
                handle: fspurge_types::Handle(2),
            }],
            attrs: vec![SysAttr::file(1, 2, 3)],
            token: ListToken::After("a".into()),
        };
        let json = serde_json::to_string(&rsp).unwrap();
        let parsed: ListRsp = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rsp);
    }
}
