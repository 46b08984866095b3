//! Entry classification.
//!
//! Turns the store's native attribute record for one listed entry into a
//! stat-like record the walker can dispatch on.

use fspurge_proto::{ObjectRef, ObjectType, SysAttr};

/// Unit of `EntryStat::blocks`.
pub const STAT_BLOCK_SIZE: u64 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Regular,
    Directory,
    Symlink,
    Unknown,
}

/// Normalized attributes of one entry.
///
/// Only `kind`, `size`, `atime` and `mtime` feed the retention policy; the
/// rest is carried for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryStat {
    pub kind: EntryKind,
    /// File system id of the containing store.
    pub dev: i32,
    pub ino: u64,
    pub mode: u32,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub blksize: u64,
    pub blocks: u64,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("entry has a null handle")]
    NullHandle,
    #[error("containing file system id is null")]
    NullFsId,
}

/// Classify `attr`, the attributes of the entry identified by `entry`.
///
/// Fails when either half of `entry` is the null value; such a record
/// cannot be trusted to describe a real object.
pub fn classify(attr: &SysAttr, entry: ObjectRef) -> Result<EntryStat, ClassifyError> {
    if entry.handle.is_null() {
        return Err(ClassifyError::NullHandle);
    }
    if entry.fs_id.is_null() {
        return Err(ClassifyError::NullFsId);
    }

    let (kind, nlink) = match attr.object_type() {
        Some(ObjectType::Metafile) => (EntryKind::Regular, 1),
        Some(ObjectType::Directory) => {
            (EntryKind::Directory, attr.dirent_count.saturating_add(2))
        }
        Some(ObjectType::Symlink) => (EntryKind::Symlink, 1),
        _ => (EntryKind::Unknown, 0),
    };

    Ok(EntryStat {
        kind,
        dev: entry.fs_id.0,
        ino: entry.handle.0,
        mode: attr.perms,
        nlink,
        uid: attr.owner,
        gid: attr.group,
        size: attr.size,
        blksize: attr.blksize,
        blocks: attr.size.div_ceil(STAT_BLOCK_SIZE),
        atime: attr.atime,
        mtime: attr.mtime,
        ctime: attr.ctime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fspurge_types::{FsId, Handle};

    fn entry(handle: u64) -> ObjectRef {
        ObjectRef::new(FsId(3), Handle(handle))
    }

    #[test]
    fn test_regular_file() {
        let mut attr = SysAttr::file(1025, 10, 20);
        attr.owner = 1000;
        attr.group = 100;
        let stat = classify(&attr, entry(42)).unwrap();
        assert_eq!(stat.kind, EntryKind::Regular);
        assert_eq!(stat.size, 1025);
        assert_eq!((stat.atime, stat.mtime), (10, 20));
        assert_eq!((stat.uid, stat.gid), (1000, 100));
        assert_eq!(stat.nlink, 1);
        assert_eq!(stat.blocks, 3);
        assert_eq!(stat.dev, 3);
        assert_eq!(stat.ino, 42);
        assert_eq!(stat.mode, 0o644);
    }

    #[test]
    fn test_directory_link_count() {
        let stat = classify(&SysAttr::directory(5), entry(7)).unwrap();
        assert_eq!(stat.kind, EntryKind::Directory);
        assert_eq!(stat.nlink, 7);

        let huge = classify(&SysAttr::directory(u64::MAX), entry(7)).unwrap();
        assert_eq!(huge.nlink, u64::MAX);
    }

    #[test]
    fn test_symlink() {
        let stat = classify(&SysAttr::symlink("/elsewhere"), entry(8)).unwrap();
        assert_eq!(stat.kind, EntryKind::Symlink);
        assert_eq!(stat.nlink, 1);
    }

    #[test]
    fn test_other_kinds_are_unknown() {
        for objtype in [0u8, ObjectType::Datafile as u8, ObjectType::DirData as u8, 64] {
            let attr = SysAttr {
                objtype,
                ..Default::default()
            };
            assert_eq!(classify(&attr, entry(9)).unwrap().kind, EntryKind::Unknown);
        }
    }

    #[test]
    fn test_null_identifiers_fail() {
        let attr = SysAttr::file(1, 1, 1);
        assert_eq!(
            classify(&attr, ObjectRef::new(FsId(3), Handle::NULL)),
            Err(ClassifyError::NullHandle)
        );
        assert_eq!(
            classify(&attr, ObjectRef::new(FsId::NULL, Handle(4))),
            Err(ClassifyError::NullFsId)
        );
    }

    #[test]
    fn test_empty_file_has_no_blocks() {
        let stat = classify(&SysAttr::file(0, 1, 1), entry(1)).unwrap();
        assert_eq!(stat.blocks, 0);
    }
}
