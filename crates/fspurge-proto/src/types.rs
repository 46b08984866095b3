//! Store object types.
//!
//! Attribute records are reported by the store in its native shape; the
//! purge engine normalizes them into stat-like records before applying any
//! policy.

use fspurge_types::{FsId, Handle};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Object type enum
// ---------------------------------------------------------------------------

/// Kind of object as reported by the store.
///
/// The discriminants are bit values so that the store can express masks of
/// types in a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ObjectType {
    /// User-visible file; its data lives in datafiles.
    Metafile = 1,
    /// Data stripe of a metafile, never listed under a user directory.
    Datafile = 2,
    Directory = 4,
    Symlink = 8,
    /// Directory entry shard.
    DirData = 16,
    Internal = 32,
}

impl TryFrom<u8> for ObjectType {
    type Error = ();
    fn try_from(v: u8) -> Result<Self, ()> {
        match v {
            1 => Ok(Self::Metafile),
            2 => Ok(Self::Datafile),
            4 => Ok(Self::Directory),
            8 => Ok(Self::Symlink),
            16 => Ok(Self::DirData),
            32 => Ok(Self::Internal),
            _ => Err(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Object reference
// ---------------------------------------------------------------------------

/// A traversable reference to one object: the file system it lives in and
/// its handle within that file system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ObjectRef {
    pub fs_id: FsId,
    pub handle: Handle,
}

impl ObjectRef {
    pub fn new(fs_id: FsId, handle: Handle) -> Self {
        Self { fs_id, handle }
    }

    /// Whether either half of the reference is the reserved null value.
    pub fn is_null(&self) -> bool {
        self.fs_id.is_null() || self.handle.is_null()
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// The store's full attribute set for one object.
///
/// Times are whole seconds since the Unix epoch. `objtype` is kept raw so
/// that objects of kinds this crate does not know about still round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SysAttr {
    pub owner: u32,
    pub group: u32,
    pub perms: u32,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
    pub size: u64,
    pub objtype: u8,
    /// Number of entries; meaningful for directories only.
    pub dirent_count: u64,
    pub blksize: u64,
    pub dfile_count: u32,
    pub link_target: Option<String>,
}

impl SysAttr {
    /// Returns the `ObjectType` for this record, if it is a known one.
    pub fn object_type(&self) -> Option<ObjectType> {
        ObjectType::try_from(self.objtype).ok()
    }

    /// Attributes of a regular file with the given size and times.
    pub fn file(size: u64, atime: i64, mtime: i64) -> Self {
        Self {
            perms: 0o644,
            atime,
            mtime,
            ctime: mtime,
            size,
            objtype: ObjectType::Metafile as u8,
            blksize: DEFAULT_BLKSIZE,
            dfile_count: 1,
            ..Default::default()
        }
    }

    /// Attributes of a directory holding `dirent_count` entries.
    pub fn directory(dirent_count: u64) -> Self {
        Self {
            perms: 0o755,
            objtype: ObjectType::Directory as u8,
            dirent_count,
            blksize: DEFAULT_BLKSIZE,
            ..Default::default()
        }
    }

    /// Attributes of a symbolic link pointing at `target`.
    pub fn symlink(target: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            perms: 0o777,
            size: target.len() as u64,
            objtype: ObjectType::Symlink as u8,
            blksize: DEFAULT_BLKSIZE,
            link_target: Some(target),
            ..Default::default()
        }
    }
}

/// Block size reported when the store does not supply one.
pub const DEFAULT_BLKSIZE: u64 = 4096;

// ---------------------------------------------------------------------------
// Directory entry
// ---------------------------------------------------------------------------

/// One child of a directory as reported by a listing call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub handle: Handle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_from_raw() {
        assert_eq!(ObjectType::try_from(1), Ok(ObjectType::Metafile));
        assert_eq!(ObjectType::try_from(4), Ok(ObjectType::Directory));
        assert_eq!(ObjectType::try_from(8), Ok(ObjectType::Symlink));
        assert!(ObjectType::try_from(3).is_err());
        assert!(ObjectType::try_from(0).is_err());
    }

    #[test]
    fn test_object_ref_null() {
        assert!(ObjectRef::default().is_null());
        assert!(ObjectRef::new(FsId(1), Handle::NULL).is_null());
        assert!(ObjectRef::new(FsId::NULL, Handle(5)).is_null());
        assert!(!ObjectRef::new(FsId(1), Handle(5)).is_null());
    }

    #[test]
    fn test_attr_constructors() {
        let f = SysAttr::file(100, 10, 20);
        assert_eq!(f.object_type(), Some(ObjectType::Metafile));
        assert_eq!(f.size, 100);
        assert_eq!((f.atime, f.mtime), (10, 20));

        let d = SysAttr::directory(3);
        assert_eq!(d.object_type(), Some(ObjectType::Directory));
        assert_eq!(d.dirent_count, 3);

        let l = SysAttr::symlink("../target");
        assert_eq!(l.object_type(), Some(ObjectType::Symlink));
        assert_eq!(l.size, 9);
    }

    #[test]
    fn test_unknown_objtype() {
        let attr = SysAttr {
            objtype: 64,
            ..Default::default()
        };
        assert_eq!(attr.object_type(), None);
    }

    #[test]
    fn test_dir_entry_serde() {
        let entry = DirEntry {
            name: "test.txt".to_string(),
            handle: Handle(999),
        };
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: DirEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }
}
