strong_type!(FsId, i32);
strong_type!(Handle, u64);

impl FsId {
    /// The reserved "no file system" identifier.
    pub const NULL: FsId = FsId(0);

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

impl Handle {
    /// The reserved "no object" handle.
    pub const NULL: Handle = Handle(0);

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}
