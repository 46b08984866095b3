//! Store client for a distributed file system mounted into the local
//! namespace.
//!
//! [`LocalStore`] implements [`fspurge_stubs::IStoreStub`] on top of the
//! mount: paths are resolved relative to the configured mount root, objects
//! are identified by inode number, directories are listed in name order in
//! bounded batches, and files are removed with `unlink`.

pub mod config;
pub mod error;
pub mod local;

pub use config::StoreConfig;
pub use error::{ClientError, ClientResult};
pub use local::LocalStore;
