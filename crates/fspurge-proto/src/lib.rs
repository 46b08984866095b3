//! Store protocol types.
//!
//! These types model what the purge engine exchanges with the distributed
//! store: object references, per-entry attribute records, batched directory
//! listings and single-entry removal requests.

pub mod ops;
pub mod types;

pub use ops::*;
pub use types::*;

pub use fspurge_types::{FsId, Handle};
