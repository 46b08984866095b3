//! Client-side store interface for the purge engine.
//!
//! [`IStoreStub`] is the narrow set of store operations a purge run needs:
//! path resolution, lookup, batched listing with attributes, and removal of
//! a single entry. Concrete implementations backed by a real store live in
//! `fspurge-client`. This crate also provides a closure-driven mock and an
//! in-memory tree that are useful for unit testing without a running store.

pub mod mem_store;
pub mod store_stub;

pub use mem_store::MemStore;
pub use store_stub::{IStoreStub, MockStoreStub};
