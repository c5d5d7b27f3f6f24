//! Snapshot store implementations for haul.
//!
//! Provides the filesystem-backed [`FileSnapshotStore`] used in production
//! and an in-memory store for tests.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod file;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use file::FileSnapshotStore;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemorySnapshotStore;
