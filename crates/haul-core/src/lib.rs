//! Core domain types and port definitions for haul.
//!
//! This crate holds the transfer domain model (descriptor, lifecycle state,
//! progress, resume snapshot, events, errors) and the port traits the rest
//! of the workspace implements. It depends on no adapter crates: no HTTP
//! client, no filesystem store, no async runtime beyond trait plumbing.

#![deny(unused_crate_dependencies)]

pub mod ports;
pub mod transfer;

// Re-export commonly used types for convenience
pub use ports::{
    ExporterPort, NoopExporter, NoopTransferEmitter, SnapshotStorePort, TransferEventEmitterPort,
};
pub use transfer::{
    ExportError, ResumeSnapshot, ResumeToken, StoreError, TransferDescriptor, TransferError,
    TransferEvent, TransferProgress, TransferResult, TransferState, TransportOptions,
};
