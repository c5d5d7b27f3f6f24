//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the transfer domain expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No HTTP client or filesystem types in any signature
//! - No async runtime primitives (channels, cancellation tokens) leak through
//! - Emitters are fire-and-forget and must not block

pub mod event_emitter;
pub mod exporter;
pub mod snapshot_store;

pub use event_emitter::{NoopTransferEmitter, TransferEventEmitterPort};
pub use exporter::{ExporterPort, NoopExporter};
pub use snapshot_store::SnapshotStorePort;
