//! Resumable transfer engine for haul.
//!
//! Wires the domain model from `haul-core` to a concrete HTTP transport,
//! the lifecycle controller, and the adapter implementations (broadcast
//! event emitter, directory exporter).
//!
//! # Typical wiring
//!
//! ```ignore
//! let emitter = Arc::new(BroadcastEmitter::default());
//! let controller = TransferController::initialize(ControllerDeps {
//!     descriptor: TransferDescriptor::new(url, destination),
//!     transport: Arc::new(HttpTransport::new()),
//!     store: Arc::new(FileSnapshotStore::new(state_path)),
//!     exporter: Arc::new(DirectoryExporter::new(export_dir)),
//!     event_emitter: emitter.clone(),
//! })
//! .await?;
//!
//! controller.begin_download().await?;
//! ```

#![deny(unused_crate_dependencies)]

pub mod controller;
pub mod emitter;
pub mod export;
pub mod resumable;
pub mod transport;

pub use controller::{ControllerDeps, TransferController};
pub use emitter::BroadcastEmitter;
pub use export::DirectoryExporter;
pub use resumable::ResumableTransfer;
pub use transport::{HttpTransport, TransportOutcome, TransportPort};

// Re-export the domain crate for downstream convenience
pub use haul_core as domain;

// Dev-dependencies exercised only by integration tests
#[cfg(test)]
use haul_store as _;
#[cfg(test)]
use wiremock as _;
