//! Transfer domain types, events, and errors.
//!
//! This module contains pure data types for the resumable-transfer system.
//! No I/O, networking, or runtime dependencies allowed.
//!
//! # Structure
//!
//! - `descriptor` - Immutable transfer identity (`TransferDescriptor`, `TransportOptions`)
//! - `snapshot` - Persisted continuation data (`ResumeSnapshot`, `ResumeToken`)
//! - `progress` - Byte-count progress reporting (`TransferProgress`)
//! - `state` - The lifecycle enum (`TransferState`)
//! - `events` - Transfer events for UI consumption (`TransferEvent`)
//! - `errors` - Error types for transfer and storage operations

pub mod descriptor;
pub mod errors;
pub mod events;
pub mod progress;
pub mod snapshot;
pub mod state;

// Re-export commonly used types
pub use descriptor::{TransferDescriptor, TransportOptions};
pub use errors::{ExportError, StoreError, TransferError, TransferResult};
pub use events::TransferEvent;
pub use progress::TransferProgress;
pub use snapshot::{ResumeSnapshot, ResumeToken};
pub use state::TransferState;
