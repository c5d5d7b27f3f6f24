//! Transport abstraction for moving bytes.
//!
//! A transport owns the mechanics of fetching an artifact and writing it to
//! its destination. It reports progress through a `watch` channel and honors
//! cooperative suspension through a [`CancellationToken`]; a suspended run
//! returns a continuation token the same transport can later pick up from.

pub mod http;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use haul_core::transfer::{
    ResumeToken, TransferDescriptor, TransferError, TransferProgress,
};

pub use http::HttpTransport;

/// Terminal outcome of a single transport run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOutcome {
    /// All bytes are written to the descriptor's destination.
    Completed,
    /// The run stopped cooperatively; `token` resumes it later.
    Suspended { token: ResumeToken },
}

/// Port for transport implementations.
///
/// A run either completes, suspends (when `suspend` fires), or fails with
/// [`TransferError::TransferFailed`]. Implementations must flush all written
/// bytes before returning `Suspended` so a token always describes durable
/// on-disk state.
#[async_trait]
pub trait TransportPort: Send + Sync {
    /// Execute one transfer run.
    ///
    /// `resume_from` carries the continuation token of a previous suspended
    /// run of the same descriptor, or `None` for a fresh start. Progress is
    /// published through `progress_tx` as bytes land.
    async fn run(
        &self,
        descriptor: &TransferDescriptor,
        resume_from: Option<&ResumeToken>,
        progress_tx: watch::Sender<TransferProgress>,
        suspend: CancellationToken,
    ) -> Result<TransportOutcome, TransferError>;
}
