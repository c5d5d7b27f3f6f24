//! Error types shared across the transfer stack.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience alias for fallible transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Errors produced while persisting or recalling a resume snapshot.
///
/// Serializable and clonable so adapters can carry it in event payloads
/// instead of holding a live `std::io::Error`.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum StoreError {
    /// Underlying filesystem failure.
    #[error("snapshot store i/o error ({kind}): {message}")]
    Io {
        /// Stringified [`std::io::ErrorKind`].
        kind: String,
        message: String,
    },

    /// The snapshot could not be encoded or decoded.
    #[error("snapshot serialization error: {message}")]
    Serialization { message: String },
}

impl StoreError {
    pub fn from_io(err: &std::io::Error) -> Self {
        Self::Io {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

/// Errors produced while exporting a completed artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The artifact to export does not exist at the expected path.
    #[error("artifact not found at {path}")]
    MissingArtifact { path: String },

    /// Copying to the export destination failed.
    #[error("export i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error for transfer operations.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Snapshot persistence failed.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The network transfer itself failed mid-flight.
    #[error("transfer failed: {message}")]
    TransferFailed { message: String },

    /// The operation is not valid in the current lifecycle state.
    #[error("cannot {operation}: {reason}")]
    InvalidState {
        operation: &'static str,
        reason: String,
    },

    /// Exporting the completed artifact failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// A bug or broken internal invariant.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl TransferError {
    pub fn transfer_failed(message: impl Into<String>) -> Self {
        Self::TransferFailed {
            message: message.into(),
        }
    }

    pub fn invalid_state(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidState {
            operation,
            reason: reason.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the UI should treat this as a state-machine rejection rather
    /// than a real failure.
    #[must_use]
    pub const fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}
