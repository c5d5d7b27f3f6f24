//! Structured events emitted over the transfer's lifetime.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{TransferProgress, TransferState};

/// Events published through the event emitter port.
///
/// Tagged so frontends can dispatch on the `type` field of the payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransferEvent {
    /// The lifecycle state changed.
    StateChanged { state: TransferState },

    /// Byte counters moved. `percentage` is omitted when the total size
    /// is unknown.
    Progress {
        bytes_written: u64,
        bytes_expected: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        percentage: Option<f64>,
    },

    /// The artifact finished writing to its destination.
    Completed { destination: String },

    /// The transfer failed and was rolled back.
    Failed { error: String },
}

impl TransferEvent {
    #[must_use]
    pub const fn state_changed(state: TransferState) -> Self {
        Self::StateChanged { state }
    }

    #[must_use]
    pub fn progress(progress: &TransferProgress) -> Self {
        Self::Progress {
            bytes_written: progress.bytes_written,
            bytes_expected: progress.bytes_expected,
            percentage: progress.percent(),
        }
    }

    #[must_use]
    pub fn completed(destination: &Path) -> Self {
        Self::Completed {
            destination: destination.display().to_string(),
        }
    }

    #[must_use]
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }

    /// Channel name the event is published under.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "transfer:state",
            Self::Progress { .. } => "transfer:progress",
            Self::Completed { .. } => "transfer:completed",
            Self::Failed { .. } => "transfer:failed",
        }
    }
}
