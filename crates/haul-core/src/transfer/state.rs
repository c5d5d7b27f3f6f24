//! The transfer lifecycle enum.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of the single managed transfer.
///
/// Exactly one state is active at a time; it is the single source of truth
/// the UI renders from. Valid transitions:
///
/// ```text
/// Idle ───────▶ Downloading ───▶ Completed ──▶ Idle (reset)
///                  │   ▲
///                  ▼   │ (resume)
///                 Paused ──────▶ Idle (reset)
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferState {
    /// No transfer started, or the last one was reset.
    #[default]
    Idle,
    /// Bytes are (or are about to be) moving.
    Downloading,
    /// Suspended with a continuation token; resumable.
    Paused,
    /// The artifact is fully written to its destination.
    Completed,
}

impl TransferState {
    /// String representation for logs and persisted records.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Downloading => "downloading",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }

}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
