//! Persisted continuation state for a paused transfer.

use serde::{Deserialize, Serialize};

use super::descriptor::TransferDescriptor;

/// Opaque continuation data produced by a transport when a transfer is
/// suspended.
///
/// The core never inspects the contents; a token is only meaningful to the
/// transport implementation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeToken(String);

impl ResumeToken {
    /// Wrap transport-produced continuation data.
    pub fn new(data: impl Into<String>) -> Self {
        Self(data.into())
    }

    /// The raw continuation data.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token carries any data at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One resumable-transfer checkpoint: everything needed to reconstruct a
/// paused transfer after a process restart.
///
/// Wire shape: `{url, fileUri, options, resumeData}`. A snapshot is valid
/// only for the transport implementation that produced its token, and must
/// not be reused after the transfer completes or is reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeSnapshot {
    /// Identity of the transfer the checkpoint belongs to.
    #[serde(flatten)]
    pub descriptor: TransferDescriptor,
    /// Transport continuation data captured at pause time.
    #[serde(rename = "resumeData")]
    pub resume_token: ResumeToken,
}

impl ResumeSnapshot {
    /// Create a snapshot from a descriptor and a captured token.
    pub const fn new(descriptor: TransferDescriptor, resume_token: ResumeToken) -> Self {
        Self {
            descriptor,
            resume_token,
        }
    }
}
