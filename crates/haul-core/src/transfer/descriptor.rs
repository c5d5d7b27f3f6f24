//! Immutable identity of a download.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Immutable identity of a single download.
///
/// A descriptor is created once (fresh run) or reconstructed from a persisted
/// [`ResumeSnapshot`](super::ResumeSnapshot) and never mutated afterwards.
/// The serialized field names (`url`, `fileUri`, `options`) are the wire
/// format of the persisted snapshot and must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDescriptor {
    /// Source locator for the artifact.
    #[serde(rename = "url")]
    pub source_url: String,
    /// Local path the artifact is written to.
    #[serde(rename = "fileUri")]
    pub destination_path: PathBuf,
    /// Transport configuration, opaque to the core.
    #[serde(rename = "options", default)]
    pub options: TransportOptions,
}

impl TransferDescriptor {
    /// Create a descriptor with default transport options.
    pub fn new(source_url: impl Into<String>, destination_path: impl Into<PathBuf>) -> Self {
        Self {
            source_url: source_url.into(),
            destination_path: destination_path.into(),
            options: TransportOptions::default(),
        }
    }

    /// Set the transport options.
    #[must_use]
    pub fn with_options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }
}

/// Transport configuration carried by a descriptor.
///
/// The core stores and persists this without interpreting it; only the
/// transport implementation reads the fields. All fields default so that
/// snapshots written by older versions still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportOptions {
    /// Extra request headers, applied verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Override for the transport's user agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl TransportOptions {
    /// Add a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}
