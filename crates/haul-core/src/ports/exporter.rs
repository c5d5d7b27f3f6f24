//! Artifact export port.

use std::path::Path;

use async_trait::async_trait;

use crate::transfer::ExportError;

/// Port for handing a completed artifact to the outside world.
///
/// Export never mutates the artifact or the transfer lifecycle; a failed
/// export leaves the completed transfer intact so it can be retried.
#[async_trait]
pub trait ExporterPort: Send + Sync {
    /// Export the artifact at `artifact` (e.g. copy it to a user-chosen
    /// directory, hand it to a share sheet).
    async fn export(&self, artifact: &Path) -> Result<(), ExportError>;
}

/// A no-op exporter for tests and contexts without an export surface.
#[derive(Debug, Clone, Default)]
pub struct NoopExporter;

impl NoopExporter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExporterPort for NoopExporter {
    async fn export(&self, _artifact: &Path) -> Result<(), ExportError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_exporter_always_succeeds() {
        let exporter = NoopExporter::new();
        assert!(exporter.export(Path::new("/nowhere")).await.is_ok());
    }
}
