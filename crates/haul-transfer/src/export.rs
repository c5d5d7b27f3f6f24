//! Directory exporter.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use haul_core::ports::ExporterPort;
use haul_core::transfer::ExportError;

/// Exports a completed artifact by copying it into a target directory.
///
/// The destination file keeps the artifact's own file name unless an
/// explicit name is set. The artifact itself is never moved or modified.
#[derive(Debug, Clone)]
pub struct DirectoryExporter {
    target_dir: PathBuf,
    file_name: Option<String>,
}

impl DirectoryExporter {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            file_name: None,
        }
    }

    /// Name the exported file explicitly instead of reusing the artifact's.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    fn export_path(&self, artifact: &Path) -> PathBuf {
        match &self.file_name {
            Some(name) => self.target_dir.join(name),
            None => {
                let name = artifact
                    .file_name()
                    .unwrap_or_else(|| std::ffi::OsStr::new("artifact"));
                self.target_dir.join(name)
            }
        }
    }
}

#[async_trait]
impl ExporterPort for DirectoryExporter {
    async fn export(&self, artifact: &Path) -> Result<(), ExportError> {
        if !tokio::fs::try_exists(artifact).await.unwrap_or(false) {
            return Err(ExportError::MissingArtifact {
                path: artifact.display().to_string(),
            });
        }

        tokio::fs::create_dir_all(&self.target_dir).await?;
        let target = self.export_path(artifact);
        tokio::fs::copy(artifact, &target).await?;

        tracing::debug!(
            target: "haul.export",
            from = %artifact.display(),
            to = %target.display(),
            "artifact copied"
        );
        Ok(())
    }
}
