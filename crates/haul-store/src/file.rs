//! Filesystem-backed snapshot store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use haul_core::ports::SnapshotStorePort;
use haul_core::transfer::{ResumeSnapshot, StoreError};

/// Persists the resume snapshot as a single JSON file.
///
/// Writes go through a sibling `.tmp` file followed by a rename so a crash
/// mid-write can never leave a truncated snapshot behind. A missing or
/// unreadable file loads as `None`; corruption downgrades to a warning
/// rather than wedging startup.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store rooted at `path` (the snapshot file itself, not its
    /// directory).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl SnapshotStorePort for FileSnapshotStore {
    async fn save(&self, snapshot: &ResumeSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| StoreError::serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::from_io(&e))?;
        }

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| StoreError::from_io(&e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::from_io(&e))?;

        tracing::debug!(
            target: "haul.store",
            path = %self.path.display(),
            bytes = json.len(),
            "snapshot saved"
        );
        Ok(())
    }

    async fn load(&self) -> Result<Option<ResumeSnapshot>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::from_io(&e)),
        };

        match serde_json::from_slice::<ResumeSnapshot>(&bytes) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                // A corrupt snapshot must not block startup; treat as absent.
                tracing::warn!(
                    target: "haul.store",
                    path = %self.path.display(),
                    error = %e,
                    "discarding unreadable snapshot"
                );
                Ok(None)
            }
        }
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::from_io(&e)),
        }
    }
}
