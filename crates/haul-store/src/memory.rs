//! In-memory snapshot store for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use haul_core::ports::SnapshotStorePort;
use haul_core::transfer::{ResumeSnapshot, StoreError};

/// Test-only store holding the snapshot in a mutex-guarded slot.
///
/// Round-trips through JSON so serialization bugs surface in tests exactly
/// as they would against the file store.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a snapshot is currently held.
    pub fn is_populated(&self) -> bool {
        self.slot.lock().map(|s| s.is_some()).unwrap_or(false)
    }
}

#[async_trait]
impl SnapshotStorePort for MemorySnapshotStore {
    async fn save(&self, snapshot: &ResumeSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string(snapshot)
            .map_err(|e| StoreError::serialization(e.to_string()))?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::serialization("store mutex poisoned"))?;
        *slot = Some(json);
        Ok(())
    }

    async fn load(&self) -> Result<Option<ResumeSnapshot>, StoreError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::serialization("store mutex poisoned"))?;
        match slot.as_deref() {
            Some(json) => match serde_json::from_str(json) {
                Ok(snapshot) => Ok(Some(snapshot)),
                Err(e) => {
                    // Same contract as the file store: corruption is absence.
                    tracing::warn!(
                        target: "haul.store",
                        error = %e,
                        "discarding unreadable snapshot"
                    );
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::serialization("store mutex poisoned"))?;
        *slot = None;
        Ok(())
    }
}
