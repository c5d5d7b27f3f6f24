//! Resume snapshot persistence port.

use async_trait::async_trait;

use crate::transfer::{ResumeSnapshot, StoreError};

/// Port for persisting the single resume snapshot.
///
/// The store holds at most one snapshot at a time: saving overwrites the
/// previous one, and clearing removes it. Implementations decide where the
/// snapshot lives (a JSON file, an in-memory slot for tests).
#[async_trait]
pub trait SnapshotStorePort: Send + Sync {
    /// Persist the snapshot, replacing any previous one.
    async fn save(&self, snapshot: &ResumeSnapshot) -> Result<(), StoreError>;

    /// Load the persisted snapshot, if any.
    ///
    /// A missing snapshot is `Ok(None)`, not an error. Implementations
    /// should also treat an unreadable (corrupt) record as `None` so a bad
    /// snapshot can never wedge startup.
    async fn load(&self) -> Result<Option<ResumeSnapshot>, StoreError>;

    /// Remove the persisted snapshot. Clearing an empty store is a no-op.
    async fn clear(&self) -> Result<(), StoreError>;
}
