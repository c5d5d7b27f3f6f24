//! Transfer event emitter port.
//!
//! This port abstracts event emission, allowing the transfer controller to
//! publish lifecycle and progress events without coupling to a delivery
//! mechanism (broadcast channel, IPC bridge, log sink).

use crate::transfer::TransferEvent;

/// Port for emitting transfer events.
///
/// Implementations handle the actual delivery. `emit` is fire-and-forget
/// and must not block; a slow or absent consumer is the implementation's
/// problem, never the controller's.
pub trait TransferEventEmitterPort: Send + Sync {
    /// Emit a transfer event.
    fn emit(&self, event: TransferEvent);

    /// Clone this emitter into a boxed trait object.
    ///
    /// This enables cloning of `Arc<dyn TransferEventEmitterPort>` without
    /// requiring the underlying type to implement Clone.
    fn clone_box(&self) -> Box<dyn TransferEventEmitterPort>;
}

/// A no-op emitter for tests and contexts that do not observe events.
#[derive(Debug, Clone, Default)]
pub struct NoopTransferEmitter;

impl NoopTransferEmitter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TransferEventEmitterPort for NoopTransferEmitter {
    fn emit(&self, _event: TransferEvent) {
        // Intentionally do nothing
    }

    fn clone_box(&self) -> Box<dyn TransferEventEmitterPort> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::transfer::TransferState;

    #[test]
    fn noop_emitter_discards_events() {
        let emitter = NoopTransferEmitter::new();
        emitter.emit(TransferEvent::state_changed(TransferState::Downloading));
    }

    #[test]
    fn noop_emitter_clone_box() {
        let emitter = NoopTransferEmitter::new();
        let boxed: Box<dyn TransferEventEmitterPort> = emitter.clone_box();
        boxed.emit(TransferEvent::state_changed(TransferState::Idle));
    }

    #[test]
    fn arc_emitter_is_usable() {
        let emitter: Arc<dyn TransferEventEmitterPort> = Arc::new(NoopTransferEmitter::new());
        emitter.emit(TransferEvent::state_changed(TransferState::Completed));
    }
}
