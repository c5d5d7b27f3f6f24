//! Broadcast-channel event emitter.

use tokio::sync::broadcast;

use haul_core::ports::TransferEventEmitterPort;
use haul_core::transfer::TransferEvent;

/// Fans transfer events out to any number of subscribers.
///
/// Built on a `tokio::sync::broadcast` channel: emission never blocks, and
/// a slow subscriber drops old events rather than stalling the controller.
#[derive(Debug, Clone)]
pub struct BroadcastEmitter {
    tx: broadcast::Sender<TransferEvent>,
}

impl BroadcastEmitter {
    /// Create an emitter buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all events emitted from this point on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TransferEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastEmitter {
    fn default() -> Self {
        Self::new(64)
    }
}

impl TransferEventEmitterPort for BroadcastEmitter {
    fn emit(&self, event: TransferEvent) {
        // send only fails with zero subscribers, which is fine
        let _ = self.tx.send(event);
    }

    fn clone_box(&self) -> Box<dyn TransferEventEmitterPort> {
        Box::new(self.clone())
    }
}
