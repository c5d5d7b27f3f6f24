//! Shared test doubles for controller tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use haul_core::ports::{ExporterPort, SnapshotStorePort, TransferEventEmitterPort};
use haul_core::transfer::{
    ExportError, ResumeSnapshot, ResumeToken, StoreError, TransferDescriptor, TransferError,
    TransferEvent, TransferProgress,
};
use haul_store::MemorySnapshotStore;
use haul_transfer::transport::{TransportOutcome, TransportPort};
use haul_transfer::TransferController;

/// One scripted transport run.
#[derive(Debug, Clone)]
pub enum FakeRun {
    /// Publish full progress, then complete.
    Complete { bytes: u64 },
    /// Publish partial progress, then wait for the suspend signal and
    /// return the given continuation token.
    AwaitSuspend {
        token: &'static str,
        bytes: u64,
        total: u64,
    },
    /// Fail immediately.
    Fail { message: &'static str },
}

/// Transport double driven by a script of [`FakeRun`]s.
///
/// Records the continuation token each run was asked to resume from so
/// tests can assert token plumbing.
#[derive(Debug, Default)]
pub struct FakeTransport {
    script: Mutex<VecDeque<FakeRun>>,
    seen_tokens: Mutex<Vec<Option<String>>>,
}

impl FakeTransport {
    pub fn scripted(runs: impl IntoIterator<Item = FakeRun>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(runs.into_iter().collect()),
            seen_tokens: Mutex::new(Vec::new()),
        })
    }

    /// Tokens passed to each run, in order.
    pub fn seen_tokens(&self) -> Vec<Option<String>> {
        self.seen_tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransportPort for FakeTransport {
    async fn run(
        &self,
        _descriptor: &TransferDescriptor,
        resume_from: Option<&ResumeToken>,
        progress_tx: watch::Sender<TransferProgress>,
        suspend: CancellationToken,
    ) -> Result<TransportOutcome, TransferError> {
        self.seen_tokens
            .lock()
            .unwrap()
            .push(resume_from.map(|t| t.as_str().to_string()));

        let run = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransferError::internal("fake transport script exhausted"))?;

        match run {
            FakeRun::Complete { bytes } => {
                progress_tx.send_replace(TransferProgress::new(bytes, bytes));
                Ok(TransportOutcome::Completed)
            }
            FakeRun::AwaitSuspend {
                token,
                bytes,
                total,
            } => {
                progress_tx.send_replace(TransferProgress::new(bytes, total));
                suspend.cancelled().await;
                Ok(TransportOutcome::Suspended {
                    token: ResumeToken::new(token),
                })
            }
            FakeRun::Fail { message } => Err(TransferError::transfer_failed(message)),
        }
    }
}

/// Emitter that records every event.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmitter {
    events: Arc<Mutex<Vec<TransferEvent>>>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TransferEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl TransferEventEmitterPort for RecordingEmitter {
    fn emit(&self, event: TransferEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn clone_box(&self) -> Box<dyn TransferEventEmitterPort> {
        Box::new(self.clone())
    }
}

/// Exporter that records exported paths, optionally failing.
#[derive(Debug, Default)]
pub struct RecordingExporter {
    exported: Mutex<Vec<PathBuf>>,
    fail: bool,
}

impl RecordingExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            exported: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn exported(&self) -> Vec<PathBuf> {
        self.exported.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExporterPort for RecordingExporter {
    async fn export(&self, artifact: &Path) -> Result<(), ExportError> {
        if self.fail {
            return Err(ExportError::MissingArtifact {
                path: artifact.display().to_string(),
            });
        }
        self.exported.lock().unwrap().push(artifact.to_path_buf());
        Ok(())
    }
}

/// Poll until the controller reaches `expected`, or panic after two seconds.
pub async fn wait_for_state(
    controller: &TransferController,
    expected: haul_core::transfer::TransferState,
) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if controller.state().await == expected {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for state {expected}, currently {}",
            controller.state().await
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Controls a [`GatedStore`]: observe a save entering, then let it proceed.
pub struct GateHandle {
    open_tx: watch::Sender<bool>,
    entered_rx: watch::Receiver<bool>,
}

impl GateHandle {
    /// Block until a save call has reached the store.
    pub async fn saving_entered(&self) {
        let mut rx = self.entered_rx.clone();
        while !*rx.borrow() {
            rx.changed().await.expect("gated store dropped");
        }
    }

    /// Let blocked saves run to completion.
    pub fn release(&self) {
        self.open_tx.send_replace(true);
    }
}

/// Memory store whose `save` blocks until released, for racing other
/// operations into the persistence window. `load` and `clear` pass through.
pub struct GatedStore {
    inner: MemorySnapshotStore,
    open_rx: watch::Receiver<bool>,
    entered_tx: watch::Sender<bool>,
}

impl GatedStore {
    pub fn new() -> (Arc<Self>, GateHandle) {
        let (open_tx, open_rx) = watch::channel(false);
        let (entered_tx, entered_rx) = watch::channel(false);
        let store = Arc::new(Self {
            inner: MemorySnapshotStore::new(),
            open_rx,
            entered_tx,
        });
        (
            store,
            GateHandle {
                open_tx,
                entered_rx,
            },
        )
    }

    pub fn is_populated(&self) -> bool {
        self.inner.is_populated()
    }
}

#[async_trait]
impl SnapshotStorePort for GatedStore {
    async fn save(&self, snapshot: &ResumeSnapshot) -> Result<(), StoreError> {
        self.entered_tx.send_replace(true);
        let mut open = self.open_rx.clone();
        while !*open.borrow() {
            open.changed()
                .await
                .map_err(|_| StoreError::serialization("gate dropped"))?;
        }
        self.inner.save(snapshot).await
    }

    async fn load(&self) -> Result<Option<ResumeSnapshot>, StoreError> {
        self.inner.load().await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.inner.clear().await
    }
}

/// Poll until `condition` holds, or panic after two seconds.
pub async fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if condition() {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting until {what}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn descriptor() -> TransferDescriptor {
    TransferDescriptor::new("https://example.com/large.mp4", "/tmp/haul-test/large.mp4")
}
