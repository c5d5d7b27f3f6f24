//! Transfer controller: the single state machine driving one transfer.
//!
//! # Architecture
//!
//! - **Controller**: owns the lifecycle state and orchestrates runs
//! - **Transfer**: executes runs, writes only to `watch::Sender` (no events)
//! - **Bridge task**: subscribes to the progress channel, emits events with
//!   rate-limiting
//!
//! # Concurrency Model
//!
//! - One `Mutex<Inner>` guards state, transfer, and the active run; lock
//!   scopes stay short and never cross an I/O await
//! - Lease tokens prevent stale finalize commits after a reset
//! - Pause flips state optimistically, then awaits run settlement through a
//!   `watch` channel so the checkpoint is persisted before pause returns

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::interval;

use haul_core::ports::{ExporterPort, SnapshotStorePort, TransferEventEmitterPort};
use haul_core::transfer::{
    TransferDescriptor, TransferError, TransferEvent, TransferProgress, TransferResult,
    TransferState,
};

use crate::resumable::ResumableTransfer;
use crate::transport::{TransportOutcome, TransportPort};

/// Lease ID for the active run.
///
/// Used to prevent stale finalize commits when the transfer is reset while
/// a run is still unwinding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LeaseId(u64);

/// How the active run was started; decides the rollback state on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunKind {
    Fresh,
    Resumed,
}

/// Bookkeeping for the run currently in flight.
struct ActiveRun {
    lease: LeaseId,
    kind: RunKind,
    /// Flipped to `true` once the run's outcome is fully applied, including
    /// checkpoint persistence. Pause waits on this.
    settled_tx: watch::Sender<bool>,
}

struct Inner {
    state: TransferState,
    transfer: ResumableTransfer,
    active: Option<ActiveRun>,
    /// Bumped on every reset; a checkpoint save that straddles a reset is
    /// detected by comparing generations and discarded.
    generation: u64,
}

/// Dependencies injected into [`TransferController::initialize`].
pub struct ControllerDeps {
    /// Canonical identity of the managed transfer.
    pub descriptor: TransferDescriptor,
    pub transport: Arc<dyn TransportPort>,
    pub store: Arc<dyn SnapshotStorePort>,
    pub exporter: Arc<dyn ExporterPort>,
    pub event_emitter: Arc<dyn TransferEventEmitterPort>,
}

/// State machine for the single managed transfer.
///
/// All operations validate the current state first and reject out-of-order
/// calls with [`TransferError::InvalidState`] instead of corrupting the
/// lifecycle.
pub struct TransferController {
    inner: Mutex<Inner>,
    descriptor: TransferDescriptor,
    transport: Arc<dyn TransportPort>,
    store: Arc<dyn SnapshotStorePort>,
    exporter: Arc<dyn ExporterPort>,
    event_emitter: Arc<dyn TransferEventEmitterPort>,
    progress_tx: watch::Sender<TransferProgress>,
    lease_counter: AtomicU64,
}

impl TransferController {
    /// Build the controller, restoring a paused transfer from the store
    /// when a snapshot exists.
    ///
    /// A restored transfer starts `Paused`, never auto-resumed; the first
    /// byte only moves on an explicit resume call.
    pub async fn initialize(deps: ControllerDeps) -> TransferResult<Arc<Self>> {
        let (progress_tx, _) = watch::channel(TransferProgress::default());

        let (transfer, state) = match deps.store.load().await? {
            Some(snapshot) => {
                tracing::info!(
                    target: "haul.controller",
                    url = %snapshot.descriptor.source_url,
                    "restored paused transfer from snapshot"
                );
                let transfer = ResumableTransfer::from_snapshot(
                    snapshot,
                    Arc::clone(&deps.transport),
                    progress_tx.clone(),
                );
                (transfer, TransferState::Paused)
            }
            None => {
                let transfer = ResumableTransfer::fresh(
                    deps.descriptor.clone(),
                    Arc::clone(&deps.transport),
                    progress_tx.clone(),
                );
                (transfer, TransferState::Idle)
            }
        };

        let controller = Arc::new(Self {
            inner: Mutex::new(Inner {
                state,
                transfer,
                active: None,
                generation: 0,
            }),
            descriptor: deps.descriptor,
            transport: deps.transport,
            store: deps.store,
            exporter: deps.exporter,
            event_emitter: deps.event_emitter,
            progress_tx,
            lease_counter: AtomicU64::new(0),
        });

        controller.spawn_progress_bridge();
        controller.emit_state(state);
        Ok(controller)
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> TransferState {
        self.inner.lock().await.state
    }

    /// Latest progress counters.
    #[must_use]
    pub fn progress(&self) -> TransferProgress {
        *self.progress_tx.borrow()
    }

    /// Subscribe to raw (un-throttled) progress updates.
    #[must_use]
    pub fn subscribe_progress(&self) -> watch::Receiver<TransferProgress> {
        self.progress_tx.subscribe()
    }

    /// Start a fresh download. Valid only from `Idle`.
    pub async fn begin_download(self: &Arc<Self>) -> TransferResult<()> {
        let (lease, handle) = {
            let mut inner = self.inner.lock().await;
            if inner.state != TransferState::Idle {
                return Err(TransferError::invalid_state(
                    "begin download",
                    format!("transfer is {}", inner.state),
                ));
            }

            inner.state = TransferState::Downloading;
            let handle = match inner.transfer.start() {
                Ok(handle) => handle,
                Err(e) => {
                    inner.state = TransferState::Idle;
                    return Err(e);
                }
            };
            let lease = self.issue_lease();
            inner.active = Some(ActiveRun {
                lease,
                kind: RunKind::Fresh,
                settled_tx: watch::channel(false).0,
            });
            (lease, handle)
        };

        tracing::info!(
            target: "haul.controller",
            url = %self.descriptor.source_url,
            "download started"
        );
        self.emit_state(TransferState::Downloading);
        self.spawn_driver(lease, handle);
        Ok(())
    }

    /// Pause the in-flight download. Valid only from `Downloading`.
    ///
    /// The state flips to `Paused` immediately; the call then waits for the
    /// run to suspend and its checkpoint to reach the store before
    /// returning.
    pub async fn pause_download(&self) -> TransferResult<()> {
        let mut settled_rx = {
            let mut inner = self.inner.lock().await;
            if inner.state != TransferState::Downloading {
                return Err(TransferError::invalid_state(
                    "pause",
                    format!("transfer is {}", inner.state),
                ));
            }
            let Some(settled_rx) = inner.active.as_ref().map(|a| a.settled_tx.subscribe())
            else {
                return Err(TransferError::internal("downloading with no active run"));
            };

            inner.state = TransferState::Paused;
            inner.transfer.request_pause();
            settled_rx
        };

        self.emit_state(TransferState::Paused);

        // Wait for the run to settle; the sender dropping also counts (the
        // run was finalized and its bookkeeping discarded).
        loop {
            if *settled_rx.borrow() {
                break;
            }
            if settled_rx.changed().await.is_err() {
                break;
            }
        }

        tracing::info!(target: "haul.controller", "download paused");
        Ok(())
    }

    /// Resume a paused download. Valid only from `Paused`.
    pub async fn resume_download(self: &Arc<Self>) -> TransferResult<()> {
        let (lease, handle) = {
            let mut inner = self.inner.lock().await;
            if inner.state != TransferState::Paused {
                return Err(TransferError::invalid_state(
                    "resume",
                    format!("transfer is {}", inner.state),
                ));
            }

            inner.state = TransferState::Downloading;
            let handle = match inner.transfer.resume() {
                Ok(handle) => handle,
                Err(e) => {
                    inner.state = TransferState::Paused;
                    return Err(e);
                }
            };
            let lease = self.issue_lease();
            inner.active = Some(ActiveRun {
                lease,
                kind: RunKind::Resumed,
                settled_tx: watch::channel(false).0,
            });
            (lease, handle)
        };

        tracing::info!(target: "haul.controller", "download resumed");
        self.emit_state(TransferState::Downloading);
        self.spawn_driver(lease, handle);
        Ok(())
    }

    /// Discard the transfer entirely: cancel any run, drop the checkpoint,
    /// zero the progress, and return to `Idle`. Valid from any state.
    pub async fn reset_download(&self) -> TransferResult<()> {
        {
            let mut inner = self.inner.lock().await;
            // Invalidate the lease first so a still-unwinding run cannot
            // finalize against the new transfer.
            if let Some(active) = inner.active.take() {
                inner.transfer.request_pause();
                active.settled_tx.send_replace(true);
            }
            inner.transfer = ResumableTransfer::fresh(
                self.descriptor.clone(),
                Arc::clone(&self.transport),
                self.progress_tx.clone(),
            );
            inner.state = TransferState::Idle;
            inner.generation = inner.generation.wrapping_add(1);
        }

        self.progress_tx.send_replace(TransferProgress::default());
        self.emit_state(TransferState::Idle);
        tracing::info!(target: "haul.controller", "transfer reset");

        self.store.clear().await?;
        Ok(())
    }

    /// Hand the completed artifact to the exporter. Valid only from
    /// `Completed`; failure leaves the state untouched so export can be
    /// retried.
    pub async fn export_download(&self) -> TransferResult<()> {
        let destination = {
            let inner = self.inner.lock().await;
            if inner.state != TransferState::Completed {
                return Err(TransferError::invalid_state(
                    "export",
                    format!("transfer is {}", inner.state),
                ));
            }
            inner.transfer.descriptor().destination_path.clone()
        };

        match self.exporter.export(&destination).await {
            Ok(()) => {
                tracing::info!(
                    target: "haul.controller",
                    artifact = %destination.display(),
                    "artifact exported"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    target: "haul.controller",
                    artifact = %destination.display(),
                    error = %e,
                    "export failed"
                );
                Err(TransferError::Export(e))
            }
        }
    }

    /// Suspend for process exit: an in-flight download is paused so its
    /// checkpoint lands in the store. Any other state is left as-is.
    pub async fn shutdown(&self) -> TransferResult<()> {
        match self.pause_download().await {
            Ok(()) => Ok(()),
            Err(e) if e.is_invalid_state() => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn issue_lease(&self) -> LeaseId {
        LeaseId(self.lease_counter.fetch_add(1, Ordering::SeqCst))
    }

    fn emit_state(&self, state: TransferState) {
        tracing::debug!(target: "haul.controller", state = %state, "state changed");
        self.event_emitter.emit(TransferEvent::state_changed(state));
    }

    /// Await the spawned run and feed its outcome into `finalize`.
    fn spawn_driver(
        self: &Arc<Self>,
        lease: LeaseId,
        handle: JoinHandle<Result<TransportOutcome, TransferError>>,
    ) {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(TransferError::internal(format!("run task failed: {e}"))),
            };
            controller.finalize(lease, outcome).await;
        });
    }

    /// Apply a settled run outcome to the state machine.
    async fn finalize(&self, lease: LeaseId, outcome: Result<TransportOutcome, TransferError>) {
        let (run, followup, generation) = {
            let mut inner = self.inner.lock().await;
            let Some(run) = inner.active.take_if(|a| a.lease == lease) else {
                tracing::debug!(target: "haul.controller", "discarding stale run outcome");
                return;
            };
            let generation = inner.generation;

            inner.transfer.settle(&outcome);
            let followup = match &outcome {
                Ok(TransportOutcome::Completed) => {
                    inner.state = TransferState::Completed;
                    Followup::Completed {
                        destination: inner.transfer.descriptor().destination_path.clone(),
                    }
                }
                Ok(TransportOutcome::Suspended { .. }) => {
                    // Pause already flipped the state; persist the checkpoint.
                    Followup::Persist {
                        snapshot: inner.transfer.to_snapshot(),
                    }
                }
                Err(e) => {
                    let rollback = match run.kind {
                        RunKind::Fresh => TransferState::Idle,
                        RunKind::Resumed => TransferState::Paused,
                    };
                    inner.state = rollback;
                    // A failed fresh download is not resumable; drop its bytes.
                    if rollback == TransferState::Idle {
                        self.progress_tx.send_replace(TransferProgress::default());
                    }
                    Followup::Failed {
                        message: e.to_string(),
                        rollback,
                    }
                }
            };
            (run, followup, generation)
        };

        match followup {
            Followup::Completed { destination } => {
                if let Err(e) = self.store.clear().await {
                    tracing::error!(
                        target: "haul.controller",
                        error = %e,
                        "failed to clear snapshot after completion"
                    );
                }
                tracing::info!(
                    target: "haul.controller",
                    artifact = %destination.display(),
                    "download completed"
                );
                self.event_emitter
                    .emit(TransferEvent::completed(&destination));
                self.emit_state(TransferState::Completed);
            }
            Followup::Persist { snapshot } => {
                if let Some(snapshot) = snapshot {
                    match self.store.save(&snapshot).await {
                        Ok(()) => {
                            // A reset may have cleared the store while the
                            // save was in flight; drop the checkpoint again.
                            let stale = self.inner.lock().await.generation != generation;
                            if stale {
                                tracing::info!(
                                    target: "haul.controller",
                                    "discarding checkpoint persisted across a reset"
                                );
                                if let Err(e) = self.store.clear().await {
                                    tracing::error!(
                                        target: "haul.controller",
                                        error = %e,
                                        "failed to discard checkpoint after reset"
                                    );
                                }
                            }
                        }
                        Err(e) => {
                            // The transfer stays paused in memory; resume
                            // still works this session, only restart
                            // recovery is lost.
                            tracing::error!(
                                target: "haul.controller",
                                error = %e,
                                "failed to persist checkpoint"
                            );
                        }
                    }
                } else {
                    tracing::error!(
                        target: "haul.controller",
                        "suspended run produced no checkpoint"
                    );
                }
            }
            Followup::Failed { message, rollback } => {
                tracing::warn!(
                    target: "haul.controller",
                    error = %message,
                    rollback = %rollback,
                    "download failed"
                );
                self.event_emitter.emit(TransferEvent::failed(&message));
                self.emit_state(rollback);
            }
        }

        // Release anyone waiting in pause_download.
        run.settled_tx.send_replace(true);
    }

    /// Emit rate-limited progress events from the raw progress channel.
    ///
    /// The bridge lives as long as the controller; it exits when the
    /// progress sender is dropped.
    fn spawn_progress_bridge(self: &Arc<Self>) {
        let emitter = self.event_emitter.clone_box();
        let mut rx = self.progress_tx.subscribe();
        tokio::spawn(async move {
            let mut tick = interval(Duration::from_millis(250));
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut last_emitted = TransferProgress::default();

            loop {
                tokio::select! {
                    biased;

                    changed = rx.changed() => {
                        if changed.is_err() {
                            // Sender gone; flush the final value and exit.
                            let current = *rx.borrow();
                            if current != last_emitted {
                                emitter.emit(TransferEvent::progress(&current));
                            }
                            break;
                        }
                    }

                    _ = tick.tick() => {
                        let current = *rx.borrow();
                        if current != last_emitted {
                            emitter.emit(TransferEvent::progress(&current));
                            last_emitted = current;
                        }
                    }
                }
            }
        });
    }
}

enum Followup {
    Completed {
        destination: std::path::PathBuf,
    },
    Persist {
        snapshot: Option<haul_core::transfer::ResumeSnapshot>,
    },
    Failed {
        message: String,
        rollback: TransferState,
    },
}
