//! A single transfer and its continuation state.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use haul_core::transfer::{
    ResumeSnapshot, ResumeToken, TransferDescriptor, TransferError, TransferProgress,
};

use crate::transport::{TransportOutcome, TransportPort};

/// One logical transfer across any number of runs.
///
/// Owns the descriptor, the latest continuation token, and the handle to the
/// in-flight run (if any). The controller drives it; this type only enforces
/// run-level invariants: at most one run in flight, resume requires a token,
/// and the token is updated strictly from settled outcomes.
pub struct ResumableTransfer {
    descriptor: TransferDescriptor,
    transport: Arc<dyn TransportPort>,
    resume_token: Option<ResumeToken>,
    progress_tx: watch::Sender<TransferProgress>,
    in_flight: Option<CancellationToken>,
}

impl ResumableTransfer {
    /// A transfer that has never run.
    pub fn fresh(
        descriptor: TransferDescriptor,
        transport: Arc<dyn TransportPort>,
        progress_tx: watch::Sender<TransferProgress>,
    ) -> Self {
        Self {
            descriptor,
            transport,
            resume_token: None,
            progress_tx,
            in_flight: None,
        }
    }

    /// Reconstruct a paused transfer from a persisted snapshot.
    pub fn from_snapshot(
        snapshot: ResumeSnapshot,
        transport: Arc<dyn TransportPort>,
        progress_tx: watch::Sender<TransferProgress>,
    ) -> Self {
        Self {
            descriptor: snapshot.descriptor,
            transport,
            resume_token: Some(snapshot.resume_token),
            progress_tx,
            in_flight: None,
        }
    }

    #[must_use]
    pub const fn descriptor(&self) -> &TransferDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.resume_token.is_some()
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a run, picking up from the stored token when one exists.
    ///
    /// Returns the join handle for the spawned run; the caller is
    /// responsible for awaiting it and feeding the outcome back through
    /// [`settle`](Self::settle).
    pub fn start(
        &mut self,
    ) -> Result<JoinHandle<Result<TransportOutcome, TransferError>>, TransferError> {
        if self.in_flight.is_some() {
            return Err(TransferError::invalid_state(
                "start",
                "a run is already in flight",
            ));
        }

        let suspend = CancellationToken::new();
        self.in_flight = Some(suspend.clone());

        let transport = Arc::clone(&self.transport);
        let descriptor = self.descriptor.clone();
        let resume_from = self.resume_token.clone();
        let progress_tx = self.progress_tx.clone();

        Ok(tokio::spawn(async move {
            transport
                .run(&descriptor, resume_from.as_ref(), progress_tx, suspend)
                .await
        }))
    }

    /// Start a run that must continue from a previous suspension.
    pub fn resume(
        &mut self,
    ) -> Result<JoinHandle<Result<TransportOutcome, TransferError>>, TransferError> {
        if self.resume_token.is_none() {
            return Err(TransferError::invalid_state(
                "resume",
                "no continuation token is stored",
            ));
        }
        self.start()
    }

    /// Ask the in-flight run to suspend cooperatively. No-op when idle.
    pub fn request_pause(&self) {
        if let Some(token) = &self.in_flight {
            token.cancel();
        }
    }

    /// Record the outcome of the run started by [`start`](Self::start).
    ///
    /// Completion discards the token; suspension stores the new one; a
    /// failure leaves the previous token untouched so a resumed run that
    /// failed can be retried from the same checkpoint.
    pub fn settle(&mut self, outcome: &Result<TransportOutcome, TransferError>) {
        self.in_flight = None;
        match outcome {
            Ok(TransportOutcome::Completed) => self.resume_token = None,
            Ok(TransportOutcome::Suspended { token }) => {
                self.resume_token = Some(token.clone());
            }
            Err(_) => {}
        }
    }

    /// Snapshot the current checkpoint, if the transfer is suspended.
    #[must_use]
    pub fn to_snapshot(&self) -> Option<ResumeSnapshot> {
        self.resume_token
            .clone()
            .map(|token| ResumeSnapshot::new(self.descriptor.clone(), token))
    }
}
