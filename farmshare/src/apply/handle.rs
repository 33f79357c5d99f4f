//! Off-thread execution of the apply protocol.
//!
//! Convergence polling blocks for multiples of the poll interval, far too
//! long to hold an interactive session hostage. [`start_apply`] runs the
//! protocol on the tokio runtime and hands back an [`ApplyHandle`] the
//! front-end drives: drain progress events, draw, and offer a cancel that
//! stops the polling without touching the already-committed file.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::coordinator::{ApplyCoordinator, ApplyError};
use super::progress::{ApplyProgress, ProgressSender};
use crate::limits::{AllocationDocument, ChangeSet};
use crate::scheduler::{ReloadSignal, StatusClient};

/// Everything one apply needs, moved onto the background task.
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub document: AllocationDocument,
    pub section: String,
    pub change_set: ChangeSet,
    pub siblings: Vec<String>,
    pub apply_to_all: bool,
}

/// Handle to an in-flight apply.
pub struct ApplyHandle {
    cancellation: CancellationToken,
    progress_rx: mpsc::UnboundedReceiver<ApplyProgress>,
    join: JoinHandle<Result<(), ApplyError>>,
}

impl ApplyHandle {
    /// Request cancellation. Takes effect at the next sleep or poll
    /// boundary; the committed file is never rolled back.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// A clone of the cancellation token, for wiring to signal handlers.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Drain one pending progress event, if any.
    pub fn try_recv_progress(&mut self) -> Option<ApplyProgress> {
        self.progress_rx.try_recv().ok()
    }

    /// Await the next progress event; `None` once the protocol finished
    /// and the channel drained.
    pub async fn recv_progress(&mut self) -> Option<ApplyProgress> {
        self.progress_rx.recv().await
    }

    /// True once the protocol finished (either way).
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Await the protocol outcome.
    pub async fn wait(self) -> Result<(), ApplyError> {
        match self.join.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(ApplyError::Cancelled),
        }
    }
}

/// Spawn the apply protocol on the current tokio runtime.
pub fn start_apply<S, R>(
    coordinator: ApplyCoordinator<S, R>,
    request: ApplyRequest,
) -> ApplyHandle
where
    S: StatusClient + 'static,
    R: ReloadSignal + 'static,
{
    let cancellation = CancellationToken::new();
    let (progress, progress_rx) = ProgressSender::channel();
    let token = cancellation.clone();

    let join = tokio::spawn(async move {
        let ApplyRequest {
            mut document,
            section,
            change_set,
            siblings,
            apply_to_all,
        } = request;
        coordinator
            .apply(
                &mut document,
                &section,
                &change_set,
                &siblings,
                apply_to_all,
                &token,
                &progress,
            )
            .await
    });

    ApplyHandle {
        cancellation,
        progress_rx,
        join,
    }
}
