//! Progress reporting for an in-flight apply.
//!
//! The coordinator emits events over an unbounded channel so a front-end
//! can narrate the protocol without blocking it. Dropping the receiver is
//! harmless; sends onto a closed channel are ignored.

use tokio::sync::mpsc;

use crate::scheduler::ReloadOutcome;

/// Events emitted while an apply runs.
#[derive(Debug, Clone)]
pub enum ApplyProgress {
    /// Live file committed (backup already taken).
    Committed,
    /// Reload command issued; `attempt` is 1 for the post-commit signal and
    /// counts up across re-issues.
    ReloadIssued { attempt: u32, outcome: ReloadOutcome },
    /// One status observation for a show compared against its target.
    Observation {
        show: String,
        observation: u32,
        target: f64,
        reported: Option<f64>,
    },
    /// A show's reported value matched its target.
    ShowConverged { show: String, observations: u32 },
    /// Every show converged.
    Complete,
}

/// Sending half handed to the coordinator.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: Option<mpsc::UnboundedSender<ApplyProgress>>,
}

impl ProgressSender {
    /// Create a connected sender/receiver pair.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ApplyProgress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sender that discards every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub(crate) fn send(&self, event: ApplyProgress) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_delivers_events() {
        let (sender, mut rx) = ProgressSender::channel();
        sender.send(ApplyProgress::Committed);
        assert!(matches!(rx.try_recv(), Ok(ApplyProgress::Committed)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_disabled_sender_is_silent() {
        let sender = ProgressSender::disabled();
        sender.send(ApplyProgress::Complete);
    }

    #[test]
    fn test_closed_receiver_does_not_panic() {
        let (sender, rx) = ProgressSender::channel();
        drop(rx);
        sender.send(ApplyProgress::Complete);
    }
}
