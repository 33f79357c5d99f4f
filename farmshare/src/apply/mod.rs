//! Staged-apply protocol: commit, reload, poll until converged.
//!
//! An apply takes a staged allocation document, writes it over the live
//! file (after a timestamped backup), signals the scheduler to reload, and
//! then polls the scheduler's status endpoint until every changed show
//! reports its new nominal value. Reloads are re-issued on a fixed window
//! of observations; an exhausted observation budget aborts the apply with
//! the live file left committed.
//!
//! Use [`start_apply`] to run the protocol off the interactive thread and
//! receive [`ApplyProgress`] events through the returned [`ApplyHandle`].

mod config;
mod coordinator;
mod handle;
mod progress;

pub use config::ApplyConfig;
pub use coordinator::{ApplyCoordinator, ApplyError};
pub use handle::{start_apply, ApplyHandle, ApplyRequest};
pub use progress::{ApplyProgress, ProgressSender};
