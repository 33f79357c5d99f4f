//! External job-scheduler interface.
//!
//! The scheduler is a black box reached two ways: a reload command that asks
//! it to re-read its limits config, and an HTTP status endpoint reporting
//! the limits currently in effect. Both sit behind traits so the apply
//! protocol can be driven against mocks in tests.

pub mod reload;
pub mod status;

use thiserror::Error;

pub use reload::{CommandReload, ReloadOutcome, ReloadSignal};
pub use status::{HttpStatusClient, ReportedLimits, StatusClient};

/// Errors from the scheduler's HTTP status endpoint.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchedulerError {
    /// HTTP request failed or timed out.
    #[error("Status endpoint error: {0}")]
    Http(String),

    /// Response body was not the expected limits JSON.
    #[error("Invalid status response: {0}")]
    InvalidResponse(String),
}
