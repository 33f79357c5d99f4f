//! Reload signal: asking the scheduler to re-read its limits config.
//!
//! The signal is best-effort. The scheduler re-reads the file on its own
//! cadence eventually, so a failed command is logged and tolerated rather
//! than aborting an apply; convergence polling decides the real outcome.

use std::future::Future;

use tokio::process::Command;
use tracing::{info, warn};

/// How a reload attempt went. Failures are non-fatal by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Primary invocation exited zero.
    Succeeded,
    /// Primary invocation failed but the shell fallback exited zero.
    SucceededViaFallback,
    /// Both invocations failed; polling proceeds regardless.
    Failed,
}

impl ReloadOutcome {
    /// True when a reload command actually reached the scheduler.
    pub fn delivered(self) -> bool {
        !matches!(self, ReloadOutcome::Failed)
    }
}

/// Issue the limits-reload command to the scheduler.
pub trait ReloadSignal: Send + Sync {
    fn reload(&self) -> impl Future<Output = ReloadOutcome> + Send;
}

/// Production reload via the scheduler CLI (`tq reloadconfig --limits`).
///
/// On a non-zero exit or spawn failure the same command line is retried
/// once through `sh -c`, mirroring environments where the direct spawn
/// misses wrapper scripts on PATH. Both attempts are logged.
#[derive(Debug, Clone)]
pub struct CommandReload {
    program: String,
    args: Vec<String>,
}

impl CommandReload {
    pub fn new(command_line: &str) -> Self {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        Self {
            program,
            args: parts.collect(),
        }
    }

    fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl ReloadSignal for CommandReload {
    async fn reload(&self) -> ReloadOutcome {
        info!(command = %self.command_line(), "Issuing limits reload");

        match Command::new(&self.program).args(&self.args).status().await {
            Ok(status) if status.success() => {
                info!("Reload command executed successfully");
                return ReloadOutcome::Succeeded;
            }
            Ok(status) => {
                warn!(code = ?status.code(), "Reload command failed, retrying via shell");
            }
            Err(e) => {
                warn!(error = %e, "Reload command could not be spawned, retrying via shell");
            }
        }

        match Command::new("sh")
            .arg("-c")
            .arg(self.command_line())
            .status()
            .await
        {
            Ok(status) if status.success() => {
                info!("Reload fallback executed successfully");
                ReloadOutcome::SucceededViaFallback
            }
            Ok(status) => {
                warn!(code = ?status.code(), "Reload fallback failed; relying on scheduler cadence");
                ReloadOutcome::Failed
            }
            Err(e) => {
                warn!(error = %e, "Reload fallback could not be spawned; relying on scheduler cadence");
                ReloadOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Mock reload signal counting invocations.
    #[derive(Clone)]
    pub struct RecordingReload {
        pub calls: Arc<AtomicUsize>,
        pub outcome: ReloadOutcome,
    }

    impl RecordingReload {
        pub fn new(outcome: ReloadOutcome) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                outcome,
            }
        }

        pub fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ReloadSignal for RecordingReload {
        async fn reload(&self) -> ReloadOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome
        }
    }

    #[test]
    fn test_command_line_split() {
        let reload = CommandReload::new("tq reloadconfig --limits");
        assert_eq!(reload.command_line(), "tq reloadconfig --limits");
    }

    #[test]
    fn test_delivered() {
        assert!(ReloadOutcome::Succeeded.delivered());
        assert!(ReloadOutcome::SucceededViaFallback.delivered());
        assert!(!ReloadOutcome::Failed.delivered());
    }

    #[tokio::test]
    async fn test_failing_command_falls_back() {
        // `false` exits non-zero for both the direct spawn and the shell
        // fallback, so the outcome is Failed rather than an error.
        let reload = CommandReload::new("false");
        assert_eq!(reload.reload().await, ReloadOutcome::Failed);
    }

    #[tokio::test]
    async fn test_succeeding_command() {
        let reload = CommandReload::new("true");
        assert_eq!(reload.reload().await, ReloadOutcome::Succeeded);
    }
}
