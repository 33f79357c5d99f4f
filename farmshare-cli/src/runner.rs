//! CLI runner for common setup and operations.
//!
//! Encapsulates settings loading and logging initialization to reduce
//! duplication across command handlers.

use crate::error::CliError;
use farmshare::config::ConfigFile;
use farmshare::logging::{default_log_dir, default_log_file, init_logging, LoggingGuard};
use tracing::info;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// When stdout is a TTY, stdout logging is disabled so log lines do not
    /// interleave with interactive prompts and progress output.
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let stdout_enabled = !atty::is(atty::Stream::Stdout);
        let logging_guard = init_logging(&default_log_dir(), default_log_file(), stdout_enabled)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("FarmShare v{}", farmshare::VERSION);
        info!("FarmShare CLI: {} command", command);
    }
}
