//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use farmshare::apply::ApplyError;
use farmshare::config::defaults::DEFAULT_RELOAD_COMMAND;
use farmshare::config::ConfigFileError;
use farmshare::limits::StoreError;
use farmshare::scheduler::SchedulerError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Reading or writing the allocation files failed
    Store(StoreError),
    /// Talking to the scheduler failed
    Scheduler(SchedulerError),
    /// The apply protocol failed
    Apply(ApplyError),
    /// An interactive prompt failed (terminal closed, not a TTY, ...)
    Prompt(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Apply(ApplyError::ConvergenceTimeout { .. }) => {
                eprintln!();
                eprintln!("The new values are committed but the scheduler has not");
                eprintln!("confirmed them. To finish by hand:");
                eprintln!("  1. Run the reload command: {}", DEFAULT_RELOAD_COMMAND);
                eprintln!("  2. Check the queue endpoint until the new values appear");
            }
            CliError::Store(StoreError::Io { path, .. }) => {
                eprintln!();
                eprintln!("Check that '{}' exists and is writable,", path.display());
                eprintln!("or point [paths] in ~/.farmshare/config.ini elsewhere.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Store(e) => write!(f, "{}", e),
            CliError::Scheduler(e) => write!(f, "Scheduler error: {}", e),
            CliError::Apply(e) => write!(f, "{}", e),
            CliError::Prompt(msg) => write!(f, "Prompt error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Store(e) => Some(e),
            CliError::Scheduler(e) => Some(e),
            CliError::Apply(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<SchedulerError> for CliError {
    fn from(e: SchedulerError) -> Self {
        CliError::Scheduler(e)
    }
}

impl From<ApplyError> for CliError {
    fn from(e: ApplyError) -> Self {
        CliError::Apply(e)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::Prompt(e.to_string())
    }
}
