//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types; parsing lives in [`super::parser`] and
//! serialization in [`super::writer`].

use std::path::PathBuf;
use std::time::Duration;

use crate::apply::ApplyConfig;
use crate::limits::ConfigStore;

/// Complete tool configuration loaded from config.ini.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    /// File locations
    pub paths: PathSettings,
    /// External scheduler command and endpoint
    pub scheduler: SchedulerSettings,
    /// Apply protocol tuning
    pub apply: ApplySettings,
}

/// File locations.
#[derive(Debug, Clone)]
pub struct PathSettings {
    /// Live allocation file the scheduler reads.
    pub live_config: PathBuf,
    /// Directory for the staged scratch file.
    pub temp_dir: PathBuf,
    /// Directory timestamped backups are moved into on commit.
    pub backup_dir: PathBuf,
}

/// External scheduler interface.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Command line that tells the scheduler to re-read its limits.
    pub reload_command: String,
    /// HTTP endpoint reporting the limits the scheduler is running with.
    pub status_url: String,
    /// Request timeout in seconds for status fetches.
    pub http_timeout_secs: u64,
}

/// Apply protocol tuning.
#[derive(Debug, Clone)]
pub struct ApplySettings {
    /// Seconds between plain status polls.
    pub poll_interval_secs: u64,
    /// Seconds to wait after issuing a reload command.
    pub reload_settle_secs: u64,
    /// Seconds between committing the live file and the first reload.
    pub commit_settle_secs: u64,
    /// Status observations allowed per show before giving up.
    pub max_observations: u32,
    /// Show codes hidden from the editor (scheduler-internal entries).
    pub excluded_shows: Vec<String>,
    /// Sections never touched by mass apply.
    pub mass_apply_exclude: Vec<String>,
}

impl ConfigFile {
    /// Build the config store for the configured paths.
    pub fn store(&self) -> ConfigStore {
        ConfigStore::new(
            self.paths.live_config.clone(),
            self.paths.temp_dir.clone(),
            self.paths.backup_dir.clone(),
        )
    }

    /// Build the apply protocol configuration. The reload re-issue window
    /// scales with the observation budget: every observation except the
    /// first and the last is preceded by a reload.
    pub fn apply_config(&self) -> ApplyConfig {
        let last_reload = self.apply.max_observations.saturating_sub(1).max(2);
        ApplyConfig {
            poll_interval: Duration::from_secs(self.apply.poll_interval_secs),
            reload_settle: Duration::from_secs(self.apply.reload_settle_secs),
            commit_settle: Duration::from_secs(self.apply.commit_settle_secs),
            max_observations: self.apply.max_observations,
            reload_window: 2..=last_reload,
            mass_apply_exclude: self.apply.mass_apply_exclude.clone(),
        }
    }

    /// Status request timeout as a `Duration`.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.scheduler.http_timeout_secs)
    }
}
