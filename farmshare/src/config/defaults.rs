//! Default values and constants for all configuration settings.
//!
//! Contains the `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation. The path and scheduler defaults match the production
//! render-farm deployment; a config file only needs to override what
//! differs on a given site.

use std::path::PathBuf;

use super::settings::*;

/// Live allocation file the scheduler reads.
pub const DEFAULT_LIVE_CONFIG: &str = "/sw/tractor/config/limits.config";

/// Directory timestamped backups are moved into on commit.
pub const DEFAULT_BACKUP_DIR: &str = "/sw/tractor/config/backup";

/// Command line that tells the scheduler to re-read its limits.
pub const DEFAULT_RELOAD_COMMAND: &str = "tq reloadconfig --limits";

/// Endpoint reporting the limits the scheduler is running with.
pub const DEFAULT_STATUS_URL: &str = "http://tractor-engine/Tractor/queue?q=limits";

/// Status request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Seconds between plain status polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Seconds to wait after issuing a reload command.
pub const DEFAULT_RELOAD_SETTLE_SECS: u64 = 10;

/// Seconds between committing the live file and the first reload.
pub const DEFAULT_COMMIT_SETTLE_SECS: u64 = 5;

/// Status observations allowed per show before the apply gives up.
pub const DEFAULT_MAX_OBSERVATIONS: u32 = 8;

/// Show codes hidden from the editor. These are scheduler-internal
/// entries whose shares are managed elsewhere.
pub const DEFAULT_EXCLUDED_SHOWS: &[&str] =
    &["default", "MollyOfDenali", "NightAtTheMuseum", "RND"];

/// Sections never touched by mass apply.
pub const DEFAULT_MASS_APPLY_EXCLUDE: &[&str] = &["linuxfarm_Denoise"];

/// Scratch directory for the staged file.
pub fn default_temp_dir() -> PathBuf {
    std::env::temp_dir()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            paths: PathSettings {
                live_config: PathBuf::from(DEFAULT_LIVE_CONFIG),
                temp_dir: default_temp_dir(),
                backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            },
            scheduler: SchedulerSettings {
                reload_command: DEFAULT_RELOAD_COMMAND.to_string(),
                status_url: DEFAULT_STATUS_URL.to_string(),
                http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            },
            apply: ApplySettings {
                poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
                reload_settle_secs: DEFAULT_RELOAD_SETTLE_SECS,
                commit_settle_secs: DEFAULT_COMMIT_SETTLE_SECS,
                max_observations: DEFAULT_MAX_OBSERVATIONS,
                excluded_shows: DEFAULT_EXCLUDED_SHOWS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                mass_apply_exclude: DEFAULT_MASS_APPLY_EXCLUDE
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
        }
    }
}
