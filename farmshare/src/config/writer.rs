//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[paths]
; Live allocation file the scheduler reads
live_config = {}
; Directory for the staged scratch file (temp.config)
temp_dir = {}
; Directory timestamped backups are moved into on commit
backup_dir = {}

[scheduler]
; Command that tells the scheduler to re-read its limits config
reload_command = {}
; HTTP endpoint reporting the limits the scheduler is running with
status_url = {}
; Request timeout in seconds for status fetches (default: 30)
http_timeout_secs = {}

[apply]
; Seconds between plain status polls (default: 5)
poll_interval_secs = {}
; Seconds to wait after issuing a reload command (default: 10)
reload_settle_secs = {}
; Seconds between committing the live file and the first reload (default: 5)
commit_settle_secs = {}
; Status observations allowed per show before the apply gives up (default: 8)
max_observations = {}
; Comma-separated show codes hidden from the editor
excluded_shows = {}
; Comma-separated sections never touched by mass apply
mass_apply_exclude = {}
"#,
        path_to_string(&config.paths.live_config),
        path_to_string(&config.paths.temp_dir),
        path_to_string(&config.paths.backup_dir),
        config.scheduler.reload_command,
        config.scheduler.status_url,
        config.scheduler.http_timeout_secs,
        config.apply.poll_interval_secs,
        config.apply.reload_settle_secs,
        config.apply.commit_settle_secs,
        config.apply.max_observations,
        config.apply.excluded_shows.join(","),
        config.apply.mass_apply_exclude.join(","),
    )
}

fn path_to_string(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ini::Ini;

    #[test]
    fn test_written_config_parses_back() {
        let mut config = ConfigFile::default();
        config.apply.max_observations = 10;
        config.scheduler.reload_command = "tq reloadconfig --limits --force".to_string();

        let text = to_config_string(&config);
        let ini = Ini::load_from_str(&text).unwrap();
        let parsed = super::super::parser::parse_ini(&ini).unwrap();

        assert_eq!(parsed.apply.max_observations, 10);
        assert_eq!(
            parsed.scheduler.reload_command,
            "tq reloadconfig --limits --force"
        );
        assert_eq!(parsed.paths.live_config, config.paths.live_config);
    }
}
