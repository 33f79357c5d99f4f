//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in
/// the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [paths] section
    if let Some(section) = ini.section(Some("paths")) {
        if let Some(v) = section.get("live_config") {
            let v = v.trim();
            if !v.is_empty() {
                config.paths.live_config = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("temp_dir") {
            let v = v.trim();
            if !v.is_empty() {
                config.paths.temp_dir = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("backup_dir") {
            let v = v.trim();
            if !v.is_empty() {
                config.paths.backup_dir = expand_tilde(v);
            }
        }
    }

    // [scheduler] section
    if let Some(section) = ini.section(Some("scheduler")) {
        if let Some(v) = section.get("reload_command") {
            let v = v.trim();
            if !v.is_empty() {
                config.scheduler.reload_command = v.to_string();
            }
        }
        if let Some(v) = section.get("status_url") {
            let v = v.trim();
            if !v.is_empty() {
                config.scheduler.status_url = v.to_string();
            }
        }
        if let Some(v) = section.get("http_timeout_secs") {
            config.scheduler.http_timeout_secs =
                parse_positive(v, "scheduler", "http_timeout_secs")?;
        }
    }

    // [apply] section
    if let Some(section) = ini.section(Some("apply")) {
        if let Some(v) = section.get("poll_interval_secs") {
            config.apply.poll_interval_secs = parse_positive(v, "apply", "poll_interval_secs")?;
        }
        if let Some(v) = section.get("reload_settle_secs") {
            config.apply.reload_settle_secs = parse_positive(v, "apply", "reload_settle_secs")?;
        }
        if let Some(v) = section.get("commit_settle_secs") {
            config.apply.commit_settle_secs =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "apply".to_string(),
                    key: "commit_settle_secs".to_string(),
                    value: v.to_string(),
                    reason: "must be a non-negative integer (seconds)".to_string(),
                })?;
        }
        if let Some(v) = section.get("max_observations") {
            let parsed: u32 = v.parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "apply".to_string(),
                key: "max_observations".to_string(),
                value: v.to_string(),
                reason: "must be a positive integer".to_string(),
            })?;
            if parsed == 0 {
                return Err(ConfigFileError::InvalidValue {
                    section: "apply".to_string(),
                    key: "max_observations".to_string(),
                    value: v.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            config.apply.max_observations = parsed;
        }
        if let Some(v) = section.get("excluded_shows") {
            config.apply.excluded_shows = parse_list(v);
        }
        if let Some(v) = section.get("mass_apply_exclude") {
            config.apply.mass_apply_exclude = parse_list(v);
        }
    }

    Ok(config)
}

fn parse_positive(value: &str, section: &str, key: &str) -> Result<u64, ConfigFileError> {
    value.parse().map_err(|_| ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: "must be a positive integer (seconds)".to_string(),
    })
}

/// Split a comma-separated list, trimming entries and dropping empties.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(text).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_ini_yields_defaults() {
        let config = parse("").unwrap();
        let default = ConfigFile::default();
        assert_eq!(config.paths.live_config, default.paths.live_config);
        assert_eq!(
            config.scheduler.reload_command,
            default.scheduler.reload_command
        );
        assert_eq!(config.apply.max_observations, 8);
    }

    #[test]
    fn test_overlay_values() {
        let config = parse(
            "[paths]\n\
             live_config = /var/farm/limits.config\n\
             [scheduler]\n\
             status_url = http://engine:8000/Tractor/queue?q=limits\n\
             [apply]\n\
             poll_interval_secs = 2\n\
             max_observations = 12\n",
        )
        .unwrap();
        assert_eq!(
            config.paths.live_config,
            PathBuf::from("/var/farm/limits.config")
        );
        assert_eq!(
            config.scheduler.status_url,
            "http://engine:8000/Tractor/queue?q=limits"
        );
        assert_eq!(config.apply.poll_interval_secs, 2);
        assert_eq!(config.apply.max_observations, 12);
    }

    #[test]
    fn test_list_parsing() {
        let config = parse("[apply]\nexcluded_shows = default, RND, , Internal\n").unwrap();
        assert_eq!(config.apply.excluded_shows, ["default", "RND", "Internal"]);
    }

    #[test]
    fn test_invalid_number_rejected() {
        let err = parse("[apply]\nmax_observations = many\n").unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { .. }));
    }

    #[test]
    fn test_zero_observations_rejected() {
        let err = parse("[apply]\nmax_observations = 0\n").unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { .. }));
    }
}
