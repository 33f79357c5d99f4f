//! Tuning knobs for the staged-apply protocol.

use std::ops::RangeInclusive;
use std::time::Duration;

/// Protocol timing and retry budget.
///
/// Defaults preserve the long-observed production behavior: 5 s between
/// plain status polls, 10 s settle after a reload is issued, and a hard
/// budget of 8 status observations per show before giving up. None of these
/// are hardcoded in the protocol itself.
#[derive(Debug, Clone)]
pub struct ApplyConfig {
    /// Sleep between status polls when no reload was just issued.
    pub poll_interval: Duration,
    /// Sleep after (re-)issuing the reload command, giving the scheduler
    /// time to pick the file up.
    pub reload_settle: Duration,
    /// Sleep between the live-file commit and the first reload signal.
    pub commit_settle: Duration,
    /// Status observations allowed per show; the final mismatched
    /// observation aborts the apply.
    pub max_observations: u32,
    /// Observations after which the reload command is re-issued.
    pub reload_window: RangeInclusive<u32>,
    /// Sections never touched by mass apply ("Stage All").
    pub mass_apply_exclude: Vec<String>,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            reload_settle: Duration::from_secs(10),
            commit_settle: Duration::from_secs(5),
            max_observations: 8,
            reload_window: 2..=7,
            mass_apply_exclude: vec!["linuxfarm_Denoise".to_string()],
        }
    }
}

impl ApplyConfig {
    /// Zero-delay variant for tests; budget and exclusions unchanged.
    pub fn immediate() -> Self {
        Self {
            poll_interval: Duration::ZERO,
            reload_settle: Duration::ZERO,
            commit_settle: Duration::ZERO,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        let config = ApplyConfig::default();
        assert_eq!(config.max_observations, 8);
        assert_eq!(config.reload_window, 2..=7);
        assert_eq!(config.mass_apply_exclude, ["linuxfarm_Denoise"]);
    }
}
