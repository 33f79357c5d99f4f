//! The staged-apply protocol: merge, commit, reload, poll until converged.
//!
//! This is the one piece of the tool with real control flow. A change set
//! is merged into the working document, the document is committed (backup
//! plus atomic replace), the scheduler is told to reload, and then each
//! show's reported nominal is polled until it matches the committed target
//! or the observation budget runs out.
//!
//! Failure semantics, in order: document/file errors abort before any
//! reload side effect; reload-command failures are logged and tolerated
//! (the scheduler re-reads the file on its own cadence); a show that never
//! converges within the budget aborts the whole apply with a timeout naming
//! it. The committed file is never rolled back — convergence timeout means
//! the scheduler has not confirmed the change, not that the write failed.

use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::ApplyConfig;
use super::progress::{ApplyProgress, ProgressSender};
use crate::limits::{percent_to_fraction, AllocationDocument, ChangeSet, ConfigStore};
use crate::limits::{DocumentError, StoreError};
use crate::scheduler::{ReloadSignal, StatusClient};

/// Terminal failures of an apply.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// Staging or committing the document failed; nothing was reloaded.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The change set referenced a section or show the document lacks.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A show never converged within the observation budget. The committed
    /// file stands; the operator must reload manually.
    #[error(
        "The config was reloaded too many times before the change to '{show}' \
         could be confirmed ({observations} observations). Attempt to reload manually."
    )]
    ConvergenceTimeout { show: String, observations: u32 },

    /// The operator cancelled while polling. The committed file stands.
    #[error("Apply cancelled while awaiting scheduler convergence")]
    Cancelled,
}

/// Drives the commit/reload/poll sequence against a [`ConfigStore`] and the
/// scheduler interfaces.
pub struct ApplyCoordinator<S, R> {
    store: ConfigStore,
    status: S,
    reload: R,
    config: ApplyConfig,
}

impl<S: StatusClient, R: ReloadSignal> ApplyCoordinator<S, R> {
    pub fn new(store: ConfigStore, status: S, reload: R, config: ApplyConfig) -> Self {
        Self {
            store,
            status,
            reload,
            config,
        }
    }

    /// Merge `change_set` into `document` for `section`, and for every
    /// non-excluded sibling when `apply_to_all` is set.
    ///
    /// Percentages become 3-decimal fractions on write. A show missing from
    /// the primary section is an error; siblings may legitimately carry a
    /// different show list, so missing shows there are skipped.
    pub fn merge_changes(
        &self,
        document: &mut AllocationDocument,
        section: &str,
        change_set: &ChangeSet,
        siblings: &[String],
        apply_to_all: bool,
    ) -> Result<(), DocumentError> {
        for change in change_set.changes() {
            document.set_nominal(
                section,
                &change.show,
                percent_to_fraction(change.nominal_after),
            )?;
            document.set_cap(section, &change.show, percent_to_fraction(change.cap_after))?;
        }

        if !apply_to_all {
            return Ok(());
        }

        for sibling in siblings {
            if sibling == section {
                continue;
            }
            if self.config.mass_apply_exclude.contains(sibling) {
                debug!(section = %sibling, "Skipping excluded section in mass apply");
                continue;
            }
            for change in change_set.changes() {
                if document.nominal(sibling, &change.show).is_none() {
                    debug!(section = %sibling, show = %change.show, "Show absent from sibling, skipping");
                    continue;
                }
                document.set_nominal(
                    sibling,
                    &change.show,
                    percent_to_fraction(change.nominal_after),
                )?;
                document.set_cap(sibling, &change.show, percent_to_fraction(change.cap_after))?;
            }
        }

        Ok(())
    }

    /// Run the full protocol: merge, commit, reload, poll every show.
    ///
    /// Returns only once every show in the change set converged, or with
    /// the first fatal error. Cancellation is honored between sleeps and
    /// polls; an already-committed file stays committed.
    pub async fn apply(
        &self,
        document: &mut AllocationDocument,
        section: &str,
        change_set: &ChangeSet,
        siblings: &[String],
        apply_to_all: bool,
        cancel: &CancellationToken,
        progress: &ProgressSender,
    ) -> Result<(), ApplyError> {
        self.merge_changes(document, section, change_set, siblings, apply_to_all)?;

        self.store.commit(document)?;
        progress.send(ApplyProgress::Committed);

        self.pause(self.config.commit_settle, cancel).await?;

        let mut reload_attempts = 0;
        self.issue_reload(&mut reload_attempts, progress).await;
        self.pause(self.config.reload_settle, cancel).await?;

        for (show, target) in change_set.nominal_targets() {
            self.poll_show(section, show, target, &mut reload_attempts, cancel, progress)
                .await?;
        }

        info!(section = %section, shows = change_set.len(), "All shows converged");
        progress.send(ApplyProgress::Complete);
        Ok(())
    }

    /// Poll one show until its reported nominal matches `target`.
    ///
    /// Observation counters are per show: convergence trouble on one show
    /// never eats into the budget of the next. The final allowed
    /// observation aborts on mismatch without a further sleep or poll.
    async fn poll_show(
        &self,
        section: &str,
        show: &str,
        target: f64,
        reload_attempts: &mut u32,
        cancel: &CancellationToken,
        progress: &ProgressSender,
    ) -> Result<(), ApplyError> {
        for observation in 1..=self.config.max_observations {
            if cancel.is_cancelled() {
                return Err(ApplyError::Cancelled);
            }

            let reported = match self.status.fetch_limits().await {
                Ok(limits) => limits.nominal_percent(section, show),
                Err(e) => {
                    // An unreachable endpoint counts as a mismatched
                    // observation; the budget still bounds total exposure.
                    warn!(show = %show, error = %e, "Status fetch failed");
                    None
                }
            };

            debug!(
                show = %show,
                observation,
                target,
                reported = ?reported,
                "Convergence observation"
            );
            progress.send(ApplyProgress::Observation {
                show: show.to_string(),
                observation,
                target,
                reported,
            });

            if reported == Some(target) {
                info!(show = %show, observations = observation, "Show converged");
                progress.send(ApplyProgress::ShowConverged {
                    show: show.to_string(),
                    observations: observation,
                });
                return Ok(());
            }

            if observation == self.config.max_observations {
                warn!(show = %show, observations = observation, "Convergence budget exhausted");
                return Err(ApplyError::ConvergenceTimeout {
                    show: show.to_string(),
                    observations: observation,
                });
            }

            if self.config.reload_window.contains(&(observation + 1)) {
                self.issue_reload(reload_attempts, progress).await;
                self.pause(self.config.reload_settle, cancel).await?;
            } else {
                self.pause(self.config.poll_interval, cancel).await?;
            }
        }

        unreachable!("poll loop exits via convergence or timeout");
    }

    async fn issue_reload(&self, attempts: &mut u32, progress: &ProgressSender) {
        *attempts += 1;
        let outcome = self.reload.reload().await;
        progress.send(ApplyProgress::ReloadIssued {
            attempt: *attempts,
            outcome,
        });
    }

    async fn pause(
        &self,
        duration: std::time::Duration,
        cancel: &CancellationToken,
    ) -> Result<(), ApplyError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApplyError::Cancelled),
            _ = sleep(duration) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::progress::ProgressSender;
    use crate::limits::document::tests::SAMPLE;
    use crate::limits::{load_current, propose_change};
    use crate::scheduler::reload::tests::RecordingReload;
    use crate::scheduler::status::tests::{reported, ScriptedStatusClient};
    use crate::scheduler::ReloadOutcome;
    use indexmap::IndexMap;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ConfigStore {
        ConfigStore::new(
            dir.path().join("limits.config"),
            dir.path().join("tmp"),
            dir.path().join("backup"),
        )
    }

    fn sample() -> AllocationDocument {
        AllocationDocument::from_json(SAMPLE).unwrap()
    }

    fn sixty_forty(document: &AllocationDocument) -> ChangeSet {
        let current = load_current(document, "linuxfarm", &[]);
        let nominals: IndexMap<String, f64> =
            [("ABC".to_string(), 60.0), ("XYZ".to_string(), 40.0)]
                .into_iter()
                .collect();
        propose_change(&current, &nominals, &IndexMap::new()).unwrap()
    }

    fn coordinator(
        dir: &TempDir,
        status: ScriptedStatusClient,
        reload: RecordingReload,
    ) -> ApplyCoordinator<ScriptedStatusClient, RecordingReload> {
        ApplyCoordinator::new(store_in(dir), status, reload, ApplyConfig::immediate())
    }

    #[test]
    fn test_merge_writes_three_decimal_fractions() {
        let dir = TempDir::new().unwrap();
        let status = ScriptedStatusClient::new(vec![Ok(ReportedLimitsFixture::empty())]);
        let coord = coordinator(&dir, status, RecordingReload::new(ReloadOutcome::Succeeded));

        let mut doc = sample();
        let set = sixty_forty(&doc);
        coord
            .merge_changes(&mut doc, "linuxfarm", &set, &[], false)
            .unwrap();

        assert_eq!(doc.nominal("linuxfarm", "ABC"), Some(0.6));
        assert_eq!(doc.nominal("linuxfarm", "XYZ"), Some(0.4));
        // Caps were not edited and stay put.
        assert_eq!(doc.cap("linuxfarm", "ABC"), Some(0.6));
        // Other sections untouched without mass apply.
        assert_eq!(doc.nominal("_windowsfarm", "ABC"), Some(1.0));
    }

    #[test]
    fn test_mass_apply_skips_excluded_and_missing() {
        let dir = TempDir::new().unwrap();
        let status = ScriptedStatusClient::new(vec![Ok(ReportedLimitsFixture::empty())]);
        let coord = coordinator(&dir, status, RecordingReload::new(ReloadOutcome::Succeeded));

        let text = serde_json::json!({
            "Limits": {
                "linuxfarm": {"Shares": {"ABC": {"nominal": 0.5, "cap": 0.6},
                                          "XYZ": {"nominal": 0.5, "cap": 0.6}}},
                "linuxfarm_2": {"Shares": {"ABC": {"nominal": 0.2, "cap": 0.3},
                                            "XYZ": {"nominal": 0.8, "cap": 0.9}}},
                "linuxfarm_Denoise": {"Shares": {"ABC": {"nominal": 1.0, "cap": 1.0},
                                                  "XYZ": {"nominal": 0.0, "cap": 1.0}}},
                "linuxfarm_3": {"Shares": {"XYZ": {"nominal": 1.0, "cap": 1.0}}}
            }
        })
        .to_string();
        let mut doc = AllocationDocument::from_json(&text).unwrap();
        let set = sixty_forty(&doc);
        let siblings: Vec<String> = [
            "linuxfarm",
            "linuxfarm_2",
            "linuxfarm_3",
            "linuxfarm_Denoise",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        coord
            .merge_changes(&mut doc, "linuxfarm", &set, &siblings, true)
            .unwrap();

        assert_eq!(doc.nominal("linuxfarm", "ABC"), Some(0.6));
        assert_eq!(doc.nominal("linuxfarm_2", "ABC"), Some(0.6));
        assert_eq!(doc.nominal("linuxfarm_2", "XYZ"), Some(0.4));
        // Excluded from mass apply.
        assert_eq!(doc.nominal("linuxfarm_Denoise", "ABC"), Some(1.0));
        // ABC absent from linuxfarm_3: skipped, XYZ still updated.
        assert_eq!(doc.nominal("linuxfarm_3", "ABC"), None);
        assert_eq!(doc.nominal("linuxfarm_3", "XYZ"), Some(0.4));
    }

    #[tokio::test]
    async fn test_apply_converges_and_commits() {
        let dir = TempDir::new().unwrap();
        let status = ScriptedStatusClient::new(vec![Ok(reported(
            "linuxfarm",
            &[("ABC", 0.6), ("XYZ", 0.4)],
        ))]);
        let reload = RecordingReload::new(ReloadOutcome::Succeeded);
        let coord = coordinator(&dir, status.clone(), reload.clone());

        let mut doc = sample();
        let set = sixty_forty(&doc);
        let (progress, mut rx) = ProgressSender::channel();
        coord
            .apply(
                &mut doc,
                "linuxfarm",
                &set,
                &[],
                false,
                &CancellationToken::new(),
                &progress,
            )
            .await
            .unwrap();

        // One fetch per show, one initial reload.
        assert_eq!(status.fetches(), 2);
        assert_eq!(reload.count(), 1);

        // Committed file carries the merged fractions.
        let committed = coord.store.load().unwrap();
        assert_eq!(committed.nominal("linuxfarm", "ABC"), Some(0.6));
        assert_eq!(committed.nominal("linuxfarm", "XYZ"), Some(0.4));
        assert_eq!(committed.cap("linuxfarm", "ABC"), Some(0.6));

        let mut saw_complete = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, ApplyProgress::Complete) {
                saw_complete = true;
            }
        }
        assert!(saw_complete);
    }

    #[tokio::test]
    async fn test_convergence_after_several_observations() {
        let dir = TempDir::new().unwrap();
        let stale = reported("linuxfarm", &[("ABC", 0.5), ("XYZ", 0.5)]);
        let fresh = reported("linuxfarm", &[("ABC", 0.6), ("XYZ", 0.4)]);
        let status = ScriptedStatusClient::new(vec![
            Ok(stale.clone()),
            Ok(stale.clone()),
            Ok(fresh.clone()),
            Ok(fresh),
        ]);
        let reload = RecordingReload::new(ReloadOutcome::Succeeded);
        let coord = coordinator(&dir, status.clone(), reload.clone());

        let mut doc = sample();
        let set = sixty_forty(&doc);
        coord
            .apply(
                &mut doc,
                "linuxfarm",
                &set,
                &[],
                false,
                &CancellationToken::new(),
                &ProgressSender::disabled(),
            )
            .await
            .unwrap();

        // ABC: observations 1, 2 mismatch, 3 converges. XYZ: 1 converges.
        assert_eq!(status.fetches(), 4);
        // Initial reload plus re-issues after observations landing in the
        // 2..=7 window for ABC.
        assert_eq!(reload.count(), 3);
    }

    #[tokio::test]
    async fn test_timeout_after_exactly_eight_observations() {
        let dir = TempDir::new().unwrap();
        let stale = reported("linuxfarm", &[("ABC", 0.5), ("XYZ", 0.5)]);
        let status = ScriptedStatusClient::new(vec![Ok(stale)]);
        let reload = RecordingReload::new(ReloadOutcome::Succeeded);
        let coord = coordinator(&dir, status.clone(), reload.clone());

        let mut doc = sample();
        let set = sixty_forty(&doc);
        let err = coord
            .apply(
                &mut doc,
                "linuxfarm",
                &set,
                &[],
                false,
                &CancellationToken::new(),
                &ProgressSender::disabled(),
            )
            .await
            .unwrap_err();

        match err {
            ApplyError::ConvergenceTimeout { show, observations } => {
                assert_eq!(show, "ABC");
                assert_eq!(observations, 8);
            }
            other => panic!("expected timeout, got {other:?}"),
        }

        // Exactly 8 polls for ABC, never a 9th; XYZ never polled.
        assert_eq!(status.fetches(), 8);
        // Initial reload + re-issues before observations 2..=7.
        assert_eq!(reload.count(), 7);

        // The live file still reflects the committed values; the timeout is
        // about scheduler confirmation, not the write.
        let committed = coord.store.load().unwrap();
        assert_eq!(committed.nominal("linuxfarm", "ABC"), Some(0.6));
    }

    #[tokio::test]
    async fn test_status_errors_consume_budget() {
        let dir = TempDir::new().unwrap();
        let status = ScriptedStatusClient::new(vec![Err(
            crate::scheduler::SchedulerError::Http("connection refused".to_string()),
        )]);
        let reload = RecordingReload::new(ReloadOutcome::Failed);
        let coord = coordinator(&dir, status.clone(), reload.clone());

        let mut doc = sample();
        let set = sixty_forty(&doc);
        let err = coord
            .apply(
                &mut doc,
                "linuxfarm",
                &set,
                &[],
                false,
                &CancellationToken::new(),
                &ProgressSender::disabled(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplyError::ConvergenceTimeout { .. }));
        assert_eq!(status.fetches(), 8);
    }

    #[tokio::test]
    async fn test_cancellation_leaves_commit_in_place() {
        let dir = TempDir::new().unwrap();
        let stale = reported("linuxfarm", &[("ABC", 0.5), ("XYZ", 0.5)]);
        let status = ScriptedStatusClient::new(vec![Ok(stale)]);
        let reload = RecordingReload::new(ReloadOutcome::Succeeded);
        let coord = coordinator(&dir, status, reload);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut doc = sample();
        let set = sixty_forty(&doc);
        let err = coord
            .apply(
                &mut doc,
                "linuxfarm",
                &set,
                &[],
                false,
                &cancel,
                &ProgressSender::disabled(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplyError::Cancelled));
        // Commit happened before the cancel took effect.
        let committed = coord.store.load().unwrap();
        assert_eq!(committed.nominal("linuxfarm", "ABC"), Some(0.6));
    }

    /// Helper producing an empty reported-limits value for merge-only tests.
    struct ReportedLimitsFixture;

    impl ReportedLimitsFixture {
        fn empty() -> crate::scheduler::ReportedLimits {
            crate::scheduler::ReportedLimits::from_json("{}").unwrap()
        }
    }
}
