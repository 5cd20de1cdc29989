use semver::Version;
use std::fmt;
use tracing::{info, instrument, warn};

use crate::changelog;
use crate::domain::{version, Change, ReleasePayload, RepositoryId};
use crate::error::{Result, SemtagError};
use crate::extractor::ChangeExtractor;
use crate::git::SourceControl;
use crate::github::ReleaseApi;
use crate::ledger::VersionLedger;

/// What the synchronizer did, or would do, for one version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Create,
    Update { id: u64 },
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Create => f.write_str("create"),
            SyncAction::Update { id } => write!(f, "update (id {})", id),
        }
    }
}

/// Result of synchronizing one release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub version: Version,
    /// The tag the release is attached to
    pub tag: String,
    pub action: SyncAction,
    /// The composed release body
    pub body: String,
    /// `false` in dry-run mode, where nothing was sent
    pub performed: bool,
}

/// Outcome of a bulk regeneration that keeps going past failures
#[derive(Debug, Default)]
pub struct BulkSyncReport {
    pub synced: Vec<SyncOutcome>,
    pub failed: Vec<(Version, SemtagError)>,
}

impl BulkSyncReport {
    /// Successful outcomes, or `PartialSync` when any version failed
    pub fn into_result(self) -> Result<Vec<SyncOutcome>> {
        if self.failed.is_empty() {
            return Ok(self.synced);
        }

        Err(SemtagError::PartialSync {
            failed: self
                .failed
                .into_iter()
                .map(|(version, error)| (version, error.to_string()))
                .collect(),
        })
    }
}

/// Reconciles local history with remote release records
pub struct ReleaseSynchronizer<'a, A: ReleaseApi> {
    api: &'a A,
    repository: RepositoryId,
    dry_run: bool,
}

impl<'a, A: ReleaseApi> ReleaseSynchronizer<'a, A> {
    pub fn new(api: &'a A, repository: RepositoryId, dry_run: bool) -> Self {
        ReleaseSynchronizer {
            api,
            repository,
            dry_run,
        }
    }

    /// Create the release of `version` under its conventional `v<version>` tag
    pub fn sync(&self, version: &Version, changes: &[Change]) -> Result<SyncOutcome> {
        self.sync_tag(&version::tag_name(version), version, changes)
    }

    /// Create the release of `tag`, or update it when one already exists.
    ///
    /// The lookup always runs; in dry-run mode no create or update is sent.
    #[instrument(skip_all, fields(repository = %self.repository, tag = %tag))]
    pub fn sync_tag(&self, tag: &str, version: &Version, changes: &[Change]) -> Result<SyncOutcome> {
        let body = changelog::render_release_body(&self.repository, changes);

        let action = match self.api.find_release(&self.repository, tag)? {
            Some(existing) => SyncAction::Update { id: existing.id },
            None => SyncAction::Create,
        };

        if !self.dry_run {
            let payload = ReleasePayload::for_tag(tag, version, body.clone());
            match action {
                SyncAction::Create => self.api.create_release(&self.repository, &payload)?,
                SyncAction::Update { id } => {
                    self.api.update_release(&self.repository, id, &payload)?
                }
            };
            info!(%action, "synchronized release");
        }

        Ok(SyncOutcome {
            version: version.clone(),
            tag: tag.to_string(),
            action,
            body,
            performed: !self.dry_run,
        })
    }

    /// Synchronize a released version from its own commit range
    pub fn sync_version<S: SourceControl>(
        &self,
        scm: &S,
        ledger: &VersionLedger,
        version: &Version,
    ) -> Result<SyncOutcome> {
        let changes = ChangeExtractor::new(scm).for_version(ledger, version)?;
        self.sync_tag(&ledger.tag_name(version), version, &changes)
    }

    /// Synchronize every version of the ledger, oldest first.
    ///
    /// A failing version is logged and recorded; the remaining versions are still
    /// processed and earlier successes stay applied.
    pub fn regenerate_all<S: SourceControl>(&self, scm: &S, ledger: &VersionLedger) -> BulkSyncReport {
        let mut report = BulkSyncReport::default();

        for version in ledger.versions() {
            match self.sync_version(scm, ledger, version) {
                Ok(outcome) => report.synced.push(outcome),
                Err(e) => {
                    warn!(%version, error = %e, "failed to synchronize release");
                    report.failed.push((version.clone(), e));
                }
            }
        }

        report
    }
}
