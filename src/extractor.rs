//! Turns commit ranges into classified changes.

use semver::Version;
use tracing::{debug, instrument};

use crate::boundary::Boundary;
use crate::domain::Change;
use crate::error::Result;
use crate::git::{LogRange, SourceControl};
use crate::ledger::VersionLedger;

/// Build the log range between two boundaries.
///
/// The `0.0.0` sentinel has no tag, so when either side is zero the whole history
/// reachable from the other side is walked instead of a range.
pub fn log_range(from: &Boundary, to: &Boundary) -> LogRange {
    match (from.is_zero(), to.is_zero()) {
        (true, true) => LogRange::full("HEAD"),
        (true, false) => LogRange::full(to.revspec()),
        (false, true) => LogRange::full(from.revspec()),
        (false, false) => LogRange::between(from.revspec(), to.revspec()),
    }
}

/// Extracts classified changes from source-control history
pub struct ChangeExtractor<'a, S: SourceControl> {
    scm: &'a S,
}

impl<'a, S: SourceControl> ChangeExtractor<'a, S> {
    pub fn new(scm: &'a S) -> Self {
        ChangeExtractor { scm }
    }

    /// Changes after `from` up to and including `to`, oldest first.
    #[instrument(skip_all, fields(from = %from, to = %to))]
    pub fn extract(&self, from: &Boundary, to: &Boundary) -> Result<Vec<Change>> {
        let range = log_range(from, to);
        let changes: Vec<Change> = self
            .scm
            .log(&range)?
            .iter()
            .map(|commit| Change::classify(&commit.hash, &commit.subject, commit.body.as_deref()))
            .collect();

        debug!(count = changes.len(), "extracted changes");
        Ok(changes)
    }

    /// Changes since a released version up to HEAD
    pub fn since(&self, ledger: &VersionLedger, version: &Version) -> Result<Vec<Change>> {
        self.extract(&ledger.boundary(version), &Boundary::Head)
    }

    /// Changes that make up a released version.
    ///
    /// Bounded below by the previous release, or by the first commit for the oldest one.
    pub fn for_version(&self, ledger: &VersionLedger, version: &Version) -> Result<Vec<Change>> {
        let lower = match ledger.previous(version)? {
            Some(previous) => ledger.boundary(previous),
            None => Boundary::Commit(self.scm.first_commit_hash()?),
        };

        self.extract(&lower, &ledger.boundary(version))
    }
}
