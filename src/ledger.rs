//! Version ledger: every released version found in the repository tags.

use semver::Version;
use std::cmp::Ordering;
use tracing::{debug, warn};

use crate::boundary::{Boundary, BoundaryWarning};
use crate::domain::version;
use crate::error::{Result, SemtagError};
use crate::git::SourceControl;

/// A released version and the tag it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    pub version: Version,
    pub name: String,
}

impl ReleaseTag {
    /// Ordering among tags of the same release: plain before build metadata,
    /// `v`-prefixed before bare, then by name
    fn preference(&self, other: &Self) -> Ordering {
        self.version
            .build
            .is_empty()
            .cmp(&other.version.build.is_empty())
            .reverse()
            .then_with(|| {
                self.name
                    .starts_with('v')
                    .cmp(&other.name.starts_with('v'))
                    .reverse()
            })
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Ordered (ascending) snapshot of the released versions of a repository.
///
/// Built fresh from the tags on every invocation and never mutated afterwards.
/// Tags differing only in build metadata are one release; the preferred tag
/// is kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VersionLedger {
    versions: Vec<Version>,
    tags: Vec<ReleaseTag>,
    warnings: Vec<BoundaryWarning>,
}

impl VersionLedger {
    /// Read all release tags from the repository.
    ///
    /// Tags that look like releases but fail to parse are skipped with a warning.
    pub fn load<S: SourceControl>(scm: &S) -> Result<Self> {
        Ok(Self::from_tags(scm.tag_names()?))
    }

    /// Build a ledger from raw tag names
    pub fn from_tags<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut releases = Vec::new();
        let mut warnings = Vec::new();

        for tag in tags {
            let tag = tag.as_ref().trim();
            if !version::is_release_tag(tag) {
                continue;
            }

            match version::parse_tag(tag) {
                Ok(parsed) => releases.push(ReleaseTag {
                    version: parsed,
                    name: tag.to_string(),
                }),
                Err(e) => {
                    let reason = match e {
                        SemtagError::InvalidVersion { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    let warning = BoundaryWarning::UnparsableTag {
                        tag: tag.to_string(),
                        reason,
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        releases.sort_by(|a, b| {
            a.version
                .cmp_precedence(&b.version)
                .then_with(|| a.preference(b))
        });
        releases.dedup_by(|later, kept| {
            let same = later.version.cmp_precedence(&kept.version) == Ordering::Equal;
            if same {
                debug!(skipped = %later.name, kept = %kept.name, "duplicate release tag");
            }
            same
        });

        debug!(count = releases.len(), "resolved version ledger");
        VersionLedger {
            versions: releases.iter().map(|r| r.version.clone()).collect(),
            tags: releases,
            warnings,
        }
    }

    /// All versions, ascending
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    /// Tags skipped while building the ledger
    pub fn warnings(&self) -> &[BoundaryWarning] {
        &self.warnings
    }

    /// The latest version, or `0.0.0` for an untagged repository
    pub fn current(&self) -> Version {
        self.versions.last().cloned().unwrap_or_else(version::zero)
    }

    fn find(&self, target: &Version) -> Option<&ReleaseTag> {
        self.tags
            .iter()
            .find(|r| r.version.cmp_precedence(target) == Ordering::Equal)
    }

    /// The tag a version was released under; `v<version>` when unknown
    pub fn tag_name(&self, target: &Version) -> String {
        self.find(target)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| version::tag_name(target))
    }

    /// Range boundary for a version, addressed through its actual tag
    pub fn boundary(&self, target: &Version) -> Boundary {
        match self.find(target) {
            Some(release) => Boundary::Tag(release.name.clone()),
            None => Boundary::Version(target.clone()),
        }
    }

    /// The version released right before `target`, if any
    pub fn previous(&self, target: &Version) -> Result<Option<&Version>> {
        let index = self
            .versions
            .iter()
            .position(|v| v.cmp_precedence(target) == Ordering::Equal)
            .ok_or_else(|| SemtagError::UnknownVersion(target.clone()))?;

        Ok(index.checked_sub(1).map(|i| &self.versions[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_orders_numerically() {
        let ledger = VersionLedger::from_tags(["v1.2.3", "v1.10.0", "v1.2.10"]);
        let rendered: Vec<String> = ledger.versions().iter().map(|v| v.to_string()).collect();
        assert_eq!(rendered, vec!["1.2.3", "1.2.10", "1.10.0"]);
        assert_eq!(ledger.current(), Version::new(1, 10, 0));
    }

    #[test]
    fn test_empty_ledger_is_zero() {
        let ledger = VersionLedger::from_tags(Vec::<String>::new());
        assert!(ledger.versions().is_empty());
        assert_eq!(ledger.current(), Version::new(0, 0, 0));
    }

    #[test]
    fn test_ignores_non_release_tags() {
        let ledger = VersionLedger::from_tags(["latest", "release-2.0.0", "v1.0.0"]);
        assert_eq!(ledger.versions(), &[Version::new(1, 0, 0)]);
        assert!(ledger.warnings().is_empty());
    }

    #[traced_test]
    #[test]
    fn test_unparsable_tag_is_skipped_with_warning() {
        let ledger = VersionLedger::from_tags(["v1.0.0", "v1.2.3.4", "v2.0.0"]);
        assert_eq!(ledger.versions().len(), 2);
        assert_eq!(ledger.warnings().len(), 1);
        assert!(logs_contain("v1.2.3.4"));
    }

    #[test]
    fn test_prerelease_ordering() {
        let ledger = VersionLedger::from_tags(["v1.0.0", "v1.0.0-rc.1", "v0.9.0"]);
        let rendered: Vec<String> = ledger.versions().iter().map(|v| v.to_string()).collect();
        assert_eq!(rendered, vec!["0.9.0", "1.0.0-rc.1", "1.0.0"]);
    }

    #[test]
    fn test_previous_version() {
        let ledger = VersionLedger::from_tags(["v1.0.0", "v1.1.0"]);
        assert_eq!(
            ledger.previous(&Version::new(1, 1, 0)).unwrap(),
            Some(&Version::new(1, 0, 0))
        );
        assert_eq!(ledger.previous(&Version::new(1, 0, 0)).unwrap(), None);
        assert!(ledger.previous(&Version::new(3, 0, 0)).is_err());
    }

    #[test]
    fn test_keeps_source_tag_names() {
        let ledger = VersionLedger::from_tags(["1.0.0", "v1.1.0"]);
        assert_eq!(ledger.tag_name(&Version::new(1, 0, 0)), "1.0.0");
        assert_eq!(ledger.tag_name(&Version::new(1, 1, 0)), "v1.1.0");
        assert_eq!(
            ledger.boundary(&Version::new(1, 0, 0)),
            Boundary::Tag("1.0.0".to_string())
        );

        // Unknown versions fall back to the conventional tag
        assert_eq!(ledger.tag_name(&Version::new(2, 0, 0)), "v2.0.0");
        assert_eq!(
            ledger.boundary(&Version::new(2, 0, 0)),
            Boundary::Version(Version::new(2, 0, 0))
        );
    }

    #[test]
    fn test_build_metadata_variants_collapse() {
        let ledger = VersionLedger::from_tags(["v1.0.0+ci.1", "v1.0.0", "1.0.0", "v1.1.0+ci.7"]);

        let rendered: Vec<String> = ledger.versions().iter().map(|v| v.to_string()).collect();
        assert_eq!(rendered, vec!["1.0.0", "1.1.0+ci.7"]);
        assert_eq!(ledger.tag_name(&Version::new(1, 0, 0)), "v1.0.0");
        assert_eq!(ledger.tag_name(&Version::new(1, 1, 0)), "v1.1.0+ci.7");
        assert_eq!(
            ledger.previous(&Version::new(1, 1, 0)).unwrap(),
            Some(&Version::new(1, 0, 0))
        );
    }
}
