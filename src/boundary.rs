use semver::Version;
use std::fmt;

use crate::domain::version;

/// One end of a commit range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Boundary {
    /// A released version, addressed through its `v<version>` tag
    Version(Version),
    /// A tag name exactly as it exists in the repository
    Tag(String),
    /// A raw commit hash, used verbatim
    Commit(String),
    /// The current HEAD
    Head,
}

impl Boundary {
    /// Whether this is the `0.0.0` sentinel meaning "from the beginning of history"
    pub fn is_zero(&self) -> bool {
        matches!(self, Boundary::Version(v) if version::is_zero(v))
    }

    /// Revision expression understood by the source-control collaborator
    pub fn revspec(&self) -> String {
        match self {
            Boundary::Version(v) => version::tag_name(v),
            Boundary::Tag(name) => name.clone(),
            Boundary::Commit(hash) => hash.clone(),
            Boundary::Head => "HEAD".to_string(),
        }
    }
}

impl From<Version> for Boundary {
    fn from(version: Version) -> Self {
        Boundary::Version(version)
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.revspec())
    }
}

/// Warnings that occur when processing repository history.
/// These are non-fatal issues that should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Tag looks like a release but cannot be parsed as a semantic version
    UnparsableTag { tag: String, reason: String },
    /// No changes were found since the given version
    NoNewCommits { since: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::UnparsableTag { tag, reason } => {
                write!(
                    f,
                    "Cannot parse git tag '{}' as a version, will skip it: {}",
                    tag, reason
                )
            }
            BoundaryWarning::NoNewCommits { since } => {
                write!(f, "No new commits since {}", since)
            }
        }
    }
}
