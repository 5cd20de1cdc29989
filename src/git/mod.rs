//! Git operations abstraction layer
//!
//! The [SourceControl] trait is everything the release engine needs from version
//! control. Two implementations exist:
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory implementation for tests
//!
//! ```rust
//! # use semtag::git::{LogRange, SourceControl};
//! # fn example<S: SourceControl>(scm: &S) -> semtag::Result<()> {
//! let tags = scm.tag_names()?;
//! let commits = scm.log(&LogRange::between("v1.0.0", "HEAD"))?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use chrono::NaiveDate;

use crate::error::Result;

/// Commit information as listed by a log query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// The abbreviated commit hash
    pub hash: String,
    /// First line of the commit message
    pub subject: String,
    /// Remaining lines of the commit message, if any
    pub body: Option<String>,
}

impl CommitInfo {
    pub fn new(hash: impl Into<String>, subject: impl Into<String>) -> Self {
        CommitInfo {
            hash: hash.into(),
            subject: subject.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A commit range for [SourceControl::log]
///
/// `from: None` walks the entire history reachable from `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRange {
    pub from: Option<String>,
    pub to: String,
}

impl LogRange {
    /// Commits reachable from `to` but not from `from`
    pub fn between(from: impl Into<String>, to: impl Into<String>) -> Self {
        LogRange {
            from: Some(from.into()),
            to: to.into(),
        }
    }

    /// The whole history reachable from `to`
    pub fn full(to: impl Into<String>) -> Self {
        LogRange {
            from: None,
            to: to.into(),
        }
    }
}

/// Source-control operations used by semtag
///
/// Query methods never mutate the repository. `commit_all`, `tag` and `push`
/// are only invoked by the orchestration layer outside of dry-run mode.
pub trait SourceControl {
    /// List all tag names in the repository
    fn tag_names(&self) -> Result<Vec<String>>;

    /// List commits in `range`, oldest first
    fn log(&self, range: &LogRange) -> Result<Vec<CommitInfo>>;

    /// Full hash of the root commit of the current history
    fn first_commit_hash(&self) -> Result<String>;

    /// Author date of the commit a revision points to
    fn commit_date(&self, revspec: &str) -> Result<NaiveDate>;

    /// URL of a configured remote
    fn remote_url(&self, remote: &str) -> Result<String>;

    /// Whether the working tree has no uncommitted changes
    fn is_clean(&self) -> Result<bool>;

    /// Stage the given paths plus all tracked modifications and commit them
    fn commit_all(&self, paths: &[&str], message: &str) -> Result<()>;

    /// Create a lightweight tag on HEAD, replacing an existing one when `force` is set
    fn tag(&self, name: &str, force: bool) -> Result<()>;

    /// Push the current branch and, optionally, all tags to a remote
    fn push(&self, remote: &str, tags: bool) -> Result<()>;
}
