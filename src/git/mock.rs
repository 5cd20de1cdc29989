use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{Result, SemtagError};
use crate::git::{CommitInfo, LogRange, SourceControl};

/// Mutating operation recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedOperation {
    Commit { paths: Vec<String>, message: String },
    Tag { name: String, force: bool },
    Push { remote: String, tags: bool },
}

/// Mock repository for testing without actual git operations
///
/// History is a linear list of commits, oldest first. Tags point at an index in
/// that list, so ranges behave like `git log from..to` on a straight line.
pub struct MockRepository {
    commits: Vec<CommitInfo>,
    tags: HashMap<String, usize>,
    dates: HashMap<String, NaiveDate>,
    remotes: HashMap<String, String>,
    clean: bool,
    operations: RefCell<Vec<RecordedOperation>>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            commits: Vec::new(),
            tags: HashMap::new(),
            dates: HashMap::new(),
            remotes: HashMap::new(),
            clean: true,
            operations: RefCell::new(Vec::new()),
        }
    }

    /// Append a commit on top of history
    pub fn add_commit(&mut self, info: CommitInfo) {
        self.commits.push(info);
    }

    /// Tag the current tip of history
    pub fn add_tag(&mut self, name: impl Into<String>) {
        let index = self.commits.len().saturating_sub(1);
        self.tags.insert(name.into(), index);
    }

    /// Tag the current tip and record the date reported for it
    pub fn add_dated_tag(&mut self, name: impl Into<String>, date: NaiveDate) {
        let name = name.into();
        self.dates.insert(name.clone(), date);
        self.add_tag(name);
    }

    /// Configure a remote URL
    pub fn add_remote(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.remotes.insert(name.into(), url.into());
    }

    /// Set the value reported by `is_clean`
    pub fn set_clean(&mut self, clean: bool) {
        self.clean = clean;
    }

    /// Mutating operations performed so far
    pub fn operations(&self) -> Vec<RecordedOperation> {
        self.operations.borrow().clone()
    }

    fn position(&self, revspec: &str) -> Result<usize> {
        if revspec == "HEAD" {
            return self
                .commits
                .len()
                .checked_sub(1)
                .ok_or_else(|| SemtagError::Git(git2::Error::from_str("empty history")));
        }

        if let Some(index) = self.tags.get(revspec) {
            return Ok(*index);
        }

        self.commits
            .iter()
            .position(|c| c.hash == revspec || (revspec.len() >= 7 && c.hash.starts_with(revspec)))
            .ok_or_else(|| {
                SemtagError::Git(git2::Error::from_str(&format!(
                    "revspec '{}' not found",
                    revspec
                )))
            })
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceControl for MockRepository {
    fn tag_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.tags.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn log(&self, range: &LogRange) -> Result<Vec<CommitInfo>> {
        let end = self.position(&range.to)?;
        let start = match &range.from {
            Some(from) => self.position(from)? + 1,
            None => 0,
        };

        if start > end {
            return Ok(Vec::new());
        }
        Ok(self.commits[start..=end].to_vec())
    }

    fn first_commit_hash(&self) -> Result<String> {
        self.commits
            .first()
            .map(|c| c.hash.clone())
            .ok_or_else(|| SemtagError::Git(git2::Error::from_str("Cannot get first git commit")))
    }

    fn commit_date(&self, revspec: &str) -> Result<NaiveDate> {
        self.dates.get(revspec).copied().ok_or_else(|| {
            SemtagError::Git(git2::Error::from_str(&format!("no date for '{}'", revspec)))
        })
    }

    fn remote_url(&self, remote: &str) -> Result<String> {
        self.remotes.get(remote).cloned().ok_or_else(|| {
            SemtagError::Git(git2::Error::from_str(&format!(
                "remote '{}' does not exist",
                remote
            )))
        })
    }

    fn is_clean(&self) -> Result<bool> {
        Ok(self.clean)
    }

    fn commit_all(&self, paths: &[&str], message: &str) -> Result<()> {
        self.operations.borrow_mut().push(RecordedOperation::Commit {
            paths: paths.iter().map(|p| p.to_string()).collect(),
            message: message.to_string(),
        });
        Ok(())
    }

    fn tag(&self, name: &str, force: bool) -> Result<()> {
        self.operations.borrow_mut().push(RecordedOperation::Tag {
            name: name.to_string(),
            force,
        });
        Ok(())
    }

    fn push(&self, remote: &str, tags: bool) -> Result<()> {
        self.operations.borrow_mut().push(RecordedOperation::Push {
            remote: remote.to_string(),
            tags,
        });
        Ok(())
    }
}
