//! Changelog rendering.
//!
//! New sections are prepended to the existing document, which is treated as
//! opaque text and never re-parsed. The same filtering applies to GitHub release
//! bodies.

use chrono::NaiveDate;
use regex::Regex;
use semver::Version;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, instrument};

use crate::domain::{Change, RepositoryId};
use crate::error::Result;
use crate::extractor::ChangeExtractor;
use crate::git::SourceControl;
use crate::ledger::VersionLedger;

fn changelog_update_matcher() -> &'static Regex {
    static MATCHER: OnceLock<Regex> = OnceLock::new();
    MATCHER.get_or_init(|| {
        Regex::new(r"(?i)^(?:update[ds]? changelog(?:\.md)?.?)$").expect("valid changelog regex")
    })
}

fn version_commit_matcher() -> &'static Regex {
    static MATCHER: OnceLock<Regex> = OnceLock::new();
    MATCHER.get_or_init(|| {
        Regex::new(r"(?i)^(?:version\s+\d+\.\d+\.\d+.?)$").expect("valid version commit regex")
    })
}

/// Whether a change message is one of semtag's own bookkeeping commits.
///
/// Matches "update(d|s) changelog(.md)" and "version X.Y.Z", case-insensitively,
/// with an optional trailing character.
pub fn is_noise(message: &str) -> bool {
    changelog_update_matcher().is_match(message) || version_commit_matcher().is_match(message)
}

fn visible(changes: &[Change]) -> impl Iterator<Item = &Change> {
    changes.iter().filter(|change| !is_noise(&change.message))
}

/// Prepend a section for `version` to `existing`.
///
/// ```text
/// ### 2024-03-01 / 1.2.0
///
/// - feat: add cache
///
/// <existing>
/// ```
pub fn render(existing: &str, version: &Version, changes: &[Change], date: NaiveDate) -> String {
    let mut document = String::with_capacity(existing.len() + 64 * (changes.len() + 1));

    document.push_str(&format!("### {} / {}\n\n", date.format("%Y-%m-%d"), version));
    for change in visible(changes) {
        document.push_str(&format!("- {}: {}\n", change.r#type, change.message));
    }

    document.push('\n');
    document.push_str(existing);
    document
}

/// Render the body of a GitHub release.
///
/// Each entry links its commit; manual changes without a hash are left unlinked.
pub fn render_release_body(repository: &RepositoryId, changes: &[Change]) -> String {
    let mut body = String::new();

    for change in visible(changes) {
        let line = if change.hash.is_empty() {
            format!("- {}: {}\n", change.r#type, change.message)
        } else {
            format!(
                "- {}: {} ([{}]({}))\n",
                change.r#type,
                change.message,
                change.hash,
                repository.commit_url(&change.hash)
            )
        };
        body.push_str(&line);
    }

    body.trim().to_string()
}

/// Regenerate the whole changelog from the ledger.
///
/// Versions are walked oldest first and each section is prepended, so the result
/// is newest first and matches what incremental saves would have produced.
#[instrument(skip_all)]
pub fn render_full<S: SourceControl>(scm: &S, ledger: &VersionLedger) -> Result<String> {
    let extractor = ChangeExtractor::new(scm);
    let mut document = String::new();

    for version in ledger.versions() {
        let changes = extractor.for_version(ledger, version)?;
        let date = scm.commit_date(&ledger.tag_name(version))?;
        document = render(&document, version, &changes, date);
    }

    debug!(sections = ledger.versions().len(), "regenerated changelog");
    Ok(document)
}

/// The changelog file in the working tree
#[derive(Debug, Clone)]
pub struct ChangelogFile {
    path: PathBuf,
}

impl ChangelogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ChangelogFile { path: path.into() }
    }

    /// Resolve a configured path against a repository root
    pub fn in_dir(root: &Path, relative: &str) -> Self {
        ChangelogFile::new(root.join(relative))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current document text; a missing file is an empty document
    pub fn read(&self) -> Result<String> {
        if !self.path.exists() {
            return Ok(String::new());
        }
        Ok(fs::read_to_string(&self.path)?)
    }

    /// Replace the document
    pub fn write(&self, document: &str) -> Result<()> {
        fs::write(&self.path, document)?;
        debug!(path = %self.path.display(), bytes = document.len(), "wrote changelog");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{CommitInfo, MockRepository};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn change(hash: &str, subject: &str) -> Change {
        Change::classify(hash, subject, None)
    }

    #[test]
    fn test_noise_patterns() {
        for message in [
            "Updated CHANGELOG.md.",
            "update changelog",
            "UPDATES CHANGELOG.MD",
            "Updated changelog",
            "Version 1.2.3.",
            "version 10.0.1",
        ] {
            assert!(is_noise(message), "{} should be noise", message);
        }

        for message in [
            "update changelog generator",
            "add version 1.2.3 support",
            "updated readme",
            "Version 1.2",
        ] {
            assert!(!is_noise(message), "{} should not be noise", message);
        }
    }

    #[test]
    fn test_render_prepends_section() {
        let changes = vec![change("aaaaaaa", "fix: null check"), change("bbbbbbb", "feat: add cache")];
        let document = render(
            "### 2024-01-01 / 1.0.0\n\n- feat: initial\n\n",
            &Version::new(1, 1, 0),
            &changes,
            date(2024, 2, 1),
        );

        assert_eq!(
            document,
            "### 2024-02-01 / 1.1.0\n\n- fix: null check\n- feat: add cache\n\n### 2024-01-01 / 1.0.0\n\n- feat: initial\n\n"
        );
    }

    #[test]
    fn test_render_keeps_foreign_content() {
        let existing = "# My Project\n\nHand-written *notes*.\n";
        let document = render(existing, &Version::new(0, 1, 0), &[], date(2024, 1, 1));
        assert!(document.ends_with(existing));
        assert!(document.starts_with("### 2024-01-01 / 0.1.0\n\n\n"));
    }

    #[test]
    fn test_render_filters_noise() {
        let changes = vec![
            Change::manual("Updated CHANGELOG.md."),
            Change::manual("Version 1.2.3."),
            change("ccccccc", "chore: update changelog"),
            change("ddddddd", "feat: keep me"),
        ];
        let document = render("", &Version::new(1, 2, 4), &changes, date(2024, 3, 1));

        assert_eq!(document, "### 2024-03-01 / 1.2.4\n\n- feat: keep me\n\n");
    }

    #[test]
    fn test_release_body_links_commits() {
        let repository = RepositoryId::new("acme", "widget");
        let changes = vec![
            change("abc1234", "fix: null check"),
            Change::manual("docs: manual note"),
            change("def5678", "Version 1.1.0."),
        ];

        assert_eq!(
            render_release_body(&repository, &changes),
            "- fix: null check ([abc1234](https://github.com/acme/widget/commit/abc1234))\n- docs: manual note"
        );
    }

    #[test]
    fn test_release_body_empty() {
        let repository = RepositoryId::new("acme", "widget");
        assert_eq!(render_release_body(&repository, &[]), "");
    }

    #[test]
    fn test_full_regeneration_matches_incremental() {
        let mut repo = MockRepository::new();
        repo.add_commit(CommitInfo::new("1000000", "initial commit"));
        repo.add_commit(CommitInfo::new("1000001", "feat: first feature"));
        repo.add_dated_tag("v1.0.0", date(2024, 1, 1));
        repo.add_commit(CommitInfo::new("1000002", "fix: null check"));
        repo.add_commit(CommitInfo::new("1000003", "Updated CHANGELOG.md."));
        repo.add_dated_tag("v1.0.1", date(2024, 1, 15));
        repo.add_commit(CommitInfo::new("1000004", "feat: add cache"));
        repo.add_dated_tag("v1.1.0", date(2024, 2, 1));

        let ledger = VersionLedger::load(&repo).unwrap();
        let full = render_full(&repo, &ledger).unwrap();

        let extractor = ChangeExtractor::new(&repo);
        let mut incremental = String::new();
        for (version, day) in [
            (Version::new(1, 0, 0), date(2024, 1, 1)),
            (Version::new(1, 0, 1), date(2024, 1, 15)),
            (Version::new(1, 1, 0), date(2024, 2, 1)),
        ] {
            let changes = extractor.for_version(&ledger, &version).unwrap();
            incremental = render(&incremental, &version, &changes, day);
        }

        assert_eq!(full, incremental);
        assert_eq!(
            full,
            "### 2024-02-01 / 1.1.0\n\n- feat: add cache\n\n\
             ### 2024-01-15 / 1.0.1\n\n- fix: null check\n\n\
             ### 2024-01-01 / 1.0.0\n\n- feat: first feature\n\n"
        );

        // Regenerating twice is stable
        assert_eq!(render_full(&repo, &ledger).unwrap(), full);
    }

    #[test]
    fn test_changelog_file_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = ChangelogFile::in_dir(dir.path(), "CHANGELOG.md");
        assert_eq!(file.read().unwrap(), "");

        file.write("### 2024-01-01 / 1.0.0\n\n").unwrap();
        assert_eq!(file.read().unwrap(), "### 2024-01-01 / 1.0.0\n\n");
    }

    #[test]
    fn test_full_regeneration_with_unprefixed_tag() {
        let mut repo = MockRepository::new();
        repo.add_commit(CommitInfo::new("1000000", "initial commit"));
        repo.add_commit(CommitInfo::new("1000001", "feat: first feature"));
        repo.add_dated_tag("1.0.0", date(2024, 1, 1));
        repo.add_commit(CommitInfo::new("1000002", "fix: null check"));
        repo.add_dated_tag("v1.1.0", date(2024, 2, 1));

        let ledger = VersionLedger::load(&repo).unwrap();
        assert_eq!(
            render_full(&repo, &ledger).unwrap(),
            "### 2024-02-01 / 1.1.0\n\n- fix: null check\n\n\
             ### 2024-01-01 / 1.0.0\n\n- feat: first feature\n\n"
        );
    }
}
