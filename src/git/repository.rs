use chrono::{FixedOffset, NaiveDate, TimeZone};
use git2::{Oid, Repository as Git2Repo, Sort, StatusOptions};
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::error::{Result, SemtagError};
use crate::git::{CommitInfo, LogRange, SourceControl};

/// Wrapper around git2::Repository implementing [SourceControl]
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Root of the working tree
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn resolve(&self, revspec: &str) -> Result<Oid> {
        let object = self.repo.revparse_single(revspec)?;
        Ok(object.peel_to_commit()?.id())
    }

    fn current_branch_ref(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(SemtagError::Git(git2::Error::from_str(
                "HEAD is detached, cannot push the current branch",
            )));
        }
        head.name()
            .map(|name| name.to_string())
            .ok_or_else(|| SemtagError::Git(git2::Error::from_str("HEAD name is not valid UTF-8")))
    }
}

/// Credentials callbacks for fetch/push.
///
/// Tries the SSH agent, then the usual key files under `~/.ssh`, then the
/// configured git credential helper.
fn remote_callbacks<'a>(config: git2::Config) -> git2::RemoteCallbacks<'a> {
    let mut callbacks = git2::RemoteCallbacks::new();

    callbacks.credentials(move |url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }

            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }
        }

        if allowed_types.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
            return git2::Cred::credential_helper(&config, url, username_from_url);
        }

        git2::Cred::default()
    });

    callbacks.push_update_reference(|refname, status| match status {
        Some(status) => Err(git2::Error::from_str(&format!(
            "Push failed for {}: {}",
            refname, status
        ))),
        None => Ok(()),
    });

    callbacks
}

impl SourceControl for Git2Repository {
    fn tag_names(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    #[instrument(skip(self))]
    fn log(&self, range: &LogRange) -> Result<Vec<CommitInfo>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push(self.resolve(&range.to)?)?;

        if let Some(from) = &range.from {
            revwalk.hide(self.resolve(from)?)?;
        }

        let mut commits = Vec::new();

        for oid_result in revwalk {
            let commit = self.repo.find_commit(oid_result?)?;
            let short_id = commit.as_object().short_id()?;
            let hash = short_id.as_str().unwrap_or_default().to_string();

            let message = commit.message().unwrap_or_default();
            let (subject, body) = match message.split_once('\n') {
                Some((subject, body)) if !body.trim().is_empty() => {
                    (subject, Some(body.trim().to_string()))
                }
                Some((subject, _)) => (subject, None),
                None => (message, None),
            };

            commits.push(CommitInfo {
                hash,
                subject: subject.trim().to_string(),
                body,
            });
        }

        debug!(count = commits.len(), "listed commits");
        Ok(commits)
    }

    fn first_commit_hash(&self) -> Result<String> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push_head()?;

        match revwalk.next() {
            Some(oid) => Ok(oid?.to_string()),
            None => Err(SemtagError::Git(git2::Error::from_str(
                "Cannot get first git commit",
            ))),
        }
    }

    fn commit_date(&self, revspec: &str) -> Result<NaiveDate> {
        let commit = self.repo.find_commit(self.resolve(revspec)?)?;
        let when = commit.author().when();

        let offset = FixedOffset::east_opt(when.offset_minutes() * 60)
            .ok_or_else(|| SemtagError::malformed("Invalid commit timezone offset"))?;
        let date = offset
            .timestamp_opt(when.seconds(), 0)
            .single()
            .ok_or_else(|| SemtagError::malformed("Cannot parse git commit date"))?;

        Ok(date.date_naive())
    }

    fn remote_url(&self, remote: &str) -> Result<String> {
        let remote = self.repo.find_remote(remote)?;
        remote
            .url()
            .map(|url| url.to_string())
            .ok_or_else(|| SemtagError::malformed("Remote URL is not valid UTF-8"))
    }

    fn is_clean(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(true).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses.is_empty())
    }

    #[instrument(skip(self))]
    fn commit_all(&self, paths: &[&str], message: &str) -> Result<()> {
        let mut index = self.repo.index()?;

        for path in paths {
            index.add_path(Path::new(path))?;
        }
        index.update_all(["*"], None)?;
        index.write()?;

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = self.repo.signature()?;
        let parent = self.repo.head()?.peel_to_commit()?;

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])?;

        info!(%oid, "created commit");
        Ok(())
    }

    #[instrument(skip(self))]
    fn tag(&self, name: &str, force: bool) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.tag_lightweight(name, head.as_object(), force)?;

        info!(name, "created tag");
        Ok(())
    }

    #[instrument(skip(self))]
    fn push(&self, remote: &str, tags: bool) -> Result<()> {
        let mut remote = self.repo.find_remote(remote)?;

        let branch = self.current_branch_ref()?;
        let mut refspecs = vec![format!("{}:{}", branch, branch)];

        if tags {
            for tag in self.repo.tag_names(None)?.iter().flatten() {
                refspecs.push(format!("+refs/tags/{}:refs/tags/{}", tag, tag));
            }
        }

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(remote_callbacks(self.repo.config()?));

        remote.push(&refspecs, Some(&mut push_options))?;

        info!(refs = refspecs.len(), "pushed to remote");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;

    fn commit_file(repo: &Git2Repo, dir: &Path, content: &str, message: &str) -> Oid {
        fs::write(dir.join("file.txt"), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("file.txt")).unwrap();
        index.write().unwrap();

        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => vec![],
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    #[test]
    fn test_log_is_oldest_first_and_splits_body() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Git2Repo::init(dir.path()).unwrap();
        let root = commit_file(&repo, dir.path(), "1", "initial");
        repo.tag_lightweight("v1.0.0", &repo.find_object(root, None).unwrap(), false)
            .unwrap();
        commit_file(&repo, dir.path(), "2", "fix: first");
        commit_file(
            &repo,
            dir.path(),
            "3",
            "feat!: second\n\nBREAKING CHANGE: everything",
        );

        let scm = Git2Repository::from_git2(repo);
        let commits = scm.log(&LogRange::between("v1.0.0", "HEAD")).unwrap();

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].subject, "fix: first");
        assert_eq!(commits[1].subject, "feat!: second");
        assert_eq!(
            commits[1].body.as_deref(),
            Some("BREAKING CHANGE: everything")
        );
        assert_eq!(scm.first_commit_hash().unwrap(), root.to_string());
    }

    #[test]
    fn test_clean_and_dirty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Git2Repo::init(dir.path()).unwrap();
        commit_file(&repo, dir.path(), "1", "initial");

        let scm = Git2Repository::from_git2(repo);
        assert!(scm.is_clean().unwrap());

        fs::write(dir.path().join("file.txt"), "changed").unwrap();
        assert!(!scm.is_clean().unwrap());
    }
}
