//! Version-file collaborators
//!
//! A repository is released in one of three styles, detected once from marker files:
//! - `package.json` (not private): npm manages the version, commit and tag
//! - `*.gemspec`: the gem's `version.rb` constants are patched in place
//! - anything else: an optional executable hook script is run, then the tag is forced

pub mod executor;
pub mod gem;

pub use executor::{ProcessExecutor, ProcessOutput};

use semver::Version;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::domain::version;
use crate::error::Result;
use crate::git::SourceControl;
use crate::ui;

const NPM_MANIFEST: &str = "package.json";
const GEMSPEC_PATTERN: &str = "*.gemspec";

/// Release style of a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Gem,
    Plain,
}

#[derive(Debug, Default, Deserialize)]
struct NpmManifest {
    #[serde(default)]
    private: bool,
}

impl PackageManager {
    /// Probe `root` for marker files.
    ///
    /// A `package.json` marked private is released the plain way; an unreadable
    /// one still counts as npm.
    pub fn detect(root: &Path) -> Self {
        let manifest = root.join(NPM_MANIFEST);
        if manifest.exists() {
            let private = fs::read_to_string(&manifest)
                .ok()
                .and_then(|raw| serde_json::from_str::<NpmManifest>(&raw).ok())
                .map(|parsed| parsed.private)
                .unwrap_or(false);

            return if private {
                PackageManager::Plain
            } else {
                PackageManager::Npm
            };
        }

        let has_gemspec = root
            .join(GEMSPEC_PATTERN)
            .to_str()
            .and_then(|pattern| glob::glob(pattern).ok())
            .is_some_and(|mut entries| entries.any(|entry| entry.is_ok()));

        if has_gemspec {
            PackageManager::Gem
        } else {
            PackageManager::Plain
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PackageManager::Npm => "npm",
            PackageManager::Gem => "gem",
            PackageManager::Plain => "plain",
        };
        f.write_str(name)
    }
}

/// Whether a path is a file the current user may execute
fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Applies and publishes versions according to the detected [PackageManager]
pub struct Packager<'a, S: SourceControl> {
    manager: PackageManager,
    scm: &'a S,
    config: &'a Config,
    executor: ProcessExecutor,
    root: PathBuf,
    dry_run: bool,
}

impl<'a, S: SourceControl> Packager<'a, S> {
    pub fn new(
        manager: PackageManager,
        scm: &'a S,
        config: &'a Config,
        root: impl Into<PathBuf>,
        dry_run: bool,
    ) -> Self {
        let root = root.into();
        Packager {
            manager,
            scm,
            config,
            executor: ProcessExecutor::new(root.clone()),
            root,
            dry_run,
        }
    }

    /// Write `next` into the project's version files.
    ///
    /// `commit` and `tag` control whether the change is committed and tagged
    /// afterwards; npm always does both itself.
    pub fn apply_version(&self, next: &Version, current: &Version, commit: bool, tag: bool) -> Result<()> {
        debug!(manager = %self.manager, %next, %current, "applying version");

        match self.manager {
            PackageManager::Npm => self.apply_npm(next),
            PackageManager::Gem => self.apply_gem(next, commit, tag),
            PackageManager::Plain => self.apply_plain(next, current, commit, tag),
        }
    }

    /// Apply the version and ship it.
    ///
    /// npm packages are published with `npm publish`, gems with `rake release`;
    /// everything except gems then pushes commits and tags to `remote`.
    pub fn publish(&self, next: &Version, current: &Version, private: bool, remote: &str) -> Result<()> {
        ui::notify_step(
            self.dry_run,
            "Will update",
            "Updating",
            &format!(" the version to {} ...", next),
        );

        match self.manager {
            PackageManager::Npm => {
                self.apply_version(next, current, true, false)?;

                let access = if private { "restricted" } else { "public" };
                self.run(&format!("npm publish --access {}", access), "npm", &["publish", "--access", access])?;
                self.push(remote)
            }
            PackageManager::Gem => {
                self.apply_version(next, current, true, false)?;
                self.run("rake release", "rake", &["release"])
            }
            PackageManager::Plain => {
                self.apply_version(next, current, true, true)?;
                self.push(remote)
            }
        }
    }

    fn run(&self, display: &str, program: &str, args: &[&str]) -> Result<()> {
        if ui::notify_step(self.dry_run, "Will execute", "Executing", &format!(": {} ...", display)) {
            let output = self.executor.run(program, args)?;
            ui::display_process_output(&output);
        }
        Ok(())
    }

    fn push(&self, remote: &str) -> Result<()> {
        if ui::notify_step(self.dry_run, "Will push", "Pushing", &format!(" commits and tags to {} ...", remote)) {
            self.scm.push(remote, true)?;
        }
        Ok(())
    }

    fn commit_versioning(&self, next: &Version, commit: bool, tag: bool) -> Result<()> {
        let message = self.config.commit_messages.versioning_for(&next.to_string());

        if commit
            && ui::notify_step(
                self.dry_run,
                "Will execute",
                "Executing",
                &format!(": git commit --all --message=\"{}\" ...", message),
            )
        {
            self.scm.commit_all(&[], &message)?;
        }

        let tag_name = version::tag_name(next);
        if tag
            && ui::notify_step(
                self.dry_run,
                "Will execute",
                "Executing",
                &format!(": git tag --force {} ...", tag_name),
            )
        {
            self.scm.tag(&tag_name, true)?;
        }

        Ok(())
    }

    fn apply_npm(&self, next: &Version) -> Result<()> {
        let version = next.to_string();
        let message = self.config.commit_messages.versioning_for(&version);
        let message_arg = format!("--message={}", message);

        self.run(
            &format!("npm version {} {}", version, message_arg),
            "npm",
            &["version", &version, &message_arg],
        )
    }

    fn apply_gem(&self, next: &Version, commit: bool, tag: bool) -> Result<()> {
        let file = gem::find_version_file(&self.root)?;
        let source = fs::read_to_string(&file)?;

        if ui::notify_step(
            self.dry_run,
            "Will update",
            "Updating",
            &format!(" {} ...", file.display()),
        ) {
            fs::write(&file, gem::patch_version_source(&source, next))?;
            info!(file = %file.display(), "patched gem version");
        }

        self.commit_versioning(next, commit, tag)
    }

    fn apply_plain(&self, next: &Version, current: &Version, commit: bool, tag: bool) -> Result<()> {
        let hook = self.root.join(&self.config.packaging.hook);

        if is_executable(&hook) {
            let next_arg = next.to_string();
            let current_arg = current.to_string();

            if ui::notify_step(
                self.dry_run,
                "Will execute",
                "Executing",
                &format!(": ./{} {} {} ...", self.config.packaging.hook, next_arg, current_arg),
            ) {
                let output = self
                    .executor
                    .run(&hook.to_string_lossy(), &[&next_arg, &current_arg])?;
                ui::display_process_output(&output);
            }

            self.commit_versioning(next, commit, false)?;
        }

        self.commit_versioning(next, false, tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::RecordedOperation;
    use crate::git::{CommitInfo, MockRepository};

    fn repo() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.add_commit(CommitInfo::new("aaaaaaa", "initial"));
        repo
    }

    #[test]
    fn test_detect_npm() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name": "widget"}"#).unwrap();
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Npm);
    }

    #[test]
    fn test_detect_private_npm_is_plain() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"private": true}"#).unwrap();
        fs::write(dir.path().join("widget.gemspec"), "").unwrap();
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Plain);
    }

    #[test]
    fn test_detect_gem_and_plain() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Plain);

        fs::write(dir.path().join("widget.gemspec"), "").unwrap();
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Gem);
    }

    #[test]
    fn test_plain_without_hook_only_tags() {
        let dir = tempfile::tempdir().unwrap();
        let scm = repo();
        let config = Config::default();
        let packager = Packager::new(PackageManager::Plain, &scm, &config, dir.path(), false);

        packager
            .apply_version(&Version::new(1, 1, 0), &Version::new(1, 0, 0), true, true)
            .unwrap();

        assert_eq!(
            scm.operations(),
            vec![RecordedOperation::Tag {
                name: "v1.1.0".to_string(),
                force: true
            }]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_plain_runs_hook_then_commits_and_tags() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let hook = dir.path().join("Semtagfile");
        fs::write(&hook, "#!/bin/sh\necho \"$1 $2\" > hook-args.txt\n").unwrap();
        fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();

        let scm = repo();
        let config = Config::default();
        let packager = Packager::new(PackageManager::Plain, &scm, &config, dir.path(), false);

        packager
            .apply_version(&Version::new(1, 1, 0), &Version::new(1, 0, 0), true, true)
            .unwrap();

        let args = fs::read_to_string(dir.path().join("hook-args.txt")).unwrap();
        assert_eq!(args.trim(), "1.1.0 1.0.0");
        assert_eq!(
            scm.operations(),
            vec![
                RecordedOperation::Commit {
                    paths: vec![],
                    message: "Version 1.1.0.".to_string()
                },
                RecordedOperation::Tag {
                    name: "v1.1.0".to_string(),
                    force: true
                },
            ]
        );
    }

    #[test]
    fn test_gem_patches_version_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("lib/widget")).unwrap();
        let file = dir.path().join("lib/widget/version.rb");
        fs::write(&file, "  MAJOR = 1\n  MINOR = 0\n  PATCH = 0\n").unwrap();

        let scm = repo();
        let config = Config::default();
        let packager = Packager::new(PackageManager::Gem, &scm, &config, dir.path(), false);

        packager
            .apply_version(&Version::new(1, 2, 3), &Version::new(1, 0, 0), true, false)
            .unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "  MAJOR = 1\n  MINOR = 2\n  PATCH = 3\n"
        );
        assert_eq!(
            scm.operations(),
            vec![RecordedOperation::Commit {
                paths: vec![],
                message: "Version 1.2.3.".to_string()
            }]
        );
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("lib/widget")).unwrap();
        let file = dir.path().join("lib/widget/version.rb");
        fs::write(&file, "  MAJOR = 1\n").unwrap();

        let scm = repo();
        let config = Config::default();
        let packager = Packager::new(PackageManager::Gem, &scm, &config, dir.path(), true);

        packager
            .publish(&Version::new(2, 0, 0), &Version::new(1, 0, 0), false, "origin")
            .unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "  MAJOR = 1\n");
        assert!(scm.operations().is_empty());
    }

    #[test]
    fn test_plain_publish_pushes_with_tags() {
        let dir = tempfile::tempdir().unwrap();
        let scm = repo();
        let config = Config::default();
        let packager = Packager::new(PackageManager::Plain, &scm, &config, dir.path(), false);

        packager
            .publish(&Version::new(1, 0, 1), &Version::new(1, 0, 0), false, "upstream")
            .unwrap();

        assert_eq!(
            scm.operations().last(),
            Some(&RecordedOperation::Push {
                remote: "upstream".to_string(),
                tags: true
            })
        );
    }
}
