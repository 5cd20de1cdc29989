//! Command workflows
//!
//! Each function sequences the ledger, extractor, bump policy, changelog and
//! release components for one command. Every mutation is announced through
//! [ui::notify_step] and skipped in dry-run mode.

use chrono::Local;
use semver::Version;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::analyzer::{resolve_target, AUTO_TARGET};
use crate::boundary::BoundaryWarning;
use crate::changelog::{self, ChangelogFile};
use crate::config::Config;
use crate::domain::{version, Change, RepositoryId};
use crate::error::{Result, SemtagError};
use crate::extractor::ChangeExtractor;
use crate::git::SourceControl;
use crate::github::{ReleaseApi, ReleaseSynchronizer, SyncOutcome};
use crate::ledger::VersionLedger;
use crate::packaging::{PackageManager, Packager};
use crate::ui;

/// Everything a command needs for one invocation
pub struct Context<'a, S: SourceControl> {
    pub scm: &'a S,
    pub config: &'a Config,
    pub root: PathBuf,
    pub dry_run: bool,
}

impl<'a, S: SourceControl> Context<'a, S> {
    pub fn new(scm: &'a S, config: &'a Config, root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Context {
            scm,
            config,
            root: root.into(),
            dry_run,
        }
    }

    fn ledger(&self) -> Result<VersionLedger> {
        let ledger = VersionLedger::load(self.scm)?;
        for warning in ledger.warnings() {
            ui::display_boundary_warning(warning);
        }
        Ok(ledger)
    }

    fn extractor(&self) -> ChangeExtractor<'a, S> {
        ChangeExtractor::new(self.scm)
    }

    fn changelog_file(&self) -> ChangelogFile {
        ChangelogFile::in_dir(&self.root, &self.config.changelog.path)
    }

    fn packager(&self) -> Packager<'a, S> {
        let manager = PackageManager::detect(&self.root);
        debug!(%manager, "detected package manager");
        Packager::new(manager, self.scm, self.config, self.root.clone(), self.dry_run)
    }

    /// Refuse to write into a dirty working tree, except in dry-run mode
    fn ensure_clean(&self, action: &str) -> Result<()> {
        if !self.dry_run && !self.scm.is_clean()? {
            return Err(SemtagError::dirty(action));
        }
        Ok(())
    }
}

/// Remote and token used for GitHub releases
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    pub remote: String,
    pub token: Option<String>,
}

impl ReleaseOptions {
    pub fn new(remote: Option<String>, token: Option<String>, config: &Config) -> Self {
        ReleaseOptions {
            remote: remote.unwrap_or_else(|| config.github.remote.clone()),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }
}

/// Arguments of the publish workflow
#[derive(Debug, Clone)]
pub struct PublishOptions {
    pub target: String,
    /// Free-text changes replacing the git history when not empty
    pub changes: Vec<String>,
    pub private: bool,
    pub release: ReleaseOptions,
    pub skip_changelog: bool,
    pub skip_release: bool,
}

/// Manual changes when given, otherwise everything since the current version
fn gather_changes<S: SourceControl>(
    ctx: &Context<'_, S>,
    ledger: &VersionLedger,
    manual: &[String],
) -> Result<Vec<Change>> {
    if manual.is_empty() {
        ctx.extractor().since(ledger, &ledger.current())
    } else {
        Ok(manual.iter().map(|text| Change::manual(text)).collect())
    }
}

/// The GitHub repository behind a remote.
///
/// Non-GitHub remotes yield `None`, or an error when `required` is set.
pub fn detect_repository<S: SourceControl>(
    ctx: &Context<'_, S>,
    remote: &str,
    required: bool,
) -> Result<Option<RepositoryId>> {
    let url = ctx.scm.remote_url(remote)?;

    match RepositoryId::from_remote_url(&url) {
        Some(repository) => Ok(Some(repository)),
        None if required => Err(SemtagError::NotGitHubRemote {
            remote: remote.to_string(),
            url,
        }),
        None => Ok(None),
    }
}

pub fn show_version<S: SourceControl>(ctx: &Context<'_, S>) -> Result<Version> {
    let current = ctx.ledger()?.current();
    display_current(&current);
    Ok(current)
}

fn display_current(current: &Version) {
    ui::display_status(&format!("Current version is: {}", current));
}

pub fn raw_version<S: SourceControl>(ctx: &Context<'_, S>) -> Result<Version> {
    let current = ctx.ledger()?.current();
    println!("{}", current);
    Ok(current)
}

pub fn list_versions<S: SourceControl>(ctx: &Context<'_, S>) -> Result<Vec<Version>> {
    let ledger = ctx.ledger()?;
    ui::display_versions(ledger.versions());
    Ok(ledger.versions().to_vec())
}

/// Apply a new version to the project, committing and tagging it
pub fn change_version<S: SourceControl>(ctx: &Context<'_, S>, target: &str) -> Result<Version> {
    let ledger = ctx.ledger()?;
    let current = ledger.current();
    display_current(&current);
    ctx.ensure_clean("change the version")?;

    let changes = if target.trim() == AUTO_TARGET {
        ctx.extractor().since(&ledger, &current)?
    } else {
        Vec::new()
    };
    let next = resolve_target(&current, target, &changes)?;

    ctx.packager().apply_version(&next, &current, true, true)?;
    ui::display_success(&format!("Version changed from {} to {}", current, next));
    Ok(next)
}

/// Changes since the current version
pub fn list_changes<S: SourceControl>(ctx: &Context<'_, S>) -> Result<Vec<Change>> {
    let ledger = ctx.ledger()?;
    let current = ledger.current();
    let changes = ctx.extractor().since(&ledger, &current)?;

    if changes.is_empty() {
        ui::display_boundary_warning(&BoundaryWarning::NoNewCommits {
            since: ledger.tag_name(&current),
        });
    } else {
        ui::display_changes(
            &format!("Found {} change(s) since release {}:", changes.len(), current),
            &changes,
        );
    }
    Ok(changes)
}

/// Changes that make up a released version
pub fn version_changes<S: SourceControl>(ctx: &Context<'_, S>, requested: &str) -> Result<Vec<Change>> {
    let ledger = ctx.ledger()?;
    let target = version::parse_tag(requested)?;
    let changes = ctx.extractor().for_version(&ledger, &target)?;

    let header = match ledger.previous(&target)? {
        Some(previous) => format!(
            "Found {} change(s) between release {} and {}:",
            changes.len(),
            previous,
            target
        ),
        None => format!(
            "Found {} change(s) between the beginning and release {}:",
            changes.len(),
            target
        ),
    };
    ui::display_changes(&header, &changes);
    Ok(changes)
}

/// Prepend a section for `next` to the changelog and commit it
pub fn write_changelog<S: SourceControl>(ctx: &Context<'_, S>, next: &Version, changes: &[Change]) -> Result<()> {
    let file = ctx.changelog_file();
    let existing = file.read()?;

    if ui::notify_step(
        ctx.dry_run,
        "Will append",
        "Appending",
        &format!(" {} entries to {} ...", changes.len(), ctx.config.changelog.path),
    ) {
        let today = Local::now().date_naive();
        file.write(&changelog::render(&existing, next, changes, today))?;
    }

    let message = ctx.config.commit_messages.changelog_message();
    if ui::notify_step(
        ctx.dry_run,
        "Will execute",
        "Executing",
        &format!(": git commit --all --message=\"{}\" ...", message),
    ) {
        ctx.scm
            .commit_all(&[ctx.config.changelog.path.as_str()], &message)?;
    }

    Ok(())
}

/// `changelog save`: record changes for the upcoming version
pub fn save_changelog<S: SourceControl>(ctx: &Context<'_, S>, target: &str, manual: &[String]) -> Result<Version> {
    let ledger = ctx.ledger()?;
    let current = ledger.current();
    let changes = gather_changes(ctx, &ledger, manual)?;
    let next = resolve_target(&current, target, &changes)?;

    ctx.ensure_clean("update the changelog")?;
    write_changelog(ctx, &next, &changes)?;

    ui::display_success(&format!("Changelog updated for version {}", next));
    Ok(next)
}

/// Rewrite the whole changelog from the released versions
pub fn regenerate_changelog<S: SourceControl>(ctx: &Context<'_, S>) -> Result<String> {
    let ledger = ctx.ledger()?;
    let document = changelog::render_full(ctx.scm, &ledger)?;

    if ui::notify_step(
        ctx.dry_run,
        "Will rewrite",
        "Rewriting",
        &format!(" {} ...", ctx.config.changelog.path),
    ) {
        ctx.changelog_file().write(&document)?;
    }

    Ok(document)
}

/// The full release workflow.
///
/// Resolve the target, update the changelog, apply and ship the version, then
/// create or update the GitHub release with the same changes.
pub fn publish<S: SourceControl, A: ReleaseApi>(
    ctx: &Context<'_, S>,
    options: &PublishOptions,
    api: &A,
) -> Result<Version> {
    let ledger = ctx.ledger()?;
    let current = ledger.current();
    let changes = gather_changes(ctx, &ledger, &options.changes)?;
    let next = resolve_target(&current, &options.target, &changes)?;
    info!(%current, %next, "publishing");

    ctx.ensure_clean("perform the publishing")?;

    let repository = if options.skip_release {
        None
    } else {
        detect_repository(ctx, &options.release.remote, false)?
    };

    if repository.is_some() && options.release.token.is_none() {
        return Err(SemtagError::MissingToken);
    }

    if !options.skip_changelog {
        write_changelog(ctx, &next, &changes)?;
    }

    ctx.packager()
        .publish(&next, &current, options.private, &options.release.remote)?;

    if let Some(repository) = repository {
        let outcome = ReleaseSynchronizer::new(api, repository, ctx.dry_run).sync(&next, &changes)?;
        ui::display_sync_outcome(&outcome);
    }

    ui::display_success(&format!("Published version {}", next));
    Ok(next)
}

fn release_synchronizer<'a, S: SourceControl, A: ReleaseApi>(
    ctx: &Context<'_, S>,
    options: &ReleaseOptions,
    api: &'a A,
) -> Result<ReleaseSynchronizer<'a, A>> {
    let repository = detect_repository(ctx, &options.remote, true)?
        .ok_or_else(|| SemtagError::config("No GitHub repository detected"))?;

    if !ctx.dry_run && options.token.is_none() {
        return Err(SemtagError::MissingToken);
    }

    Ok(ReleaseSynchronizer::new(api, repository, ctx.dry_run))
}

/// `releases sync`: converge one version's GitHub release
pub fn sync_release<S: SourceControl, A: ReleaseApi>(
    ctx: &Context<'_, S>,
    options: &ReleaseOptions,
    api: &A,
    requested: &str,
) -> Result<SyncOutcome> {
    let ledger = ctx.ledger()?;
    let target = version::parse_tag(requested)?;
    let synchronizer = release_synchronizer(ctx, options, api)?;

    let outcome = synchronizer.sync_version(ctx.scm, &ledger, &target)?;
    ui::display_sync_outcome(&outcome);
    Ok(outcome)
}

/// `releases regenerate`: converge every version's GitHub release.
///
/// Failing versions do not stop the loop; they are reported together at the end.
pub fn regenerate_releases<S: SourceControl, A: ReleaseApi>(
    ctx: &Context<'_, S>,
    options: &ReleaseOptions,
    api: &A,
) -> Result<Vec<SyncOutcome>> {
    let ledger = ctx.ledger()?;
    let synchronizer = release_synchronizer(ctx, options, api)?;

    let report = synchronizer.regenerate_all(ctx.scm, &ledger);
    for outcome in &report.synced {
        ui::display_sync_outcome(outcome);
    }
    for (version, error) in &report.failed {
        ui::display_warning(&format!("Release {} was not synchronized: {}", version, error));
    }

    report.into_result()
}
