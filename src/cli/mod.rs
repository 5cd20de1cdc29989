//! Command-line interface
//!
//! `Args` is the clap command tree; [run] loads the configuration, opens the
//! repository and hands off to [orchestration].

pub mod orchestration;

use clap::{Parser, Subcommand};
use std::env;

use crate::config;
use crate::error::{Result, SemtagError};
use crate::git::Git2Repository;
use crate::github::GitHubClient;
use orchestration::{Context, PublishOptions, ReleaseOptions};

#[derive(Parser, Debug)]
#[command(
    name = "semtag",
    version,
    about = "Semantic versioning, changelogs and GitHub releases from git history"
)]
pub struct Args {
    #[arg(short = 'n', long, global = true, help = "Show what would happen without changing anything")]
    pub dry_run: bool,

    #[arg(short, long, global = true, help = "Custom configuration file path")]
    pub config: Option<String>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show or set the current version
    #[command(visible_alias = "v", args_conflicts_with_subcommands = true)]
    Version {
        /// patch, minor, major, auto or an explicit version
        target: Option<String>,

        #[command(subcommand)]
        command: Option<VersionCommand>,
    },

    /// Manage changelog entries
    #[command(visible_alias = "c")]
    Changelog {
        #[command(subcommand)]
        command: Option<ChangelogCommand>,
    },

    /// Publish a new version
    #[command(visible_alias = "p")]
    Publish {
        /// patch, minor, major, auto or an explicit version
        target: String,

        /// Changes to record instead of the git history
        changes: Vec<String>,

        #[arg(short, long, help = "Use private scope when possible")]
        private: bool,

        #[command(flatten)]
        github: GitHubArgs,

        #[arg(long, help = "Do not update the changelog")]
        skip_changelog: bool,

        #[arg(short = 'R', long, help = "Do not update GitHub releases")]
        skip_release: bool,
    },

    /// Manage GitHub releases
    #[command(visible_alias = "r")]
    Releases {
        #[command(flatten)]
        github: GitHubArgs,

        #[command(subcommand)]
        command: ReleasesCommand,
    },
}

#[derive(clap::Args, Debug)]
pub struct GitHubArgs {
    #[arg(short, long, help = "The git remote name [default: from configuration]")]
    pub remote: Option<String>,

    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true, help = "The GitHub API token")]
    pub token: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum VersionCommand {
    /// Show all versions
    #[command(visible_aliases = ["l", "all"])]
    List,
    /// Only show the raw version number
    Raw,
}

#[derive(Subcommand, Debug)]
pub enum ChangelogCommand {
    /// List changes since the last version
    #[command(visible_alias = "l")]
    List,
    /// List changes of a specific version
    Version { version: String },
    /// Insert changes since the last version in the changelog
    #[command(visible_alias = "s")]
    Save {
        /// patch, minor, major, auto or an explicit version
        target: String,
        changes: Vec<String>,
    },
    /// Rewrite the whole changelog from the released versions
    Regenerate,
}

#[derive(Subcommand, Debug)]
pub enum ReleasesCommand {
    /// Create or update the GitHub release of a version
    Sync { version: String },
    /// Create or update the GitHub releases of every version
    Regenerate,
}

/// Execute the parsed command line
pub fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref())?;

    let cwd = env::current_dir()?;
    let scm = Git2Repository::open(&cwd)?;
    let root = scm
        .workdir()
        .map(|dir| dir.to_path_buf())
        .ok_or_else(|| SemtagError::config("Bare repositories are not supported"))?;

    let ctx = Context::new(&scm, &config, root, args.dry_run);

    match args.command {
        Command::Version { target, command } => match (command, target) {
            (Some(VersionCommand::List), _) => orchestration::list_versions(&ctx).map(|_| ()),
            (Some(VersionCommand::Raw), _) => orchestration::raw_version(&ctx).map(|_| ()),
            (None, Some(target)) => orchestration::change_version(&ctx, &target).map(|_| ()),
            (None, None) => orchestration::show_version(&ctx).map(|_| ()),
        },
        Command::Changelog { command } => match command.unwrap_or(ChangelogCommand::List) {
            ChangelogCommand::List => orchestration::list_changes(&ctx).map(|_| ()),
            ChangelogCommand::Version { version } => {
                orchestration::version_changes(&ctx, &version).map(|_| ())
            }
            ChangelogCommand::Save { target, changes } => {
                orchestration::save_changelog(&ctx, &target, &changes).map(|_| ())
            }
            ChangelogCommand::Regenerate => orchestration::regenerate_changelog(&ctx).map(|_| ()),
        },
        Command::Publish {
            target,
            changes,
            private,
            github,
            skip_changelog,
            skip_release,
        } => {
            let client = GitHubClient::from_config(&config.github, github.token.clone())?;
            let options = PublishOptions {
                target,
                changes,
                private,
                release: ReleaseOptions::new(github.remote, github.token, &config),
                skip_changelog,
                skip_release,
            };
            orchestration::publish(&ctx, &options, &client).map(|_| ())
        }
        Command::Releases { github, command } => {
            let client = GitHubClient::from_config(&config.github, github.token.clone())?;
            let options = ReleaseOptions::new(github.remote, github.token, &config);

            match command {
                ReleasesCommand::Sync { version } => {
                    orchestration::sync_release(&ctx, &options, &client, &version).map(|_| ())
                }
                ReleasesCommand::Regenerate => {
                    orchestration::regenerate_releases(&ctx, &options, &client).map(|_| ())
                }
            }
        }
    }
}
