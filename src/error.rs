use semver::Version;
use thiserror::Error;

/// Unified error type for semtag operations
#[derive(Error, Debug)]
pub enum SemtagError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot parse '{input}' as a version: {reason}")]
    InvalidVersion { input: String, reason: String },

    #[error("Version {0} is not a known release")]
    UnknownVersion(Version),

    #[error("A GitHub API token is required to publish a GitHub release")]
    MissingToken,

    #[error("The git remote '{remote}' ({url}) is not a GitHub repository")]
    NotGitHubRemote { remote: String, url: String },

    #[error("Cannot {action} as the working directory is not clean. Please commit all local changes and try again")]
    DirtyWorkingTree { action: String },

    #[error("Cannot detect the new version: no changes found")]
    NoChanges,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: [HTTP {status}] {body}")]
    Http { status: u16, body: String },

    #[error("GitHub API authentication failed")]
    Authentication,

    #[error("Malformed data: {0}")]
    MalformedResponse(String),

    #[error("{program} failed with code {code}: {stderr}")]
    Process {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("Failed to synchronize {} release(s): {}", .failed.len(), describe_failures(.failed))]
    PartialSync { failed: Vec<(Version, String)> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_failures(failed: &[(Version, String)]) -> String {
    failed
        .iter()
        .map(|(version, reason)| format!("{} ({})", version, reason))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience type alias for Results in semtag
pub type Result<T> = std::result::Result<T, SemtagError>;

impl SemtagError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        SemtagError::Config(msg.into())
    }

    /// Create an invalid version error echoing the offending input
    pub fn invalid_version(input: impl Into<String>, reason: impl Into<String>) -> Self {
        SemtagError::InvalidVersion {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a dirty working tree error for the given action
    pub fn dirty(action: impl Into<String>) -> Self {
        SemtagError::DirtyWorkingTree {
            action: action.into(),
        }
    }

    /// Create a malformed data error with context
    pub fn malformed(msg: impl Into<String>) -> Self {
        SemtagError::MalformedResponse(msg.into())
    }
}
