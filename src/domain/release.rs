use chrono::{DateTime, Utc};
use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{Result, SemtagError};

/// A GitHub repository identifier (`owner/name`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryId {
    pub owner: String,
    pub name: String,
}

fn github_remote_matcher() -> &'static Regex {
    static MATCHER: OnceLock<Regex> = OnceLock::new();
    MATCHER.get_or_init(|| {
        Regex::new(r"(?i)^(?:https://github\.com/|git@github\.com:)([^/]+)/(.+?)(?:\.git)?/?$")
            .expect("valid remote regex")
    })
}

impl RepositoryId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepositoryId {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Detect the repository from a git remote URL.
    ///
    /// Returns `None` when the remote is not hosted on GitHub.
    pub fn from_remote_url(url: &str) -> Option<Self> {
        let captures = github_remote_matcher().captures(url.trim())?;
        Some(RepositoryId::new(&captures[1], &captures[2]))
    }

    /// Web URL of a commit in this repository
    pub fn commit_url(&self, hash: &str) -> String {
        format!("https://github.com/{}/commit/{}", self, hash)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryId {
    type Err = SemtagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(RepositoryId::new(owner, name))
            }
            _ => Err(SemtagError::config(format!(
                "Invalid repository '{}': expected owner/name",
                s
            ))),
        }
    }
}

/// A release as stored by the remote API
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseRecord {
    pub id: u64,
    pub version: Option<Version>,
    pub date: Option<DateTime<Utc>>,
    pub body: String,
}

/// Wire form of a release returned by the API
#[derive(Debug, Deserialize)]
pub(crate) struct ReleaseResponse {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body: Option<String>,
}

impl From<ReleaseResponse> for ReleaseRecord {
    fn from(response: ReleaseResponse) -> Self {
        let version = response
            .name
            .as_deref()
            .and_then(|name| Version::parse(name.trim_start_matches('v')).ok());

        ReleaseRecord {
            id: response.id,
            version,
            date: response.created_at,
            body: response.body.unwrap_or_default(),
        }
    }
}

/// Request body for creating or updating a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleasePayload {
    pub tag_name: String,
    pub name: String,
    pub body: String,
}

impl ReleasePayload {
    pub fn new(version: &Version, body: impl Into<String>) -> Self {
        Self::for_tag(crate::domain::version::tag_name(version), version, body)
    }

    /// Payload for a release whose tag does not follow the `v<version>` form
    pub fn for_tag(tag: impl Into<String>, version: &Version, body: impl Into<String>) -> Self {
        ReleasePayload {
            tag_name: tag.into(),
            name: version.to_string(),
            body: body.into(),
        }
    }
}
