use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, SemtagError};

/// Represents the complete configuration for semtag.
///
/// Loaded once per invocation and passed explicitly to the components that need it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub commit_messages: CommitMessagesConfig,

    #[serde(default)]
    pub changelog: ChangelogConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub packaging: PackagingConfig,
}

fn default_versioning_message() -> String {
    "Version {version}.".to_string()
}

fn default_changelog_message() -> String {
    "Updated CHANGELOG.md.".to_string()
}

/// Commit message templates used when semtag commits on the user's behalf.
///
/// `{version}` in the versioning template is replaced with the new version.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommitMessagesConfig {
    #[serde(default = "default_versioning_message")]
    pub versioning: String,

    #[serde(default = "default_changelog_message")]
    pub changelog: String,
}

impl CommitMessagesConfig {
    /// Render the versioning commit message for a version.
    pub fn versioning_for(&self, version: &str) -> String {
        self.versioning.replace("{version}", version).trim().to_string()
    }

    /// The changelog commit message, trimmed.
    pub fn changelog_message(&self) -> String {
        self.changelog.trim().to_string()
    }
}

impl Default for CommitMessagesConfig {
    fn default() -> Self {
        CommitMessagesConfig {
            versioning: default_versioning_message(),
            changelog: default_changelog_message(),
        }
    }
}

fn default_changelog_path() -> String {
    "CHANGELOG.md".to_string()
}

/// Location of the changelog document, relative to the repository root.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangelogConfig {
    #[serde(default = "default_changelog_path")]
    pub path: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        ChangelogConfig {
            path: default_changelog_path(),
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

/// GitHub release settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitHubConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            remote: default_remote(),
            api_url: default_api_url(),
        }
    }
}

fn default_hook() -> String {
    "Semtagfile".to_string()
}

/// Settings for the plain (hook script) version updater.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PackagingConfig {
    #[serde(default = "default_hook")]
    pub hook: String,
}

impl Default for PackagingConfig {
    fn default() -> Self {
        PackagingConfig {
            hook: default_hook(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `semtag.toml` in current directory
/// 3. `.semtag.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./semtag.toml").exists() {
        fs::read_to_string("./semtag.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".semtag.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str).map_err(|e| SemtagError::config(e.to_string()))
}
