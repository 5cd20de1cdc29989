//! Semantic version helpers on top of the `semver` crate.

use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;
use std::sync::OnceLock;

use crate::error::{Result, SemtagError};

/// Version bump level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpLevel {
    Major,
    Minor,
    Patch,
}

impl BumpLevel {
    /// Parse one of the literal tokens `patch`, `minor` or `major`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "major" => Some(BumpLevel::Major),
            "minor" => Some(BumpLevel::Minor),
            "patch" => Some(BumpLevel::Patch),
            _ => None,
        }
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BumpLevel::Major => "major",
            BumpLevel::Minor => "minor",
            BumpLevel::Patch => "patch",
        };
        f.write_str(name)
    }
}

fn release_tag_matcher() -> &'static Regex {
    static MATCHER: OnceLock<Regex> = OnceLock::new();
    MATCHER.get_or_init(|| Regex::new(r"^v?\d+\.\d+\.\d+").expect("valid release tag regex"))
}

/// The sentinel version of an untagged repository.
pub fn zero() -> Version {
    Version::new(0, 0, 0)
}

/// Whether the version is the `0.0.0` "beginning of history" sentinel.
pub fn is_zero(version: &Version) -> bool {
    *version == zero()
}

/// Tag name for a version (e.g. `1.2.3` -> `v1.2.3`)
pub fn tag_name(version: &Version) -> String {
    format!("v{}", version)
}

/// Whether a tag name looks like a release tag at all.
///
/// Release tags are an optional `v` followed by a dotted numeric triple; anything
/// after the triple is left for the parser to accept or reject.
pub fn is_release_tag(tag: &str) -> bool {
    release_tag_matcher().is_match(tag)
}

/// Parses a version from a release tag.
///
/// # Example
/// ```ignore
/// assert_eq!(parse_tag("v1.2.3").unwrap(), Version::new(1, 2, 3));
/// assert!(parse_tag("v1.2.3.4").is_err());
/// ```
pub fn parse_tag(tag: &str) -> Result<Version> {
    let raw = tag.strip_prefix('v').unwrap_or(tag);
    Version::parse(raw).map_err(|e| SemtagError::invalid_version(tag, e.to_string()))
}

/// Bumps a version according to the specified level.
///
/// - **Major**: major += 1, minor = 0, patch = 0
/// - **Minor**: minor += 1, patch = 0
/// - **Patch**: patch += 1
///
/// Pre-release and build identifiers are always cleared.
pub fn bump(version: &Version, level: BumpLevel) -> Version {
    let mut next = match level {
        BumpLevel::Major => Version::new(version.major + 1, 0, 0),
        BumpLevel::Minor => Version::new(version.major, version.minor + 1, 0),
        BumpLevel::Patch => Version::new(version.major, version.minor, version.patch + 1),
    };
    next.pre = Prerelease::EMPTY;
    next.build = BuildMetadata::EMPTY;
    next
}

/// Resolves an explicit version request against the current version.
///
/// The request is either one of the tokens `patch`/`minor`/`major` or a literal
/// version (an optional leading `v` is accepted).
pub fn resolve_explicit(current: &Version, request: &str) -> Result<Version> {
    let request = request.trim();

    if let Some(level) = BumpLevel::from_token(request) {
        return Ok(bump(current, level));
    }

    parse_tag(request).map_err(|e| match e {
        SemtagError::InvalidVersion { reason, .. } => SemtagError::invalid_version(request, reason),
        other => other,
    })
}
