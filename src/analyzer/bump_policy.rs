use semver::Version;
use std::fmt;
use tracing::debug;

use crate::domain::version::{self, BumpLevel};
use crate::domain::{Change, ChangeKind};
use crate::error::{Result, SemtagError};

/// Target token that asks the policy to choose the bump level
pub const AUTO_TARGET: &str = "auto";

/// Outcome of the bump policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpDecision {
    Patch,
    Minor,
    Major,
    Explicit(Version),
}

impl BumpDecision {
    /// The version this decision produces from `current`
    pub fn apply(&self, current: &Version) -> Version {
        match self {
            BumpDecision::Patch => version::bump(current, BumpLevel::Patch),
            BumpDecision::Minor => version::bump(current, BumpLevel::Minor),
            BumpDecision::Major => version::bump(current, BumpLevel::Major),
            BumpDecision::Explicit(target) => target.clone(),
        }
    }
}

impl From<BumpLevel> for BumpDecision {
    fn from(level: BumpLevel) -> Self {
        match level {
            BumpLevel::Major => BumpDecision::Major,
            BumpLevel::Minor => BumpDecision::Minor,
            BumpLevel::Patch => BumpDecision::Patch,
        }
    }
}

impl fmt::Display for BumpDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpDecision::Patch => f.write_str("patch"),
            BumpDecision::Minor => f.write_str("minor"),
            BumpDecision::Major => f.write_str("major"),
            BumpDecision::Explicit(target) => write!(f, "explicit {}", target),
        }
    }
}

/// Analyzes changes to determine the version bump
#[derive(Debug, Default, Clone, Copy)]
pub struct BumpPolicy;

impl BumpPolicy {
    pub fn new() -> Self {
        BumpPolicy
    }

    /// Decide the bump for a set of changes, scanned oldest first.
    ///
    /// Starts at patch; a feature raises it to minor and any breaking change
    /// returns major immediately. An empty set is refused.
    pub fn decide(&self, changes: &[Change]) -> Result<BumpDecision> {
        if changes.is_empty() {
            return Err(SemtagError::NoChanges);
        }

        let mut decision = BumpDecision::Patch;

        for change in changes {
            if change.is_breaking_change {
                debug!(change = %change, "breaking change found");
                return Ok(BumpDecision::Major);
            }

            if change.kind() == ChangeKind::Feat {
                decision = BumpDecision::Minor;
            }
        }

        Ok(decision)
    }
}

/// Resolve a publish target to the next version.
///
/// `auto` runs the policy over `changes`; anything else is an explicit request
/// (`patch`, `minor`, `major` or a literal version) that bypasses it.
pub fn resolve_target(current: &Version, request: &str, changes: &[Change]) -> Result<Version> {
    let request = request.trim();

    let decision = if request == AUTO_TARGET {
        BumpPolicy::new().decide(changes)?
    } else {
        match BumpLevel::from_token(request) {
            Some(level) => BumpDecision::from(level),
            None => BumpDecision::Explicit(version::resolve_explicit(current, request)?),
        }
    };

    debug!(%decision, %current, "resolved target");
    Ok(decision.apply(current))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(subjects: &[&str]) -> Vec<Change> {
        subjects
            .iter()
            .enumerate()
            .map(|(i, subject)| Change::classify(&format!("{:07x}", i), subject, None))
            .collect()
    }

    #[test]
    fn test_decide_patch() {
        let policy = BumpPolicy::new();
        assert_eq!(
            policy.decide(&changes(&["fix: bug fix"])).unwrap(),
            BumpDecision::Patch
        );
    }

    #[test]
    fn test_decide_minor() {
        let policy = BumpPolicy::new();
        assert_eq!(
            policy.decide(&changes(&["feat: new feature"])).unwrap(),
            BumpDecision::Minor
        );
    }

    #[test]
    fn test_decide_major_from_bang() {
        let policy = BumpPolicy::new();
        assert_eq!(
            policy.decide(&changes(&["feat!: drop legacy api"])).unwrap(),
            BumpDecision::Major
        );
    }

    #[test]
    fn test_decide_major_regardless_of_position() {
        let policy = BumpPolicy::new();
        let mut list = changes(&["fix: one", "feat: two", "docs: three"]);
        list.push(Change::classify(
            "abcdef0",
            "refactor: rename field",
            Some("BREAKING CHANGE: field renamed"),
        ));
        assert_eq!(policy.decide(&list).unwrap(), BumpDecision::Major);

        list.reverse();
        assert_eq!(policy.decide(&list).unwrap(), BumpDecision::Major);
    }

    #[test]
    fn test_decide_breaking_marker_in_subject() {
        let policy = BumpPolicy::new();
        assert_eq!(
            policy
                .decide(&changes(&["chore: BREAKING CHANGE: new layout"]))
                .unwrap(),
            BumpDecision::Major
        );
    }

    #[test]
    fn test_only_feat_upgrades() {
        let policy = BumpPolicy::new();
        let list = changes(&["docs: readme", "chore: deps", "refactor: cleanup", "perf: faster"]);
        assert_eq!(policy.decide(&list).unwrap(), BumpDecision::Patch);
    }

    #[test]
    fn test_scoped_feature_is_minor() {
        let policy = BumpPolicy::new();
        assert_eq!(
            policy.decide(&changes(&["feat(auth): add oauth support"])).unwrap(),
            BumpDecision::Minor
        );
    }

    #[test]
    fn test_decide_empty_is_refused() {
        let policy = BumpPolicy::new();
        assert!(matches!(policy.decide(&[]), Err(SemtagError::NoChanges)));
    }

    #[test]
    fn test_apply_decisions() {
        let current = Version::new(1, 2, 3);
        assert_eq!(BumpDecision::Patch.apply(&current), Version::new(1, 2, 4));
        assert_eq!(BumpDecision::Minor.apply(&current), Version::new(1, 3, 0));
        assert_eq!(BumpDecision::Major.apply(&current), Version::new(2, 0, 0));
        assert_eq!(
            BumpDecision::Explicit(Version::new(5, 0, 0)).apply(&current),
            Version::new(5, 0, 0)
        );
    }

    #[test]
    fn test_resolve_auto_target() {
        let current = Version::new(1, 1, 0);
        let list = changes(&["fix: null check", "feat: add cache"]);
        assert_eq!(
            resolve_target(&current, "auto", &list).unwrap(),
            Version::new(1, 2, 0)
        );
    }

    #[test]
    fn test_resolve_auto_without_changes_fails() {
        let current = Version::new(1, 1, 0);
        assert!(matches!(
            resolve_target(&current, "auto", &[]),
            Err(SemtagError::NoChanges)
        ));
    }

    #[test]
    fn test_resolve_explicit_bypasses_policy() {
        let current = Version::new(1, 1, 0);
        assert_eq!(
            resolve_target(&current, "major", &[]).unwrap(),
            Version::new(2, 0, 0)
        );
        assert_eq!(
            resolve_target(&current, "v3.4.5", &[]).unwrap(),
            Version::new(3, 4, 5)
        );
    }

    #[test]
    fn test_resolve_invalid_target() {
        let current = Version::new(1, 1, 0);
        let err = resolve_target(&current, "bigger", &[]).unwrap_err();
        assert!(matches!(err, SemtagError::InvalidVersion { ref input, .. } if input == "bigger"));
    }
}
