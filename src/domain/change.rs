use std::fmt;

/// Footer marker signalling a breaking change anywhere in a commit message.
pub const BREAKING_CHANGE_MARKER: &str = "BREAKING CHANGE: ";

/// Well-known change categories.
///
/// The stored type token on [`Change`] keeps whatever prefix the commit used;
/// this enum is the normalized view of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Feat,
    Fix,
    Chore,
    Docs,
    Refactor,
    Breaking,
    Other,
}

impl ChangeKind {
    /// Normalize a type token: `feat(api)!` -> `Feat`
    pub fn from_token(token: &str) -> Self {
        let base = token.trim_end_matches('!');
        let base = match base.find('(') {
            Some(index) => &base[..index],
            None => base,
        };

        match base.trim() {
            "feat" | "feature" => ChangeKind::Feat,
            "fix" => ChangeKind::Fix,
            "chore" => ChangeKind::Chore,
            "docs" => ChangeKind::Docs,
            "refactor" => ChangeKind::Refactor,
            "breaking" => ChangeKind::Breaking,
            _ => ChangeKind::Other,
        }
    }
}

/// A classified unit of history.
///
/// `hash` is empty for changes supplied by hand on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub hash: String,
    pub r#type: String,
    pub message: String,
    pub is_breaking_change: bool,
}

impl Change {
    /// Classify a commit subject.
    ///
    /// The subject is split on the first `:` into a type token and a message. Without
    /// a `:` the whole subject is the message and the type defaults to `feat`, or `fix`
    /// when the subject contains "fix". `body` is only consulted for the breaking
    /// change footer.
    ///
    /// # Example
    /// ```ignore
    /// let change = Change::classify("abc1234", "feat(api)!: drop v1 routes", None);
    /// assert_eq!(change.r#type, "feat(api)!");
    /// assert!(change.is_breaking_change);
    /// ```
    pub fn classify(hash: &str, subject: &str, body: Option<&str>) -> Self {
        let (token, message) = match subject.split_once(':') {
            Some((token, message)) => (token, message),
            None if subject.contains("fix") => ("fix", subject),
            None => ("feat", subject),
        };

        let r#type = token.trim().to_lowercase();
        let message = message.trim().to_string();

        let is_breaking_change = r#type.ends_with('!')
            || ChangeKind::from_token(&r#type) == ChangeKind::Breaking
            || subject.contains(BREAKING_CHANGE_MARKER)
            || body.is_some_and(|b| b.contains(BREAKING_CHANGE_MARKER));

        Change {
            hash: hash.trim().to_lowercase(),
            r#type,
            message,
            is_breaking_change,
        }
    }

    /// Classify a free-form change supplied without a commit.
    ///
    /// The first line is treated as the subject and the rest as the body.
    pub fn manual(text: &str) -> Self {
        let (subject, body) = match text.split_once('\n') {
            Some((subject, body)) => (subject, Some(body)),
            None => (text, None),
        };
        Change::classify("", subject, body)
    }

    /// The normalized category of this change.
    pub fn kind(&self) -> ChangeKind {
        ChangeKind::from_token(&self.r#type)
    }

    /// Short hash suitable for display; empty for manual changes.
    pub fn short_hash(&self) -> &str {
        if self.hash.len() > 7 {
            &self.hash[..7]
        } else {
            &self.hash
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.r#type, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_conventional() {
        let change = Change::classify("abc1234", "fix: null check", None);
        assert_eq!(change.r#type, "fix");
        assert_eq!(change.message, "null check");
        assert_eq!(change.kind(), ChangeKind::Fix);
        assert!(!change.is_breaking_change);
    }

    #[test]
    fn test_classify_normalizes_case_and_whitespace() {
        let change = Change::classify("ABC1234", "  FEAT :   add cache  ", None);
        assert_eq!(change.hash, "abc1234");
        assert_eq!(change.r#type, "feat");
        assert_eq!(change.message, "add cache");
    }

    #[test]
    fn test_classify_splits_on_first_colon_only() {
        let change = Change::classify("", "docs: explain a: b syntax", None);
        assert_eq!(change.r#type, "docs");
        assert_eq!(change.message, "explain a: b syntax");
    }

    #[test]
    fn test_classify_without_colon_defaults_to_feat() {
        let change = Change::classify("", "Add a shiny button", None);
        assert_eq!(change.r#type, "feat");
        assert_eq!(change.message, "Add a shiny button");
    }

    #[test]
    fn test_classify_without_colon_mentioning_fix() {
        let change = Change::classify("", "hotfix for the login page", None);
        assert_eq!(change.r#type, "fix");
    }

    #[test]
    fn test_classify_fix_wins_over_feature_cues() {
        let change = Change::classify("", "add feature flag and fix typo", None);
        assert_eq!(change.r#type, "fix");
    }

    #[test]
    fn test_classify_fix_check_is_case_sensitive() {
        let change = Change::classify("", "Fixed things", None);
        assert_eq!(change.r#type, "feat");
    }

    #[test]
    fn test_classify_bang_marks_breaking_and_keeps_token() {
        let change = Change::classify("", "feat!: remove legacy API", None);
        assert_eq!(change.r#type, "feat!");
        assert_eq!(change.kind(), ChangeKind::Feat);
        assert!(change.is_breaking_change);
    }

    #[test]
    fn test_classify_scoped_type() {
        let change = Change::classify("", "refactor(core)!: split engine", None);
        assert_eq!(change.r#type, "refactor(core)!");
        assert_eq!(change.kind(), ChangeKind::Refactor);
        assert!(change.is_breaking_change);
    }

    #[test]
    fn test_classify_footer_in_body() {
        let change = Change::classify(
            "",
            "fix: rename field",
            Some("\nBREAKING CHANGE: field renamed from X to Y"),
        );
        assert_eq!(change.r#type, "fix");
        assert!(change.is_breaking_change);
    }

    #[test]
    fn test_breaking_type_token() {
        let change = Change::classify("", "breaking: new config layout", None);
        assert_eq!(change.kind(), ChangeKind::Breaking);
        assert!(change.is_breaking_change);
    }

    #[test]
    fn test_manual_change_is_classified() {
        let change = Change::manual("chore: bump deps");
        assert!(change.hash.is_empty());
        assert_eq!(change.kind(), ChangeKind::Chore);

        let change = Change::manual("fix: rename\n\nBREAKING CHANGE: renamed");
        assert_eq!(change.message, "rename");
        assert!(change.is_breaking_change);
    }

    #[test]
    fn test_unknown_type_is_other() {
        let change = Change::classify("", "perf: faster parsing", None);
        assert_eq!(change.kind(), ChangeKind::Other);
        assert_eq!(change.to_string(), "perf: faster parsing");
    }

    #[test]
    fn test_empty_subject_does_not_panic() {
        let change = Change::classify("", "", None);
        assert_eq!(change.r#type, "feat");
        assert_eq!(change.message, "");
    }
}
