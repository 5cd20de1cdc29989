//! Pure formatting functions for UI output.
//!
//! Everything here returns a `String` so the layout can be tested; the parent
//! module does the printing.

use console::style;
use semver::Version;

use crate::domain::Change;
use crate::github::{SyncAction, SyncOutcome};
use crate::packaging::ProcessOutput;

/// One change as a list item: `   * type: message (hash)`
pub fn format_change(change: &Change) -> String {
    let hash = if change.hash.is_empty() {
        String::new()
    } else {
        format!(" ({})", style(change.short_hash()).cyan())
    };

    format!(
        "   * {}: {}{}",
        style(&change.r#type).dim(),
        style(&change.message).bold(),
        hash
    )
}

/// One version as a list item
pub fn format_version_item(version: &Version) -> String {
    format!("   * {}", style(version).bold())
}

/// Announce a step, worded as future tense in dry-run mode.
///
/// `format_step(true, "Will push", "Pushing", " tags ...")` gives "Will push tags ...".
pub fn format_step(dry_run: bool, will: &str, doing: &str, message: &str) -> String {
    if dry_run {
        format!("{} {}{}", style("[dry-run]").magenta(), style(will).yellow(), message)
    } else {
        format!("{}{}", style(doing).green(), message)
    }
}

/// Summary line for a release synchronization
pub fn format_sync_outcome(outcome: &SyncOutcome) -> String {
    let verb = match (outcome.action, outcome.performed) {
        (SyncAction::Create, true) => "Created",
        (SyncAction::Update { .. }, true) => "Updated",
        (SyncAction::Create, false) => "Would create",
        (SyncAction::Update { .. }, false) => "Would update",
    };

    format!(
        "{} GitHub release {}",
        verb,
        style(&outcome.tag).bold()
    )
}

/// Captured program output, indented and dimmed, blank lines dropped
pub fn format_process_output(output: &ProcessOutput) -> Vec<String> {
    output
        .stdout
        .lines()
        .chain(output.stderr.lines())
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("   {}", style(line).dim()))
        .collect()
}
