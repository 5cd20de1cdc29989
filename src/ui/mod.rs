//! User interface module - console output.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Printing to stdout/stderr

use console::style;
use semver::Version;

use crate::boundary::BoundaryWarning;
use crate::domain::Change;
use crate::github::SyncOutcome;
use crate::packaging::ProcessOutput;

pub mod formatter;

pub use formatter::{
    format_change, format_process_output, format_step, format_sync_outcome, format_version_item,
};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow().bold(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    display_warning(&warning.to_string());
}

/// Announce a step and tell the caller whether to perform it.
///
/// Returns `false` in dry-run mode, where the step is only described.
pub fn notify_step(dry_run: bool, will: &str, doing: &str, message: &str) -> bool {
    println!("{} {}", style("⚙").magenta(), format_step(dry_run, will, doing, message));
    !dry_run
}

/// Echo what an external program printed
pub fn display_process_output(output: &ProcessOutput) {
    for line in format_process_output(output) {
        println!("{}", line);
    }
}

/// Print a header followed by one line per change
pub fn display_changes(header: &str, changes: &[Change]) {
    display_status(header);
    for change in changes {
        println!("{}", format_change(change));
    }
}

pub fn display_versions(versions: &[Version]) {
    display_status(&format!("Found {} version(s):", versions.len()));
    for version in versions {
        println!("{}", format_version_item(version));
    }
}

/// Print a synchronization result; dry-run results include the composed body.
pub fn display_sync_outcome(outcome: &SyncOutcome) {
    if outcome.performed {
        display_success(&format_sync_outcome(outcome));
        return;
    }

    display_status(&format_sync_outcome(outcome));
    if outcome.body.is_empty() {
        println!("   (empty body)");
    } else {
        for line in outcome.body.lines() {
            println!("   {}", style(line).dim());
        }
    }
}
