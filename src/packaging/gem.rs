//! Version file patching for Ruby gems.

use regex::Regex;
use semver::Version;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{Result, SemtagError};

const VERSION_FILE_PATTERN: &str = "*/*/version.rb";

fn component_matchers() -> &'static [Regex; 3] {
    static MATCHERS: OnceLock<[Regex; 3]> = OnceLock::new();
    MATCHERS.get_or_init(|| {
        ["MAJOR", "MINOR", "PATCH"].map(|name| {
            Regex::new(&format!(r"(?m)^(\s*{})\s*=\s*\d+$", name)).expect("valid gem version regex")
        })
    })
}

/// Locate the single `<lib>/<gem>/version.rb` below `root`
pub fn find_version_file(root: &Path) -> Result<PathBuf> {
    let pattern = root.join(VERSION_FILE_PATTERN);
    let pattern = pattern
        .to_str()
        .ok_or_else(|| SemtagError::config("Repository path is not valid UTF-8"))?;

    let files: Vec<PathBuf> = glob::glob(pattern)
        .map_err(|e| SemtagError::config(format!("Invalid gem version pattern: {}", e)))?
        .filter_map(|entry| entry.ok())
        .collect();

    match files.as_slice() {
        [file] => Ok(file.clone()),
        [] => Err(SemtagError::config("Found no gem version file")),
        _ => Err(SemtagError::config(format!(
            "Found {} possible gem version files",
            files.len()
        ))),
    }
}

/// Rewrite the `MAJOR`, `MINOR` and `PATCH` assignments of a version file
pub fn patch_version_source(source: &str, version: &Version) -> String {
    let components = [version.major, version.minor, version.patch];

    component_matchers()
        .iter()
        .zip(components)
        .fold(source.to_string(), |text, (matcher, value)| {
            matcher
                .replace_all(&text, format!("${{1}} = {}", value).as_str())
                .into_owned()
        })
}
