//! Semantic versioning, changelogs and GitHub releases derived from git history.
//!
//! The release engine is split into a [ledger] of released versions, an
//! [extractor] turning commit ranges into classified changes, the bump policy in
//! [analyzer], the [changelog] renderer and the [github] release synchronizer.
//! [cli::orchestration] wires them together for each command.

pub mod analyzer;
pub mod boundary;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod git;
pub mod github;
pub mod ledger;
pub mod packaging;
pub mod ui;

pub use error::{Result, SemtagError};
