//! Bump policy: decides the next version from classified changes

pub mod bump_policy;

pub use bump_policy::{resolve_target, BumpDecision, BumpPolicy, AUTO_TARGET};
