//! Domain logic - pure business rules independent of git and HTTP

pub mod change;
pub mod release;
pub mod version;

pub use change::{Change, ChangeKind};
pub use release::{ReleasePayload, ReleaseRecord, RepositoryId};
pub use version::BumpLevel;
