//! GitHub releases
//!
//! [ReleaseApi] is the remote collaborator. [client::GitHubClient] talks to the
//! REST API and [mock::MockReleaseApi] keeps releases in memory for tests.
//! [sync::ReleaseSynchronizer] converges local history with the remote records.

pub mod client;
pub mod mock;
pub mod sync;

pub use client::GitHubClient;
pub use mock::MockReleaseApi;
pub use sync::{BulkSyncReport, ReleaseSynchronizer, SyncAction, SyncOutcome};

use crate::domain::{ReleasePayload, ReleaseRecord, RepositoryId};
use crate::error::Result;

/// Remote release storage, at most one record per tag
pub trait ReleaseApi {
    /// Look up the release of a tag; `None` when it does not exist
    fn find_release(&self, repository: &RepositoryId, tag: &str) -> Result<Option<ReleaseRecord>>;

    /// Create a new release
    fn create_release(
        &self,
        repository: &RepositoryId,
        payload: &ReleasePayload,
    ) -> Result<ReleaseRecord>;

    /// Replace an existing release
    fn update_release(
        &self,
        repository: &RepositoryId,
        id: u64,
        payload: &ReleasePayload,
    ) -> Result<ReleaseRecord>;
}
