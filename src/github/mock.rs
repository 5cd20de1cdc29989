use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use crate::domain::{ReleasePayload, ReleaseRecord, RepositoryId};
use crate::error::{Result, SemtagError};
use crate::github::ReleaseApi;

/// Call recorded by [MockReleaseApi]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Find { tag: String },
    Create { payload: ReleasePayload },
    Update { id: u64, payload: ReleasePayload },
}

impl ApiCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, ApiCall::Find { .. })
    }
}

/// In-memory release storage for testing without network access
pub struct MockReleaseApi {
    releases: RefCell<HashMap<String, ReleaseRecord>>,
    calls: RefCell<Vec<ApiCall>>,
    failing: HashSet<String>,
    next_id: Cell<u64>,
}

impl MockReleaseApi {
    pub fn new() -> Self {
        MockReleaseApi {
            releases: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
            failing: HashSet::new(),
            next_id: Cell::new(1),
        }
    }

    /// Make every call for `tag` fail with a server error
    pub fn fail_on(mut self, tag: impl Into<String>) -> Self {
        self.failing.insert(tag.into());
        self
    }

    /// Calls performed so far
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.borrow().clone()
    }

    /// Stored release for a tag
    pub fn release(&self, tag: &str) -> Option<ReleaseRecord> {
        self.releases.borrow().get(tag).cloned()
    }

    pub fn release_count(&self) -> usize {
        self.releases.borrow().len()
    }

    fn check_failure(&self, tag: &str) -> Result<()> {
        if self.failing.contains(tag) {
            return Err(SemtagError::Http {
                status: 500,
                body: format!("simulated failure for {}", tag),
            });
        }
        Ok(())
    }

    fn store(&self, id: u64, payload: &ReleasePayload) -> ReleaseRecord {
        let record = ReleaseRecord {
            id,
            version: semver::Version::parse(&payload.name).ok(),
            date: None,
            body: payload.body.clone(),
        };
        self.releases
            .borrow_mut()
            .insert(payload.tag_name.clone(), record.clone());
        record
    }
}

impl Default for MockReleaseApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleaseApi for MockReleaseApi {
    fn find_release(&self, _repository: &RepositoryId, tag: &str) -> Result<Option<ReleaseRecord>> {
        self.calls.borrow_mut().push(ApiCall::Find {
            tag: tag.to_string(),
        });
        self.check_failure(tag)?;
        Ok(self.release(tag))
    }

    fn create_release(
        &self,
        _repository: &RepositoryId,
        payload: &ReleasePayload,
    ) -> Result<ReleaseRecord> {
        self.calls.borrow_mut().push(ApiCall::Create {
            payload: payload.clone(),
        });
        self.check_failure(&payload.tag_name)?;

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Ok(self.store(id, payload))
    }

    fn update_release(
        &self,
        _repository: &RepositoryId,
        id: u64,
        payload: &ReleasePayload,
    ) -> Result<ReleaseRecord> {
        self.calls.borrow_mut().push(ApiCall::Update {
            id,
            payload: payload.clone(),
        });
        self.check_failure(&payload.tag_name)?;
        Ok(self.store(id, payload))
    }
}
