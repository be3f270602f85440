//! VideoRepository wrapper that fails writes on demand
//!
//! Reads always go to the wrapped store; `update` and `delete` can be told
//! to return a backend error or report that no row matched.

use async_trait::async_trait;
use channel_service::domain::{Video, VideoTotals};
use channel_service::repository::{StoreError, StoreResult, VideoQuery, VideoRepository};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
    /// The store call itself errors
    Error,
    /// The call succeeds but matches no row
    NoMatch,
}

/// A failure that kicks in after `skip` successful calls
#[derive(Debug, Clone, Copy)]
struct Armed {
    skip: usize,
    failure: WriteFailure,
}

pub struct FlakyVideoRepository {
    inner: Arc<dyn VideoRepository>,
    update: Mutex<Option<Armed>>,
    delete: Mutex<Option<Armed>>,
}

impl FlakyVideoRepository {
    pub fn new(inner: Arc<dyn VideoRepository>) -> Self {
        Self {
            inner,
            update: Mutex::new(None),
            delete: Mutex::new(None),
        }
    }

    pub fn fail_updates(&self, failure: WriteFailure) {
        self.fail_updates_after(0, failure);
    }

    pub fn fail_updates_after(&self, skip: usize, failure: WriteFailure) {
        *self.update.lock().unwrap() = Some(Armed { skip, failure });
    }

    pub fn fail_deletes(&self, failure: WriteFailure) {
        *self.delete.lock().unwrap() = Some(Armed { skip: 0, failure });
    }

    /// Back to a healthy store
    pub fn heal(&self) {
        *self.update.lock().unwrap() = None;
        *self.delete.lock().unwrap() = None;
    }

    fn check(slot: &Mutex<Option<Armed>>) -> Option<WriteFailure> {
        let mut slot = slot.lock().unwrap();
        let armed = slot.as_mut()?;
        if armed.skip > 0 {
            armed.skip -= 1;
            return None;
        }
        Some(armed.failure)
    }
}

fn injected(failure: WriteFailure) -> StoreResult<bool> {
    match failure {
        WriteFailure::Error => Err(StoreError::Corrupt("injected write failure".into())),
        WriteFailure::NoMatch => Ok(false),
    }
}

#[async_trait]
impl VideoRepository for FlakyVideoRepository {
    async fn insert(&self, video: Video) -> StoreResult<Video> {
        self.inner.insert(video).await
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Video>> {
        self.inner.find_by_id(id).await
    }

    async fn find_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Video>> {
        self.inner.find_many(ids).await
    }

    async fn search(&self, query: &VideoQuery) -> StoreResult<Vec<Video>> {
        self.inner.search(query).await
    }

    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Video>> {
        self.inner.list_by_owner(owner).await
    }

    async fn totals_for_owner(&self, owner: Uuid) -> StoreResult<Option<VideoTotals>> {
        self.inner.totals_for_owner(owner).await
    }

    async fn update(&self, video: &Video) -> StoreResult<bool> {
        match Self::check(&self.update) {
            Some(failure) => injected(failure),
            None => self.inner.update(video).await,
        }
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        match Self::check(&self.delete) {
            Some(failure) => injected(failure),
            None => self.inner.delete(id).await,
        }
    }
}
