//! Shared harness for channel-service integration tests
//!
//! Every test gets its own in-memory repositories and a recording asset
//! store, so tests never share state.
#![allow(dead_code)]

pub mod fixtures;
pub mod flaky_video_repo;
pub mod mock_asset_store;

use channel_service::config::PaginationConfig;
use channel_service::{Repositories, Services};
use std::sync::Arc;

use flaky_video_repo::FlakyVideoRepository;
use mock_asset_store::RecordingAssetStore;

pub struct TestContext {
    pub repos: Repositories,
    pub assets: Arc<RecordingAssetStore>,
    pub services: Services,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_pagination(PaginationConfig::default())
    }

    pub fn with_pagination(pagination: PaginationConfig) -> Self {
        let repos = Repositories::memory();
        let assets = Arc::new(RecordingAssetStore::new());
        let services = Services::new(repos.clone(), assets.clone(), pagination);
        Self {
            repos,
            assets,
            services,
        }
    }

    /// Services over repositories whose video writes can be made to fail
    pub fn with_flaky_videos() -> (Self, Arc<FlakyVideoRepository>) {
        let mut repos = Repositories::memory();
        let videos = Arc::new(FlakyVideoRepository::new(repos.videos.clone()));
        repos.videos = videos.clone();

        let assets = Arc::new(RecordingAssetStore::new());
        let services = Services::new(repos.clone(), assets.clone(), PaginationConfig::default());
        let ctx = Self {
            repos,
            assets,
            services,
        };
        (ctx, videos)
    }
}
