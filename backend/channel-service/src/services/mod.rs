/// Business logic layer for Channel Service
pub mod comments;
pub mod dashboard;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod toggle;
pub mod tweets;
pub mod videos;

use std::sync::Arc;

use crate::config::PaginationConfig;
use crate::repository::Repositories;
use crate::storage::AssetStore;

pub use comments::CommentService;
pub use dashboard::DashboardService;
pub use likes::LikeService;
pub use playlists::PlaylistService;
pub use subscriptions::SubscriptionService;
pub use toggle::{ToggleEngine, Toggled};
pub use tweets::TweetService;
pub use videos::{NewVideo, VideoDetailsUpdate, VideoService};

/// Every service, shared across HTTP workers
#[derive(Clone)]
pub struct Services {
    pub videos: Arc<VideoService>,
    pub comments: Arc<CommentService>,
    pub likes: Arc<LikeService>,
    pub subscriptions: Arc<SubscriptionService>,
    pub tweets: Arc<TweetService>,
    pub playlists: Arc<PlaylistService>,
    pub dashboard: Arc<DashboardService>,
    pub pagination: PaginationConfig,
}

impl Services {
    pub fn new(repos: Repositories, assets: Arc<dyn AssetStore>, pagination: PaginationConfig) -> Self {
        Self {
            videos: Arc::new(VideoService::new(repos.clone(), assets)),
            comments: Arc::new(CommentService::new(repos.clone())),
            likes: Arc::new(LikeService::new(repos.clone())),
            subscriptions: Arc::new(SubscriptionService::new(repos.clone())),
            tweets: Arc::new(TweetService::new(repos.clone())),
            playlists: Arc::new(PlaylistService::new(repos.clone())),
            dashboard: Arc::new(DashboardService::new(repos)),
            pagination,
        }
    }
}
