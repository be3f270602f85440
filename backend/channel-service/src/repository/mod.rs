//! Entity store.
//!
//! One trait per entity plus a generic [`RelationRepository`] for the
//! binary-state relations. Two backends implement every trait: an in-process
//! [`memory::MemoryStore`] and [`postgres::PgStore`]. Both enforce the
//! relation uniqueness keys and the same delete cascades:
//!
//! - video: its comments, likes on the video and on those comments, and its
//!   playlist memberships
//! - comment / tweet: likes on it

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    Comment, Like, Playlist, Relation, Subscription, Tweet, User, Video, VideoTotals,
};
use crate::pipeline::{Page, SortSpec, TextSearch};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness key is already taken
    #[error("duplicate key: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Backend(#[from] sqlx::Error),

    /// A stored row could not be mapped back to an entity
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Matching, ordering and window of the video feed
#[derive(Debug, Clone)]
pub struct VideoQuery {
    pub search: TextSearch,
    pub owner: Option<Uuid>,
    pub sort: SortSpec,
    pub page: Page,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> StoreResult<User>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Users among `ids`; unknown ids are skipped
    async fn find_many(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn insert(&self, video: Video) -> StoreResult<Video>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Video>>;
    async fn find_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Video>>;

    /// Feed search. Only videos whose owner is a known user are returned.
    async fn search(&self, query: &VideoQuery) -> StoreResult<Vec<Video>>;

    /// Every video of `owner`, newest first
    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Video>>;

    /// Count and summed views of `owner`'s videos; `None` when there are none
    async fn totals_for_owner(&self, owner: Uuid) -> StoreResult<Option<VideoTotals>>;

    /// Overwrite the mutable fields. `false` when no row matched.
    async fn update(&self, video: &Video) -> StoreResult<bool>;

    /// Delete with cascades. `false` when no row matched.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: Comment) -> StoreResult<Comment>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>>;

    /// Comments on `video` in insertion order, windowed by `page`.
    /// Only comments whose owner is a known user are returned.
    async fn list_for_video(&self, video: Uuid, page: Page) -> StoreResult<Vec<Comment>>;

    async fn update(&self, comment: &Comment) -> StoreResult<bool>;
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait TweetRepository: Send + Sync {
    async fn insert(&self, tweet: Tweet) -> StoreResult<Tweet>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Tweet>>;
    /// Newest first
    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Tweet>>;
    async fn update(&self, tweet: &Tweet) -> StoreResult<bool>;
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    async fn insert(&self, playlist: Playlist) -> StoreResult<Playlist>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Playlist>>;
    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Playlist>>;

    /// Overwrite name and description
    async fn update(&self, playlist: &Playlist) -> StoreResult<bool>;

    /// Append `video` unless it is already a member
    async fn add_video(&self, playlist: Uuid, video: Uuid) -> StoreResult<Membership>;

    /// Remove `video`, keeping the relative order of the rest.
    /// A non-member leaves the list unchanged.
    async fn remove_video(&self, playlist: Uuid, video: Uuid) -> StoreResult<Option<Playlist>>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// Outcome of appending a video to a playlist
#[derive(Debug, Clone, PartialEq)]
pub enum Membership {
    Added(Playlist),
    AlreadyMember,
    /// The playlist no longer exists
    Missing,
}

/// Storage for a binary-state relation keyed by `R::Key`
#[async_trait]
pub trait RelationRepository<R: Relation>: Send + Sync {
    async fn find_by_key(&self, key: &R::Key) -> StoreResult<Option<R>>;

    /// Fails with [`StoreError::Conflict`] when the key is taken
    async fn insert(&self, relation: R) -> StoreResult<R>;

    /// `false` when no row had this id
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait LikeRepository: RelationRepository<Like> {
    /// Video likes of `liked_by`, oldest first
    async fn list_video_likes(&self, liked_by: Uuid) -> StoreResult<Vec<Like>>;

    /// Likes on any video, tweet or comment owned by `owner`; `None` when there are none
    async fn count_received(&self, owner: Uuid) -> StoreResult<Option<i64>>;
}

#[async_trait]
pub trait SubscriptionRepository: RelationRepository<Subscription> {
    async fn list_by_channel(&self, channel: Uuid) -> StoreResult<Vec<Subscription>>;
    async fn list_by_subscriber(&self, subscriber: Uuid) -> StoreResult<Vec<Subscription>>;
    /// `None` when the channel has no subscribers
    async fn count_for_channel(&self, channel: Uuid) -> StoreResult<Option<i64>>;
}

/// Every repository, shared by all services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub videos: Arc<dyn VideoRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tweets: Arc<dyn TweetRepository>,
    pub playlists: Arc<dyn PlaylistRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
}

impl Repositories {
    pub fn memory() -> Self {
        Self::from_store(Arc::new(memory::MemoryStore::new()))
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::from_store(Arc::new(postgres::PgStore::new(pool)))
    }

    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository
            + VideoRepository
            + CommentRepository
            + TweetRepository
            + PlaylistRepository
            + LikeRepository
            + SubscriptionRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            videos: store.clone(),
            comments: store.clone(),
            tweets: store.clone(),
            playlists: store.clone(),
            likes: store.clone(),
            subscriptions: store,
        }
    }
}
