//! In-process entity store.
//!
//! Tables are insertion-ordered vectors behind one `RwLock`, so cascades see
//! a consistent snapshot and ties in stable sorts keep insertion order.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    CommentRepository, LikeRepository, Membership, PlaylistRepository, RelationRepository, StoreError,
    StoreResult, SubscriptionRepository, TweetRepository, UserRepository, VideoQuery,
    VideoRepository,
};
use crate::domain::{
    Comment, Like, LikeKey, LikeTarget, Playlist, Relation, Subscription, SubscriptionKey, Tweet,
    User, Video, VideoTotals,
};
use crate::pipeline::{Page, Pipeline};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    videos: Vec<Video>,
    comments: Vec<Comment>,
    tweets: Vec<Tweet>,
    playlists: Vec<Playlist>,
    likes: Vec<Like>,
    subscriptions: Vec<Subscription>,
}

impl Tables {
    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn drop_likes_on(&mut self, targets: &[LikeTarget]) {
        self.likes.retain(|l| !targets.contains(&l.target));
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn replace<T>(rows: &mut [T], matches: impl Fn(&T) -> bool, next: T) -> bool {
    match rows.iter_mut().find(|row| matches(row)) {
        Some(row) => {
            *row = next;
            true
        }
        None => false,
    }
}

fn remove<T>(rows: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> Option<T> {
    let index = rows.iter().position(matches)?;
    Some(rows.remove(index))
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.id == user.id || u.username == user.username) {
            return Err(StoreError::Conflict(format!("user {}", user.username)));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl VideoRepository for MemoryStore {
    async fn insert(&self, video: Video) -> StoreResult<Video> {
        let mut tables = self.tables.write().await;
        if tables.videos.iter().any(|v| v.id == video.id) {
            return Err(StoreError::Conflict(format!("video {}", video.id)));
        }
        tables.videos.push(video.clone());
        Ok(video)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Video>> {
        let tables = self.tables.read().await;
        Ok(tables.videos.iter().find(|v| v.id == id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Video>> {
        let tables = self.tables.read().await;
        Ok(tables
            .videos
            .iter()
            .filter(|v| ids.contains(&v.id))
            .cloned()
            .collect())
    }

    async fn search(&self, query: &VideoQuery) -> StoreResult<Vec<Video>> {
        let tables = self.tables.read().await;
        Ok(Pipeline::from_source(tables.videos.iter().cloned())
            .matching(|v| query.search.matches_any(&[&v.title, &v.description]))
            .matching(|v| query.owner.map_or(true, |owner| v.owner == owner))
            .matching(|v| tables.user_exists(v.owner))
            .sorted_by(&query.sort)
            .paginate(&query.page)
            .collect())
    }

    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Video>> {
        let tables = self.tables.read().await;
        let mut videos: Vec<Video> = tables
            .videos
            .iter()
            .filter(|v| v.owner == owner)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn totals_for_owner(&self, owner: Uuid) -> StoreResult<Option<VideoTotals>> {
        let tables = self.tables.read().await;
        let totals = tables
            .videos
            .iter()
            .filter(|v| v.owner == owner)
            .fold(None, |acc: Option<VideoTotals>, v| {
                let acc = acc.unwrap_or_default();
                Some(VideoTotals {
                    total_videos: acc.total_videos + 1,
                    total_views: acc.total_views + v.views,
                })
            });
        Ok(totals)
    }

    async fn update(&self, video: &Video) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let mut next = video.clone();
        next.updated_at = Utc::now();
        Ok(replace(&mut tables.videos, |v| v.id == video.id, next))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if remove(&mut tables.videos, |v| v.id == id).is_none() {
            return Ok(false);
        }

        let mut orphaned = vec![LikeTarget::Video(id)];
        orphaned.extend(
            tables
                .comments
                .iter()
                .filter(|c| c.video == id)
                .map(|c| LikeTarget::Comment(c.id)),
        );
        tables.comments.retain(|c| c.video != id);
        tables.drop_likes_on(&orphaned);

        let now = Utc::now();
        for playlist in tables.playlists.iter_mut().filter(|p| p.contains(id)) {
            playlist.videos.retain(|v| *v != id);
            playlist.updated_at = now;
        }
        Ok(true)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert(&self, comment: Comment) -> StoreResult<Comment> {
        let mut tables = self.tables.write().await;
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_for_video(&self, video: Uuid, page: Page) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        Ok(Pipeline::from_source(tables.comments.iter().cloned())
            .matching(|c| c.video == video)
            .matching(|c| tables.user_exists(c.owner))
            .paginate(&page)
            .collect())
    }

    async fn update(&self, comment: &Comment) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let mut next = comment.clone();
        next.updated_at = Utc::now();
        Ok(replace(&mut tables.comments, |c| c.id == comment.id, next))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if remove(&mut tables.comments, |c| c.id == id).is_none() {
            return Ok(false);
        }
        tables.drop_likes_on(&[LikeTarget::Comment(id)]);
        Ok(true)
    }
}

#[async_trait]
impl TweetRepository for MemoryStore {
    async fn insert(&self, tweet: Tweet) -> StoreResult<Tweet> {
        let mut tables = self.tables.write().await;
        tables.tweets.push(tweet.clone());
        Ok(tweet)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Tweet>> {
        let tables = self.tables.read().await;
        Ok(tables.tweets.iter().find(|t| t.id == id).cloned())
    }

    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Tweet>> {
        let tables = self.tables.read().await;
        let mut tweets: Vec<Tweet> = tables
            .tweets
            .iter()
            .filter(|t| t.owner == owner)
            .cloned()
            .collect();
        tweets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tweets)
    }

    async fn update(&self, tweet: &Tweet) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let mut next = tweet.clone();
        next.updated_at = Utc::now();
        Ok(replace(&mut tables.tweets, |t| t.id == tweet.id, next))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if remove(&mut tables.tweets, |t| t.id == id).is_none() {
            return Ok(false);
        }
        tables.drop_likes_on(&[LikeTarget::Tweet(id)]);
        Ok(true)
    }
}

#[async_trait]
impl PlaylistRepository for MemoryStore {
    async fn insert(&self, playlist: Playlist) -> StoreResult<Playlist> {
        let mut tables = self.tables.write().await;
        tables.playlists.push(playlist.clone());
        Ok(playlist)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Playlist>> {
        let tables = self.tables.read().await;
        Ok(tables.playlists.iter().find(|p| p.id == id).cloned())
    }

    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Playlist>> {
        let tables = self.tables.read().await;
        Ok(tables
            .playlists
            .iter()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect())
    }

    async fn update(&self, playlist: &Playlist) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.playlists.iter_mut().find(|p| p.id == playlist.id) {
            Some(existing) => {
                existing.name = playlist.name.clone();
                existing.description = playlist.description.clone();
                existing.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_video(&self, playlist: Uuid, video: Uuid) -> StoreResult<Membership> {
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.playlists.iter_mut().find(|p| p.id == playlist) else {
            return Ok(Membership::Missing);
        };
        if existing.contains(video) {
            return Ok(Membership::AlreadyMember);
        }
        existing.videos.push(video);
        existing.updated_at = Utc::now();
        Ok(Membership::Added(existing.clone()))
    }

    async fn remove_video(&self, playlist: Uuid, video: Uuid) -> StoreResult<Option<Playlist>> {
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.playlists.iter_mut().find(|p| p.id == playlist) else {
            return Ok(None);
        };
        if existing.contains(video) {
            existing.videos.retain(|v| *v != video);
            existing.updated_at = Utc::now();
        }
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(remove(&mut tables.playlists, |p| p.id == id).is_some())
    }
}

#[async_trait]
impl RelationRepository<Like> for MemoryStore {
    async fn find_by_key(&self, key: &LikeKey) -> StoreResult<Option<Like>> {
        let tables = self.tables.read().await;
        Ok(tables.likes.iter().find(|l| l.key() == *key).cloned())
    }

    async fn insert(&self, like: Like) -> StoreResult<Like> {
        let mut tables = self.tables.write().await;
        if tables.likes.iter().any(|l| l.key() == like.key()) {
            return Err(StoreError::Conflict(format!(
                "like by {} on {} {}",
                like.liked_by,
                like.target.kind(),
                like.target.id()
            )));
        }
        tables.likes.push(like.clone());
        Ok(like)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(remove(&mut tables.likes, |l| l.id == id).is_some())
    }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn list_video_likes(&self, liked_by: Uuid) -> StoreResult<Vec<Like>> {
        let tables = self.tables.read().await;
        Ok(tables
            .likes
            .iter()
            .filter(|l| l.liked_by == liked_by && matches!(l.target, LikeTarget::Video(_)))
            .cloned()
            .collect())
    }

    async fn count_received(&self, owner: Uuid) -> StoreResult<Option<i64>> {
        let tables = self.tables.read().await;
        let owned_by = |target: &LikeTarget| match *target {
            LikeTarget::Video(id) => tables.videos.iter().any(|v| v.id == id && v.owner == owner),
            LikeTarget::Tweet(id) => tables.tweets.iter().any(|t| t.id == id && t.owner == owner),
            LikeTarget::Comment(id) => tables.comments.iter().any(|c| c.id == id && c.owner == owner),
        };
        let count = tables.likes.iter().filter(|l| owned_by(&l.target)).count() as i64;
        Ok((count > 0).then_some(count))
    }
}

#[async_trait]
impl RelationRepository<Subscription> for MemoryStore {
    async fn find_by_key(&self, key: &SubscriptionKey) -> StoreResult<Option<Subscription>> {
        let tables = self.tables.read().await;
        Ok(tables.subscriptions.iter().find(|s| s.key() == *key).cloned())
    }

    async fn insert(&self, subscription: Subscription) -> StoreResult<Subscription> {
        let mut tables = self.tables.write().await;
        if tables.subscriptions.iter().any(|s| s.key() == subscription.key()) {
            return Err(StoreError::Conflict(format!(
                "subscription of {} to {}",
                subscription.subscriber, subscription.channel
            )));
        }
        tables.subscriptions.push(subscription.clone());
        Ok(subscription)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(remove(&mut tables.subscriptions, |s| s.id == id).is_some())
    }
}

#[async_trait]
impl SubscriptionRepository for MemoryStore {
    async fn list_by_channel(&self, channel: Uuid) -> StoreResult<Vec<Subscription>> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| s.channel == channel)
            .cloned()
            .collect())
    }

    async fn list_by_subscriber(&self, subscriber: Uuid) -> StoreResult<Vec<Subscription>> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| s.subscriber == subscriber)
            .cloned()
            .collect())
    }

    async fn count_for_channel(&self, channel: Uuid) -> StoreResult<Option<i64>> {
        let tables = self.tables.read().await;
        let count = tables.subscriptions.iter().filter(|s| s.channel == channel).count() as i64;
        Ok((count > 0).then_some(count))
    }
}
