use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;
use uuid::Uuid;

/// User entity - provisioned by the identity provider, referenced only
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, full_name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            full_name: full_name.into(),
            avatar: avatar.into(),
            created_at: Utc::now(),
        }
    }
}

/// Video entity - media and thumbnail live in the object store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub owner: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    /// Seconds
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment entity - a comment on a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub video: Uuid,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(video: Uuid, owner: Uuid, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            video,
            owner,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Tweet entity - a short text post on a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: Uuid,
    pub content: String,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tweet {
    pub fn new(owner: Uuid, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            owner,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Playlist entity - ordered, duplicate-free list of video ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner: Uuid,
    pub videos: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    pub fn new(owner: Uuid, name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            owner,
            videos: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn contains(&self, video_id: Uuid) -> bool {
        self.videos.contains(&video_id)
    }
}

// ============================================================================
// Relations
// ============================================================================

/// What a like points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum LikeTarget {
    Video(Uuid),
    Comment(Uuid),
    Tweet(Uuid),
}

impl LikeTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "video",
            LikeTarget::Comment(_) => "comment",
            LikeTarget::Tweet(_) => "tweet",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            LikeTarget::Video(id) | LikeTarget::Comment(id) | LikeTarget::Tweet(id) => *id,
        }
    }

    /// Rebuild a target from its stored (kind, id) pair
    pub fn from_parts(kind: &str, id: Uuid) -> Option<Self> {
        match kind {
            "video" => Some(LikeTarget::Video(id)),
            "comment" => Some(LikeTarget::Comment(id)),
            "tweet" => Some(LikeTarget::Tweet(id)),
            _ => None,
        }
    }
}

/// Like relation - at most one per (liked_by, target)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: Uuid,
    pub liked_by: Uuid,
    pub target: LikeTarget,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LikeKey {
    pub liked_by: Uuid,
    pub target: LikeTarget,
}

/// Subscription relation - at most one per (subscriber, channel)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub subscriber: Uuid,
    pub channel: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    pub subscriber: Uuid,
    pub channel: Uuid,
}

/// Binary-state relation kinds handled by the toggle engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    VideoLike,
    CommentLike,
    TweetLike,
    Subscription,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::VideoLike => "video_like",
            RelationKind::CommentLike => "comment_like",
            RelationKind::TweetLike => "tweet_like",
            RelationKind::Subscription => "subscription",
        }
    }
}

/// A join record that exists only while the relation holds.
///
/// `Key` is the uniqueness key; two live records never share one.
pub trait Relation: Clone + Send + Sync + 'static {
    type Key: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    fn id(&self) -> Uuid;
    fn key(&self) -> Self::Key;
    /// Fresh record for `key` with a new id
    fn create(key: Self::Key) -> Self;
    fn kind_of(key: &Self::Key) -> RelationKind;
}

impl Relation for Like {
    type Key = LikeKey;

    fn id(&self) -> Uuid {
        self.id
    }

    fn key(&self) -> LikeKey {
        LikeKey {
            liked_by: self.liked_by,
            target: self.target,
        }
    }

    fn create(key: LikeKey) -> Self {
        Self {
            id: Uuid::new_v4(),
            liked_by: key.liked_by,
            target: key.target,
            created_at: Utc::now(),
        }
    }

    fn kind_of(key: &LikeKey) -> RelationKind {
        match key.target {
            LikeTarget::Video(_) => RelationKind::VideoLike,
            LikeTarget::Comment(_) => RelationKind::CommentLike,
            LikeTarget::Tweet(_) => RelationKind::TweetLike,
        }
    }
}

impl Relation for Subscription {
    type Key = SubscriptionKey;

    fn id(&self) -> Uuid {
        self.id
    }

    fn key(&self) -> SubscriptionKey {
        SubscriptionKey {
            subscriber: self.subscriber,
            channel: self.channel,
        }
    }

    fn create(key: SubscriptionKey) -> Self {
        Self {
            id: Uuid::new_v4(),
            subscriber: key.subscriber,
            channel: key.channel,
            created_at: Utc::now(),
        }
    }

    fn kind_of(_: &SubscriptionKey) -> RelationKind {
        RelationKind::Subscription
    }
}

/// Aggregate over a channel's videos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct VideoTotals {
    pub total_videos: i64,
    pub total_views: i64,
}
