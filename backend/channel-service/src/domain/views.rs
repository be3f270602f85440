//! Read views returned by the API.
//!
//! Each view declares exactly the fields that leave the service; everything
//! else on the underlying entities stays internal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{Comment, Like, Playlist, Subscription, User, Video};

/// Public identity of a user embedded in other views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
}

impl From<&User> for OwnerSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

/// Video feed entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCard {
    pub id: Uuid,
    pub thumbnail: String,
    pub video_file: String,
    pub title: String,
    pub description: String,
    pub created_by: OwnerSummary,
}

impl VideoCard {
    pub fn new(video: &Video, owner: &User) -> Self {
        Self {
            id: video.id,
            thumbnail: video.thumbnail.clone(),
            video_file: video.video_file.clone(),
            title: video.title.clone(),
            description: video.description.clone(),
            created_by: owner.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub created_by: OwnerSummary,
}

impl CommentView {
    pub fn new(comment: &Comment, owner: &User) -> Self {
        Self {
            id: comment.id,
            content: comment.content.clone(),
            created_by: owner.into(),
        }
    }
}

/// Video summary inside a user's playlist listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistVideoCard {
    pub id: Uuid,
    pub title: String,
    pub thumbnail: String,
    pub description: String,
    pub owner: Option<OwnerSummary>,
}

impl PlaylistVideoCard {
    pub fn new(video: &Video, owner: Option<&User>) -> Self {
        Self {
            id: video.id,
            title: video.title.clone(),
            thumbnail: video.thumbnail.clone(),
            description: video.description.clone(),
            owner: owner.map(OwnerSummary::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub videos: Vec<PlaylistVideoCard>,
    pub created_by: Option<OwnerSummary>,
}

/// Video entry of a single playlist page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistVideoDetail {
    pub id: Uuid,
    pub thumbnail: String,
    pub title: String,
    pub duration: f64,
    pub views: i64,
    pub owner: Option<OwnerSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlaylistVideoDetail {
    pub fn new(video: &Video, owner: Option<&User>) -> Self {
        Self {
            id: video.id,
            thumbnail: video.thumbnail.clone(),
            title: video.title.clone(),
            duration: video.duration,
            views: video.views,
            owner: owner.map(OwnerSummary::from),
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetail {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_by: Option<OwnerSummary>,
    pub videos: Vec<PlaylistVideoDetail>,
}

impl PlaylistDetail {
    pub fn new(playlist: &Playlist, created_by: Option<&User>, videos: Vec<PlaylistVideoDetail>) -> Self {
        Self {
            id: playlist.id,
            name: playlist.name.clone(),
            description: playlist.description.clone(),
            created_by: created_by.map(OwnerSummary::from),
            videos,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberView {
    pub id: Uuid,
    pub subscriber: OwnerSummary,
    pub created_at: DateTime<Utc>,
}

impl SubscriberView {
    pub fn new(subscription: &Subscription, subscriber: &User) -> Self {
        Self {
            id: subscription.id,
            subscriber: subscriber.into(),
            created_at: subscription.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedChannelView {
    pub id: Uuid,
    pub channel: OwnerSummary,
    pub created_at: DateTime<Utc>,
}

impl SubscribedChannelView {
    pub fn new(subscription: &Subscription, channel: &User) -> Self {
        Self {
            id: subscription.id,
            channel: channel.into(),
            created_at: subscription.created_at,
        }
    }
}

/// The liked video, flattened into the like record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideo {
    pub id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub duration: f64,
    pub views: i64,
    pub owner: Option<OwnerSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideoView {
    pub id: Uuid,
    pub liked_by: Uuid,
    pub video: LikedVideo,
}

impl LikedVideoView {
    pub fn new(like: &Like, video: &Video, owner: Option<&User>) -> Self {
        Self {
            id: like.id,
            liked_by: like.liked_by,
            video: LikedVideo {
                id: video.id,
                video_file: video.video_file.clone(),
                thumbnail: video.thumbnail.clone(),
                title: video.title.clone(),
                duration: video.duration,
                views: video.views,
                owner: owner.map(OwnerSummary::from),
            },
        }
    }
}

/// Dashboard row for one of the caller's own videos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelVideo {
    pub id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Video> for ChannelVideo {
    fn from(video: &Video) -> Self {
        Self {
            id: video.id,
            video_file: video.video_file.clone(),
            thumbnail: video.thumbnail.clone(),
            title: video.title.clone(),
            duration: video.duration,
            views: video.views,
            is_published: video.is_published,
            owner: video.owner,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub total_videos: i64,
    pub total_views: i64,
    pub total_subscribers: i64,
    pub total_likes: i64,
}
