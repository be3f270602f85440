/// Likes on videos, comments and tweets
use tracing::info;
use uuid::Uuid;

use super::toggle::{ToggleEngine, Toggled};
use crate::domain::{Like, LikeKey, LikeTarget, LikedVideoView};
use crate::error::{AppError, Result};
use crate::middleware::Principal;
use crate::pipeline::{distinct_ids, Lookup, Pipeline};
use crate::repository::Repositories;

pub struct LikeService {
    repos: Repositories,
    engine: ToggleEngine<Like>,
}

impl LikeService {
    pub fn new(repos: Repositories) -> Self {
        Self {
            repos,
            engine: ToggleEngine::new(),
        }
    }

    pub async fn toggle_video_like(&self, principal: Principal, video_id: Uuid) -> Result<Toggled<Like>> {
        let user = principal.require()?;
        if self.repos.videos.find_by_id(video_id).await?.is_none() {
            return Err(AppError::not_found("Video not found"));
        }
        self.toggle(user, LikeTarget::Video(video_id)).await
    }

    pub async fn toggle_comment_like(&self, principal: Principal, comment_id: Uuid) -> Result<Toggled<Like>> {
        let user = principal.require()?;
        if self.repos.comments.find_by_id(comment_id).await?.is_none() {
            return Err(AppError::not_found("Comment not found"));
        }
        self.toggle(user, LikeTarget::Comment(comment_id)).await
    }

    pub async fn toggle_tweet_like(&self, principal: Principal, tweet_id: Uuid) -> Result<Toggled<Like>> {
        let user = principal.require()?;
        if self.repos.tweets.find_by_id(tweet_id).await?.is_none() {
            return Err(AppError::not_found("Tweet not found"));
        }
        self.toggle(user, LikeTarget::Tweet(tweet_id)).await
    }

    async fn toggle(&self, liked_by: Uuid, target: LikeTarget) -> Result<Toggled<Like>> {
        let key = LikeKey { liked_by, target };
        let toggled = self.engine.toggle(&*self.repos.likes, key).await?;

        info!(
            user_id = %liked_by,
            target_kind = target.kind(),
            target_id = %target.id(),
            liked = toggled.is_created(),
            "Like toggled"
        );
        Ok(toggled)
    }

    /// Videos the caller has liked, with each video's owner.
    /// Likes whose video no longer exists are dropped.
    pub async fn liked_videos(&self, principal: Principal) -> Result<Vec<LikedVideoView>> {
        let user = principal.require()?;
        let likes = self.repos.likes.list_video_likes(user).await?;

        let video_ids = distinct_ids(likes.iter().map(|l| l.target.id()));
        let videos = Lookup::from_rows(self.repos.videos.find_many(&video_ids).await?);

        let owner_ids = distinct_ids(videos.values().map(|v| v.owner));
        let owners = Lookup::from_rows(self.repos.users.find_many(&owner_ids).await?);

        Ok(Pipeline::from_source(likes)
            .join(|like| {
                let video = videos.first(like.target.id())?;
                Some(LikedVideoView::new(&like, video, owners.first(video.owner)))
            })
            .collect())
    }
}
