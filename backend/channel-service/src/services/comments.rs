/// Comments on videos
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Comment, CommentView};
use crate::error::{AppError, Result};
use crate::middleware::{require_owner, Principal};
use crate::pipeline::{distinct_ids, Lookup, Page, Pipeline};
use crate::repository::Repositories;

pub struct CommentService {
    repos: Repositories,
}

impl CommentService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// One page of a video's comments in posting order, each with its author
    pub async fn list_for_video(&self, video_id: Uuid, page: Page) -> Result<Vec<CommentView>> {
        if self.repos.videos.find_by_id(video_id).await?.is_none() {
            return Err(AppError::not_found("Video not found"));
        }

        let comments = self.repos.comments.list_for_video(video_id, page).await?;
        let ids = distinct_ids(comments.iter().map(|c| c.owner));
        let owners = Lookup::from_rows(self.repos.users.find_many(&ids).await?);

        Ok(Pipeline::from_source(comments)
            .join(|c| owners.first(c.owner).map(|u| CommentView::new(&c, u)))
            .collect())
    }

    pub async fn add(&self, principal: Principal, video_id: Uuid, content: &str) -> Result<Comment> {
        let owner = principal.require()?;
        let content = required_content(content)?;
        if self.repos.videos.find_by_id(video_id).await?.is_none() {
            return Err(AppError::not_found("Video not found"));
        }

        let comment = self
            .repos
            .comments
            .insert(Comment::new(video_id, owner, content))
            .await?;
        info!(comment_id = %comment.id, video_id = %video_id, user_id = %owner, "Comment added");
        Ok(comment)
    }

    pub async fn update(&self, principal: Principal, comment_id: Uuid, content: &str) -> Result<Comment> {
        let comment = self.find(comment_id).await?;
        require_owner(&comment, principal)?;
        let content = required_content(content)?;

        let updated = Comment {
            content: content.to_string(),
            updated_at: Utc::now(),
            ..comment
        };
        if !self.repos.comments.update(&updated).await? {
            return Err(AppError::Persistence(format!(
                "comment {comment_id} vanished during update"
            )));
        }
        Ok(updated)
    }

    pub async fn delete(&self, principal: Principal, comment_id: Uuid) -> Result<Comment> {
        let comment = self.find(comment_id).await?;
        require_owner(&comment, principal)?;

        if !self.repos.comments.delete(comment_id).await? {
            return Err(AppError::Persistence(format!(
                "comment {comment_id} vanished during delete"
            )));
        }
        info!(comment_id = %comment_id, "Comment deleted");
        Ok(comment)
    }

    async fn find(&self, comment_id: Uuid) -> Result<Comment> {
        self.repos
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment not found"))
    }
}

pub const MAX_COMMENT_CHARS: usize = 5000;

fn required_content(content: &str) -> Result<&str> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::validation("Comment content is required"));
    }
    if content.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::validation("Comment must be 1-5000 characters"));
    }
    Ok(content)
}
