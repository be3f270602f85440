//! Video lifecycle: publish, update, delete, toggle publish.
//!
//! Every sequence that touches the object store fails closed. The record in
//! the entity store is written only after the assets it references exist, and
//! removed only after its assets are gone. An asset uploaded by a sequence
//! that later aborts is removed again before the error is returned.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Video, VideoCard};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::{require_owner, Principal};
use crate::pipeline::{distinct_ids, Lookup, Pipeline};
use crate::repository::{Repositories, VideoQuery};
use crate::storage::{discard_scratch, AssetStore, LocalAsset, StoredAsset};

/// Publish request; the files are scratch uploads owned by the request
#[derive(Debug, Default)]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub video_file: Option<LocalAsset>,
    pub thumbnail: Option<LocalAsset>,
}

#[derive(Debug, Default)]
pub struct VideoDetailsUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<LocalAsset>,
}

pub struct VideoService {
    repos: Repositories,
    assets: Arc<dyn AssetStore>,
}

impl VideoService {
    pub fn new(repos: Repositories, assets: Arc<dyn AssetStore>) -> Self {
        Self { repos, assets }
    }

    /// Feed: search, sort and paginate, then attach each video's owner.
    /// Videos whose owner is unknown are not listed.
    pub async fn list(&self, query: &VideoQuery) -> Result<Vec<VideoCard>> {
        let videos = self.repos.videos.search(query).await?;
        let ids = distinct_ids(videos.iter().map(|v| v.owner));
        let owners = Lookup::from_rows(self.repos.users.find_many(&ids).await?);

        Ok(Pipeline::from_source(videos)
            .join(|v| owners.first(v.owner).map(|u| VideoCard::new(&v, u)))
            .collect())
    }

    pub async fn get(&self, video_id: Uuid) -> Result<Video> {
        self.repos
            .videos
            .find_by_id(video_id)
            .await?
            .ok_or_else(|| AppError::not_found("Video not found"))
    }

    /// Upload media, then thumbnail, then insert the record
    pub async fn publish(&self, principal: Principal, draft: NewVideo) -> Result<Video> {
        let NewVideo {
            title,
            description,
            video_file,
            thumbnail,
        } = draft;

        let (media, thumb) = match (video_file, thumbnail) {
            (Some(media), Some(thumb)) => (media, thumb),
            (media, thumb) => {
                discard_all([media.as_ref(), thumb.as_ref()]).await;
                return Err(AppError::validation("Video file and thumbnail are required"));
            }
        };

        let checked = principal.require().and_then(|owner| {
            let title = title.trim();
            let description = description.trim();
            if title.is_empty() || description.is_empty() {
                return Err(AppError::validation("Title and description are required"));
            }
            Ok((owner, title.to_string(), description.to_string()))
        });
        let (owner, title, description) = match checked {
            Ok(fields) => fields,
            Err(e) => {
                discard_all([Some(&media), Some(&thumb)]).await;
                return Err(e);
            }
        };

        let stored_media = match self.store_asset(media).await {
            Ok(stored) => stored,
            Err(e) => {
                discard_scratch(&thumb).await;
                return Err(e);
            }
        };

        let stored_thumb = match self.store_asset(thumb).await {
            Ok(stored) => stored,
            Err(e) => {
                self.remove_quietly(&stored_media.url).await;
                return Err(e);
            }
        };

        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            owner,
            video_file: stored_media.url.clone(),
            thumbnail: stored_thumb.url.clone(),
            title,
            description,
            duration: stored_media.duration.unwrap_or(0.0),
            views: 0,
            is_published: true,
            created_at: now,
            updated_at: now,
        };

        match self.repos.videos.insert(video).await {
            Ok(video) => {
                info!(video_id = %video.id, user_id = %owner, "Video published");
                Ok(video)
            }
            Err(e) => {
                self.remove_quietly(&stored_media.url).await;
                self.remove_quietly(&stored_thumb.url).await;
                Err(e.into())
            }
        }
    }

    /// Replace the thumbnail and optionally the title/description.
    ///
    /// The new thumbnail is uploaded and committed to the record before the
    /// old one is removed, so the record never points at a removed asset. If
    /// the old thumbnail cannot be removed the record is written back and the
    /// new upload is removed again.
    pub async fn update_details(
        &self,
        principal: Principal,
        video_id: Uuid,
        changes: VideoDetailsUpdate,
    ) -> Result<Video> {
        let VideoDetailsUpdate {
            title,
            description,
            thumbnail,
        } = changes;

        let checked = match self.get(video_id).await {
            Ok(video) => require_owner(&video, principal).map(|()| video),
            Err(e) => Err(e),
        };
        let (video, thumb) = match (checked, thumbnail) {
            (Ok(video), Some(thumb)) => (video, thumb),
            (Ok(_), None) => return Err(AppError::validation("Thumbnail is required")),
            (Err(e), thumb) => {
                discard_all([thumb.as_ref()]).await;
                return Err(e);
            }
        };

        let new_thumb = self.store_asset(thumb).await?;

        let updated = Video {
            title: non_empty(title).unwrap_or_else(|| video.title.clone()),
            description: non_empty(description).unwrap_or_else(|| video.description.clone()),
            thumbnail: new_thumb.url.clone(),
            updated_at: Utc::now(),
            ..video.clone()
        };

        if let Err(e) = self.persist(&updated, "update").await {
            self.remove_quietly(&new_thumb.url).await;
            return Err(e);
        }

        if let Err(e) = self.remove_asset(&video.thumbnail).await {
            match self.persist(&video, "restore").await {
                Ok(()) => self.remove_quietly(&new_thumb.url).await,
                // The record keeps the new thumbnail; the old one stays live
                Err(restore) => warn!(
                    video_id = %video_id,
                    error = %restore,
                    "Could not restore previous thumbnail"
                ),
            }
            return Err(e);
        }

        info!(video_id = %video_id, "Video details updated");
        Ok(updated)
    }

    /// Remove media, then thumbnail, then the record. Any failure leaves the
    /// record in place so the delete can be retried.
    pub async fn delete(&self, principal: Principal, video_id: Uuid) -> Result<Video> {
        let video = self.get(video_id).await?;
        require_owner(&video, principal)?;

        self.remove_asset(&video.video_file).await?;
        self.remove_asset(&video.thumbnail).await?;

        if !self.repos.videos.delete(video_id).await? {
            return Err(AppError::Persistence(format!(
                "video {video_id} vanished during delete"
            )));
        }

        info!(video_id = %video_id, "Video deleted");
        Ok(video)
    }

    pub async fn toggle_publish(&self, principal: Principal, video_id: Uuid) -> Result<Video> {
        let video = self.get(video_id).await?;
        require_owner(&video, principal)?;

        let updated = Video {
            is_published: !video.is_published,
            updated_at: Utc::now(),
            ..video
        };
        self.persist(&updated, "update").await?;
        Ok(updated)
    }

    async fn persist(&self, video: &Video, action: &str) -> Result<()> {
        if !self.repos.videos.update(video).await? {
            return Err(AppError::Persistence(format!(
                "video {} vanished during {action}",
                video.id
            )));
        }
        Ok(())
    }

    async fn store_asset(&self, asset: LocalAsset) -> Result<StoredAsset> {
        let result = self.assets.store(asset).await;
        metrics::record_asset_operation("store", &result);
        Ok(result?)
    }

    async fn remove_asset(&self, url: &str) -> Result<()> {
        let result = self.assets.remove(url).await;
        metrics::record_asset_operation("remove", &result);
        Ok(result?)
    }

    /// Rollback removal; a failure here only leaves an orphaned asset
    async fn remove_quietly(&self, url: &str) {
        if let Err(e) = self.remove_asset(url).await {
            warn!(url = %url, error = %e, "Failed to roll back uploaded asset");
        }
    }
}

async fn discard_all<const N: usize>(assets: [Option<&LocalAsset>; N]) {
    for asset in assets.into_iter().flatten() {
        discard_scratch(asset).await;
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
