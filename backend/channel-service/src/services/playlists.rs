/// Playlists: ordered, duplicate-free lists of videos
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    OwnerSummary, Playlist, PlaylistDetail, PlaylistVideoCard, PlaylistVideoDetail, PlaylistView,
};
use crate::error::{AppError, Result};
use crate::middleware::{require_owner, Principal};
use crate::pipeline::{distinct_ids, Lookup};
use crate::repository::{Membership, Repositories};

pub struct PlaylistService {
    repos: Repositories,
}

impl PlaylistService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(&self, principal: Principal, name: &str, description: &str) -> Result<Playlist> {
        let owner = principal.require()?;
        let (name, description) = (name.trim(), description.trim());
        if name.is_empty() || description.is_empty() {
            return Err(AppError::validation("Playlist name and description are required"));
        }
        check_lengths(name, description)?;

        let playlist = self
            .repos
            .playlists
            .insert(Playlist::new(owner, name, description))
            .await?;
        info!(playlist_id = %playlist.id, user_id = %owner, "Playlist created");
        Ok(playlist)
    }

    /// A user's playlists with their videos (and each video's owner) resolved
    pub async fn user_playlists(&self, user_id: Uuid) -> Result<Vec<PlaylistView>> {
        let playlists = self.repos.playlists.list_by_owner(user_id).await?;

        let video_ids = distinct_ids(playlists.iter().flat_map(|p| p.videos.iter().copied()));
        let videos = Lookup::from_rows(self.repos.videos.find_many(&video_ids).await?);

        let user_ids = distinct_ids(
            playlists
                .iter()
                .map(|p| p.owner)
                .chain(videos.values().map(|v| v.owner)),
        );
        let users = Lookup::from_rows(self.repos.users.find_many(&user_ids).await?);

        Ok(playlists
            .into_iter()
            .map(|p| PlaylistView {
                videos: videos
                    .many(&p.videos)
                    .into_iter()
                    .map(|v| PlaylistVideoCard::new(v, users.first(v.owner)))
                    .collect(),
                created_by: users.first(p.owner).map(OwnerSummary::from),
                id: p.id,
                name: p.name,
                description: p.description,
            })
            .collect())
    }

    pub async fn get(&self, playlist_id: Uuid) -> Result<PlaylistDetail> {
        let playlist = self.find(playlist_id).await?;
        let videos = Lookup::from_rows(self.repos.videos.find_many(&playlist.videos).await?);

        let user_ids = distinct_ids(
            std::iter::once(playlist.owner).chain(videos.values().map(|v| v.owner)),
        );
        let users = Lookup::from_rows(self.repos.users.find_many(&user_ids).await?);

        let entries = videos
            .many(&playlist.videos)
            .into_iter()
            .map(|v| PlaylistVideoDetail::new(v, users.first(v.owner)))
            .collect();
        Ok(PlaylistDetail::new(&playlist, users.first(playlist.owner), entries))
    }

    pub async fn add_video(&self, principal: Principal, video_id: Uuid, playlist_id: Uuid) -> Result<Playlist> {
        let playlist = self.find(playlist_id).await?;
        if self.repos.videos.find_by_id(video_id).await?.is_none() {
            return Err(AppError::not_found("Video not found"));
        }
        require_owner(&playlist, principal)?;

        if playlist.contains(video_id) {
            return Err(AppError::validation("Video is already in the playlist"));
        }

        // The store appends only when the video is still absent
        let updated = match self.repos.playlists.add_video(playlist_id, video_id).await? {
            Membership::Added(updated) => updated,
            Membership::AlreadyMember => {
                return Err(AppError::validation("Video is already in the playlist"))
            }
            Membership::Missing => return Err(AppError::not_found("Playlist not found")),
        };

        info!(playlist_id = %playlist_id, video_id = %video_id, "Video added to playlist");
        Ok(updated)
    }

    /// Removing a video that is not in the playlist leaves it unchanged
    pub async fn remove_video(&self, principal: Principal, video_id: Uuid, playlist_id: Uuid) -> Result<Playlist> {
        let playlist = self.find(playlist_id).await?;
        require_owner(&playlist, principal)?;

        let updated = self
            .repos
            .playlists
            .remove_video(playlist_id, video_id)
            .await?
            .ok_or_else(|| AppError::not_found("Playlist not found"))?;

        info!(playlist_id = %playlist_id, video_id = %video_id, "Video removed from playlist");
        Ok(updated)
    }

    /// Rename and/or redescribe; at least one of the two is required
    pub async fn update(
        &self,
        principal: Principal,
        playlist_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Playlist> {
        let playlist = self.find(playlist_id).await?;
        require_owner(&playlist, principal)?;

        let name = name.map(str::trim).filter(|s| !s.is_empty());
        let description = description.map(str::trim).filter(|s| !s.is_empty());
        if name.is_none() && description.is_none() {
            return Err(AppError::validation("Playlist name or description is required"));
        }
        check_lengths(name.unwrap_or_default(), description.unwrap_or_default())?;

        let updated = Playlist {
            name: name.map(str::to_string).unwrap_or(playlist.name.clone()),
            description: description
                .map(str::to_string)
                .unwrap_or(playlist.description.clone()),
            updated_at: Utc::now(),
            ..playlist
        };
        if !self.repos.playlists.update(&updated).await? {
            return Err(AppError::Persistence(format!(
                "playlist {playlist_id} vanished during update"
            )));
        }
        Ok(updated)
    }

    pub async fn delete(&self, principal: Principal, playlist_id: Uuid) -> Result<Playlist> {
        let playlist = self.find(playlist_id).await?;
        require_owner(&playlist, principal)?;

        if !self.repos.playlists.delete(playlist_id).await? {
            return Err(AppError::Persistence(format!(
                "playlist {playlist_id} vanished during delete"
            )));
        }
        info!(playlist_id = %playlist_id, "Playlist deleted");
        Ok(playlist)
    }

    async fn find(&self, playlist_id: Uuid) -> Result<Playlist> {
        self.repos
            .playlists
            .find_by_id(playlist_id)
            .await?
            .ok_or_else(|| AppError::not_found("Playlist not found"))
    }
}

pub const MAX_NAME_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

fn check_lengths(name: &str, description: &str) -> Result<()> {
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::validation("Playlist name must be at most 200 characters"));
    }
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(AppError::validation(
            "Playlist description must be at most 2000 characters",
        ));
    }
    Ok(())
}
