use async_trait::async_trait;
use uuid::Uuid;

use super::{PgStore, PLAYLIST_COLUMNS};
use crate::domain::Playlist;
use crate::repository::{Membership, PlaylistRepository, StoreResult};

#[async_trait]
impl PlaylistRepository for PgStore {
    async fn insert(&self, playlist: Playlist) -> StoreResult<Playlist> {
        let sql = format!(
            r#"
            INSERT INTO playlists ({PLAYLIST_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PLAYLIST_COLUMNS}
            "#
        );
        let playlist = sqlx::query_as::<_, Playlist>(&sql)
            .bind(playlist.id)
            .bind(&playlist.name)
            .bind(&playlist.description)
            .bind(playlist.owner)
            .bind(&playlist.videos)
            .bind(playlist.created_at)
            .bind(playlist.updated_at)
            .fetch_one(self.pool())
            .await?;
        Ok(playlist)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Playlist>> {
        let sql = format!("SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE id = $1");
        let playlist = sqlx::query_as::<_, Playlist>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(playlist)
    }

    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Playlist>> {
        let sql = format!(
            "SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE owner = $1 ORDER BY created_at ASC, id ASC"
        );
        let playlists = sqlx::query_as::<_, Playlist>(&sql)
            .bind(owner)
            .fetch_all(self.pool())
            .await?;
        Ok(playlists)
    }

    async fn update(&self, playlist: &Playlist) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE playlists SET name = $2, description = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(playlist.id)
        .bind(&playlist.name)
        .bind(&playlist.description)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_video(&self, playlist: Uuid, video: Uuid) -> StoreResult<Membership> {
        let sql = format!(
            r#"
            UPDATE playlists
            SET videos = array_append(videos, $2), updated_at = NOW()
            WHERE id = $1 AND NOT ($2 = ANY(videos))
            RETURNING {PLAYLIST_COLUMNS}
            "#
        );
        let added = sqlx::query_as::<_, Playlist>(&sql)
            .bind(playlist)
            .bind(video)
            .fetch_optional(self.pool())
            .await?;
        if let Some(updated) = added {
            return Ok(Membership::Added(updated));
        }

        // Nothing appended: either already a member or the playlist is gone
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM playlists WHERE id = $1)")
            .bind(playlist)
            .fetch_one(self.pool())
            .await?;
        Ok(if exists {
            Membership::AlreadyMember
        } else {
            Membership::Missing
        })
    }

    async fn remove_video(&self, playlist: Uuid, video: Uuid) -> StoreResult<Option<Playlist>> {
        let sql = format!(
            r#"
            UPDATE playlists
            SET videos = array_remove(videos, $2),
                updated_at = CASE WHEN $2 = ANY(videos) THEN NOW() ELSE updated_at END
            WHERE id = $1
            RETURNING {PLAYLIST_COLUMNS}
            "#
        );
        let playlist = sqlx::query_as::<_, Playlist>(&sql)
            .bind(playlist)
            .bind(video)
            .fetch_optional(self.pool())
            .await?;
        Ok(playlist)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
