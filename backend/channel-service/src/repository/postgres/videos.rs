use async_trait::async_trait;
use uuid::Uuid;

use super::{conflict_or_backend, PgStore, VIDEO_COLUMNS};
use crate::domain::{Video, VideoTotals};
use crate::repository::{StoreResult, VideoQuery, VideoRepository};

#[async_trait]
impl VideoRepository for PgStore {
    async fn insert(&self, video: Video) -> StoreResult<Video> {
        let sql = format!(
            r#"
            INSERT INTO videos ({VIDEO_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {VIDEO_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Video>(&sql)
            .bind(video.id)
            .bind(video.owner)
            .bind(&video.video_file)
            .bind(&video.thumbnail)
            .bind(&video.title)
            .bind(&video.description)
            .bind(video.duration)
            .bind(video.views)
            .bind(video.is_published)
            .bind(video.created_at)
            .bind(video.updated_at)
            .fetch_one(self.pool())
            .await
            .map_err(|e| conflict_or_backend(e, || format!("video {}", video.id)))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Video>> {
        let sql = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1");
        let video = sqlx::query_as::<_, Video>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(video)
    }

    async fn find_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Video>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = ANY($1)");
        let videos = sqlx::query_as::<_, Video>(&sql)
            .bind(ids)
            .fetch_all(self.pool())
            .await?;
        Ok(videos)
    }

    async fn search(&self, query: &VideoQuery) -> StoreResult<Vec<Video>> {
        // Sort column and direction come from closed enums, never from input text.
        let sql = format!(
            r#"
            SELECT v.id, v.owner, v.video_file, v.thumbnail, v.title, v.description,
                   v.duration, v.views, v.is_published, v.created_at, v.updated_at
            FROM videos v
            JOIN users u ON u.id = v.owner
            WHERE ($1::TEXT IS NULL OR v.title ~* $1 OR v.description ~* $1)
              AND ($2::UUID IS NULL OR v.owner = $2)
            ORDER BY v.{column} {direction}, v.id ASC
            LIMIT $3 OFFSET $4
            "#,
            column = query.sort.field.column(),
            direction = query.sort.direction.sql(),
        );

        // `~*` reads the pattern as a PostgreSQL ARE; `TextSearch` only admits
        // syntax that means the same there as in the `regex` crate
        let videos = sqlx::query_as::<_, Video>(&sql)
            .bind(query.search.pattern())
            .bind(query.owner)
            .bind(query.page.limit() as i64)
            .bind(query.page.offset() as i64)
            .fetch_all(self.pool())
            .await?;
        Ok(videos)
    }

    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Video>> {
        let sql = format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE owner = $1 ORDER BY created_at DESC, id ASC"
        );
        let videos = sqlx::query_as::<_, Video>(&sql)
            .bind(owner)
            .fetch_all(self.pool())
            .await?;
        Ok(videos)
    }

    async fn totals_for_owner(&self, owner: Uuid) -> StoreResult<Option<VideoTotals>> {
        let totals = sqlx::query_as::<_, VideoTotals>(
            r#"
            SELECT COUNT(*) AS total_videos,
                   COALESCE(SUM(views), 0)::BIGINT AS total_views
            FROM videos
            WHERE owner = $1
            "#,
        )
        .bind(owner)
        .fetch_one(self.pool())
        .await?;

        Ok((totals.total_videos > 0).then_some(totals))
    }

    async fn update(&self, video: &Video) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET video_file = $2, thumbnail = $3, title = $4, description = $5,
                duration = $6, views = $7, is_published = $8, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(video.id)
        .bind(&video.video_file)
        .bind(&video.thumbnail)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.duration)
        .bind(video.views)
        .bind(video.is_published)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r#"
            DELETE FROM likes
            WHERE (target_kind = 'video' AND target_id = $1)
               OR (target_kind = 'comment'
                   AND target_id IN (SELECT id FROM comments WHERE video = $1))
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM comments WHERE video = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE playlists
            SET videos = array_remove(videos, $1), updated_at = NOW()
            WHERE $1 = ANY(videos)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
