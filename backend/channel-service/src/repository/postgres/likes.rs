use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{conflict_or_backend, PgStore};
use crate::domain::{Like, LikeKey, LikeTarget};
use crate::repository::{LikeRepository, RelationRepository, StoreError, StoreResult};

/// Likes are stored as (target_kind, target_id)
#[derive(sqlx::FromRow)]
struct LikeRow {
    id: Uuid,
    liked_by: Uuid,
    target_kind: String,
    target_id: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<LikeRow> for Like {
    type Error = StoreError;

    fn try_from(row: LikeRow) -> Result<Self, Self::Error> {
        let target = LikeTarget::from_parts(&row.target_kind, row.target_id).ok_or_else(|| {
            StoreError::Corrupt(format!("like {} has target kind '{}'", row.id, row.target_kind))
        })?;
        Ok(Like {
            id: row.id,
            liked_by: row.liked_by,
            target,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl RelationRepository<Like> for PgStore {
    async fn find_by_key(&self, key: &LikeKey) -> StoreResult<Option<Like>> {
        let row = sqlx::query_as::<_, LikeRow>(
            r#"
            SELECT id, liked_by, target_kind, target_id, created_at
            FROM likes
            WHERE liked_by = $1 AND target_kind = $2 AND target_id = $3
            "#,
        )
        .bind(key.liked_by)
        .bind(key.target.kind())
        .bind(key.target.id())
        .fetch_optional(self.pool())
        .await?;

        row.map(Like::try_from).transpose()
    }

    async fn insert(&self, like: Like) -> StoreResult<Like> {
        let row = sqlx::query_as::<_, LikeRow>(
            r#"
            INSERT INTO likes (id, liked_by, target_kind, target_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, liked_by, target_kind, target_id, created_at
            "#,
        )
        .bind(like.id)
        .bind(like.liked_by)
        .bind(like.target.kind())
        .bind(like.target.id())
        .bind(like.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            conflict_or_backend(e, || {
                format!(
                    "like by {} on {} {}",
                    like.liked_by,
                    like.target.kind(),
                    like.target.id()
                )
            })
        })?;

        Like::try_from(row)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LikeRepository for PgStore {
    async fn list_video_likes(&self, liked_by: Uuid) -> StoreResult<Vec<Like>> {
        let rows = sqlx::query_as::<_, LikeRow>(
            r#"
            SELECT id, liked_by, target_kind, target_id, created_at
            FROM likes
            WHERE liked_by = $1 AND target_kind = 'video'
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(liked_by)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(Like::try_from).collect()
    }

    async fn count_received(&self, owner: Uuid) -> StoreResult<Option<i64>> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM likes l
            LEFT JOIN videos v ON l.target_kind = 'video' AND v.id = l.target_id
            LEFT JOIN tweets t ON l.target_kind = 'tweet' AND t.id = l.target_id
            LEFT JOIN comments c ON l.target_kind = 'comment' AND c.id = l.target_id
            WHERE v.owner = $1 OR t.owner = $1 OR c.owner = $1
            "#,
        )
        .bind(owner)
        .fetch_one(self.pool())
        .await?;

        Ok((count > 0).then_some(count))
    }
}
