use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::domain::Comment;
use crate::pipeline::Page;
use crate::repository::{CommentRepository, StoreResult};

#[async_trait]
impl CommentRepository for PgStore {
    async fn insert(&self, comment: Comment) -> StoreResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, content, video, owner, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, content, video, owner, created_at, updated_at
            "#,
        )
        .bind(comment.id)
        .bind(&comment.content)
        .bind(comment.video)
        .bind(comment.owner)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .fetch_one(self.pool())
        .await?;
        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            "SELECT id, content, video, owner, created_at, updated_at FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(comment)
    }

    async fn list_for_video(&self, video: Uuid, page: Page) -> StoreResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.content, c.video, c.owner, c.created_at, c.updated_at
            FROM comments c
            JOIN users u ON u.id = c.owner
            WHERE c.video = $1
            ORDER BY c.created_at ASC, c.id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(video)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(self.pool())
        .await?;
        Ok(comments)
    }

    async fn update(&self, comment: &Comment) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE comments SET content = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(comment.id)
        .bind(&comment.content)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM likes WHERE target_kind = 'comment' AND target_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
