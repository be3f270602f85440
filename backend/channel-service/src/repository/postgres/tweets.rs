use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::domain::Tweet;
use crate::repository::{StoreResult, TweetRepository};

#[async_trait]
impl TweetRepository for PgStore {
    async fn insert(&self, tweet: Tweet) -> StoreResult<Tweet> {
        let tweet = sqlx::query_as::<_, Tweet>(
            r#"
            INSERT INTO tweets (id, content, owner, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, content, owner, created_at, updated_at
            "#,
        )
        .bind(tweet.id)
        .bind(&tweet.content)
        .bind(tweet.owner)
        .bind(tweet.created_at)
        .bind(tweet.updated_at)
        .fetch_one(self.pool())
        .await?;
        Ok(tweet)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>(
            "SELECT id, content, owner, created_at, updated_at FROM tweets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(tweet)
    }

    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Tweet>> {
        let tweets = sqlx::query_as::<_, Tweet>(
            r#"
            SELECT id, content, owner, created_at, updated_at
            FROM tweets
            WHERE owner = $1
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .bind(owner)
        .fetch_all(self.pool())
        .await?;
        Ok(tweets)
    }

    async fn update(&self, tweet: &Tweet) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE tweets SET content = $2, updated_at = NOW() WHERE id = $1")
            .bind(tweet.id)
            .bind(&tweet.content)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM likes WHERE target_kind = 'tweet' AND target_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
