use async_trait::async_trait;
use uuid::Uuid;

use super::{conflict_or_backend, PgStore};
use crate::domain::{Subscription, SubscriptionKey};
use crate::repository::{RelationRepository, StoreResult, SubscriptionRepository};

#[async_trait]
impl RelationRepository<Subscription> for PgStore {
    async fn find_by_key(&self, key: &SubscriptionKey) -> StoreResult<Option<Subscription>> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, subscriber, channel, created_at
            FROM subscriptions
            WHERE subscriber = $1 AND channel = $2
            "#,
        )
        .bind(key.subscriber)
        .bind(key.channel)
        .fetch_optional(self.pool())
        .await?;
        Ok(subscription)
    }

    async fn insert(&self, subscription: Subscription) -> StoreResult<Subscription> {
        sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (id, subscriber, channel, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, subscriber, channel, created_at
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.subscriber)
        .bind(subscription.channel)
        .bind(subscription.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            conflict_or_backend(e, || {
                format!(
                    "subscription of {} to {}",
                    subscription.subscriber, subscription.channel
                )
            })
        })
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SubscriptionRepository for PgStore {
    async fn list_by_channel(&self, channel: Uuid) -> StoreResult<Vec<Subscription>> {
        let subscriptions = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, subscriber, channel, created_at
            FROM subscriptions
            WHERE channel = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(channel)
        .fetch_all(self.pool())
        .await?;
        Ok(subscriptions)
    }

    async fn list_by_subscriber(&self, subscriber: Uuid) -> StoreResult<Vec<Subscription>> {
        let subscriptions = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, subscriber, channel, created_at
            FROM subscriptions
            WHERE subscriber = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(subscriber)
        .fetch_all(self.pool())
        .await?;
        Ok(subscriptions)
    }

    async fn count_for_channel(&self, channel: Uuid) -> StoreResult<Option<i64>> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE channel = $1")
            .bind(channel)
            .fetch_one(self.pool())
            .await?;
        Ok((count > 0).then_some(count))
    }
}
