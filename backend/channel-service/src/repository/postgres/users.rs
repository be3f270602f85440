use async_trait::async_trait;
use uuid::Uuid;

use super::{conflict_or_backend, PgStore};
use crate::domain::User;
use crate::repository::{StoreResult, UserRepository};

#[async_trait]
impl UserRepository for PgStore {
    async fn insert(&self, user: User) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, full_name, avatar, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, full_name, avatar, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(&user.avatar)
        .bind(user.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(|e| conflict_or_backend(e, || format!("user {}", user.username)))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, full_name, avatar, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    async fn find_many(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, full_name, avatar, created_at FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(self.pool())
        .await?;
        Ok(users)
    }
}
