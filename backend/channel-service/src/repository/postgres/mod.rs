//! PostgreSQL entity store.
//!
//! Schema lives in `migrations/`. Relation uniqueness is enforced by unique
//! indexes; a violated index surfaces as [`StoreError::Conflict`].

mod comments;
mod likes;
mod playlists;
mod subscriptions;
mod tweets;
mod users;
mod videos;

use sqlx::PgPool;

use super::StoreError;

pub(crate) const VIDEO_COLUMNS: &str = "id, owner, video_file, thumbnail, title, description, \
     duration, views, is_published, created_at, updated_at";

pub(crate) const PLAYLIST_COLUMNS: &str =
    "id, name, description, owner, videos, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a unique-index violation onto `Conflict`
pub(crate) fn conflict_or_backend(err: sqlx::Error, what: impl FnOnce() -> String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(what()),
        _ => StoreError::Backend(err),
    }
}

/// Run embedded migrations
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
