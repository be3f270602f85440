//! Binary-state relation toggling.
//!
//! A toggle reads the relation by its exact key, then inserts it when absent
//! or deletes that very row when present. Toggles of the same key are
//! serialized through a per-key async lock; the stores additionally reject a
//! second row for one key, so a duplicate from another process surfaces as a
//! persistence error instead of a second relation.

use dashmap::DashMap;
use serde::Serialize;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::Relation;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::repository::RelationRepository;

/// Outcome of a toggle, carrying the affected relation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "relation", rename_all = "lowercase")]
pub enum Toggled<R> {
    Created(R),
    Removed(R),
}

impl<R> Toggled<R> {
    pub fn is_created(&self) -> bool {
        matches!(self, Toggled::Created(_))
    }

    pub fn relation(&self) -> &R {
        match self {
            Toggled::Created(r) | Toggled::Removed(r) => r,
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            Toggled::Created(_) => "created",
            Toggled::Removed(_) => "removed",
        }
    }
}

type LockTable<K> = DashMap<K, Arc<Mutex<()>>>;

/// A claim on one key's lock-table entry. Dropping the last claim removes
/// the entry, including when the toggle future is cancelled.
struct LockSlot<'a, K: Eq + Hash> {
    locks: &'a LockTable<K>,
    key: K,
    lock: Arc<Mutex<()>>,
}

impl<'a, K: Eq + Hash + Copy> LockSlot<'a, K> {
    fn claim(locks: &'a LockTable<K>, key: K) -> Self {
        let lock = locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        Self { locks, key, lock }
    }
}

impl<K: Eq + Hash> Drop for LockSlot<'_, K> {
    fn drop(&mut self) {
        // The table and this claim are the only holders left
        self.locks.remove_if(&self.key, |_, l| {
            Arc::ptr_eq(l, &self.lock) && Arc::strong_count(l) == 2
        });
    }
}

pub struct ToggleEngine<R: Relation> {
    locks: LockTable<R::Key>,
}

impl<R: Relation> Default for ToggleEngine<R> {
    fn default() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }
}

impl<R: Relation> ToggleEngine<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn toggle<S>(&self, store: &S, key: R::Key) -> Result<Toggled<R>>
    where
        S: RelationRepository<R> + ?Sized,
    {
        let kind = R::kind_of(&key).as_str();

        let slot = LockSlot::claim(&self.locks, key);
        let guard = slot.lock.lock().await;

        let result = self.flip(store, key).await;

        drop(guard);
        drop(slot);

        match &result {
            Ok(toggled) => metrics::record_toggle(kind, toggled.outcome()),
            Err(_) => metrics::record_toggle(kind, "failed"),
        }
        result
    }

    async fn flip<S>(&self, store: &S, key: R::Key) -> Result<Toggled<R>>
    where
        S: RelationRepository<R> + ?Sized,
    {
        match store.find_by_key(&key).await? {
            None => {
                let created = store.insert(R::create(key)).await?;
                debug!(key = ?key, id = %created.id(), "Relation created");
                Ok(Toggled::Created(created))
            }
            Some(existing) => {
                if !store.delete_by_id(existing.id()).await? {
                    return Err(AppError::Persistence(format!(
                        "relation {} vanished before it could be removed",
                        existing.id()
                    )));
                }
                debug!(key = ?key, id = %existing.id(), "Relation removed");
                Ok(Toggled::Removed(existing))
            }
        }
    }

    #[cfg(test)]
    fn held_locks(&self) -> usize {
        self.locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Like, LikeKey, LikeTarget, Subscription, SubscriptionKey};
    use crate::repository::memory::MemoryStore;
    use crate::repository::StoreResult;
    use async_trait::async_trait;
    use std::time::Duration;
    use uuid::Uuid;

    /// Never answers a lookup
    struct StalledStore;

    #[async_trait]
    impl RelationRepository<Like> for StalledStore {
        async fn find_by_key(&self, _key: &LikeKey) -> StoreResult<Option<Like>> {
            std::future::pending().await
        }

        async fn insert(&self, like: Like) -> StoreResult<Like> {
            Ok(like)
        }

        async fn delete_by_id(&self, _id: Uuid) -> StoreResult<bool> {
            Ok(true)
        }
    }

    fn like_key() -> LikeKey {
        LikeKey {
            liked_by: Uuid::new_v4(),
            target: LikeTarget::Video(Uuid::new_v4()),
        }
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let store = MemoryStore::new();
        let engine = ToggleEngine::<Like>::new();
        let key = like_key();

        let first = engine.toggle(&store, key).await.unwrap();
        assert!(first.is_created());
        let second = engine.toggle(&store, key).await.unwrap();
        assert_eq!(second, Toggled::Removed(first.relation().clone()));

        let found = RelationRepository::<Like>::find_by_key(&store, &key).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_third_toggle_creates_new_relation() {
        let store = MemoryStore::new();
        let engine = ToggleEngine::<Subscription>::new();
        let key = SubscriptionKey {
            subscriber: Uuid::new_v4(),
            channel: Uuid::new_v4(),
        };

        let first = engine.toggle(&store, key).await.unwrap();
        engine.toggle(&store, key).await.unwrap();
        let third = engine.toggle(&store, key).await.unwrap();

        assert!(third.is_created());
        assert_ne!(first.relation().id, third.relation().id);
    }

    #[tokio::test]
    async fn test_lock_entries_are_released() {
        let store = MemoryStore::new();
        let engine = ToggleEngine::<Like>::new();

        engine.toggle(&store, like_key()).await.unwrap();
        engine.toggle(&store, like_key()).await.unwrap();
        assert_eq!(engine.held_locks(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_toggle_releases_lock_entry() {
        let engine = ToggleEngine::<Like>::new();
        let key = like_key();

        let stalled = tokio::time::timeout(Duration::from_millis(20), engine.toggle(&StalledStore, key)).await;
        assert!(stalled.is_err());
        assert_eq!(engine.held_locks(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_releases_lock_entry() {
        let store = MemoryStore::new();
        let engine = ToggleEngine::<Like>::new();
        let key = like_key();

        // One toggle holds the key forever, a second one queues behind it
        let both = async {
            tokio::join!(engine.toggle(&StalledStore, key), engine.toggle(&store, key))
        };
        assert!(tokio::time::timeout(Duration::from_millis(20), both).await.is_err());
        assert_eq!(engine.held_locks(), 0);

        // The key is usable again
        assert!(engine.toggle(&store, key).await.unwrap().is_created());
        assert_eq!(engine.held_locks(), 0);
    }
}
