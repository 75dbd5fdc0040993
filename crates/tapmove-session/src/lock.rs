//! Replicated per-entity movement locks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::bus::Topic;
use crate::{EntityId, UserId};

/// Locks older than this are stale and may be taken over by anyone.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(5 * 60);

/// Lock record held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLock {
    pub owner: UserId,
    /// Milliseconds since the Unix epoch.
    pub acquired_at: u64,
}

impl TokenLock {
    pub fn new(owner: impl Into<UserId>, acquired_at: u64) -> Self {
        Self { owner: owner.into(), acquired_at }
    }

    /// Strictly older than `stale_after`.
    pub fn is_stale(&self, now_ms: u64, stale_after: Duration) -> bool {
        now_ms.saturating_sub(self.acquired_at) > stale_after.as_millis() as u64
    }

    /// Last-write-wins ordering between two records for the same entity.
    /// Equal timestamps fall back to the owner id so every replica agrees.
    pub fn supersedes(&self, other: &TokenLock) -> bool {
        (self.acquired_at, &self.owner) > (other.acquired_at, &other.owner)
    }
}

/// Lock rules applied by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockPolicy {
    /// Age after which a lock is stale, in milliseconds.
    pub stale_after_ms: u64,
    /// Whether a GM may take any lock at any time.
    pub gm_override: bool,
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            stale_after_ms: DEFAULT_STALE_AFTER.as_millis() as u64,
            gm_override: true,
        }
    }
}

impl LockPolicy {
    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms)
    }
}

/// Change notification from [`LockStore::watch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockChange {
    pub entity: EntityId,
    pub lock: Option<TokenLock>,
}

/// Document-level key-value store of entity locks.
pub trait LockStore: Send + Sync {
    fn get(&self, entity: &EntityId) -> Option<TokenLock>;

    fn set(&self, entity: &EntityId, lock: TokenLock);

    fn clear(&self, entity: &EntityId);

    /// Replaces the record with `new` only if it still equals `expected`.
    /// On mismatch the current record is returned.
    fn compare_and_swap(
        &self,
        entity: &EntityId,
        expected: Option<&TokenLock>,
        new: Option<TokenLock>,
    ) -> Result<(), Option<TokenLock>>;

    fn watch(&self) -> broadcast::Receiver<Arc<LockChange>>;
}

/// In-process [`LockStore`] shared by every client of one scene.
#[derive(Debug)]
pub struct InMemoryLockStore {
    records: RwLock<HashMap<EntityId, TokenLock>>,
    changes: Topic<LockChange>,
}

impl Default for InMemoryLockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLockStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            changes: Topic::new(64),
        }
    }

    pub fn snapshot(&self) -> HashMap<EntityId, TokenLock> {
        (*self.records.read()).clone()
    }

    fn notify(&self, entity: &EntityId, lock: Option<TokenLock>) {
        self.changes.publish(LockChange { entity: entity.clone(), lock });
    }
}

impl LockStore for InMemoryLockStore {
    fn get(&self, entity: &EntityId) -> Option<TokenLock> {
        self.records.read().get(entity).cloned()
    }

    fn set(&self, entity: &EntityId, lock: TokenLock) {
        self.records.write().insert(entity.clone(), lock.clone());
        self.notify(entity, Some(lock));
    }

    fn clear(&self, entity: &EntityId) {
        if self.records.write().remove(entity).is_some() {
            self.notify(entity, None);
        }
    }

    fn compare_and_swap(
        &self,
        entity: &EntityId,
        expected: Option<&TokenLock>,
        new: Option<TokenLock>,
    ) -> Result<(), Option<TokenLock>> {
        let mut records = self.records.write();
        let current = records.get(entity);
        if current != expected {
            return Err(current.cloned());
        }
        match &new {
            Some(lock) => {
                records.insert(entity.clone(), lock.clone());
            }
            None => {
                records.remove(entity);
            }
        }
        drop(records);
        self.notify(entity, new);
        Ok(())
    }

    fn watch(&self) -> broadcast::Receiver<Arc<LockChange>> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: u64 = 60_000;

    #[test]
    fn test_stale_boundary_is_exclusive() {
        let lock = TokenLock::new("alice", 0);
        let stale_after = DEFAULT_STALE_AFTER;
        assert!(!lock.is_stale(5 * MINUTE - 1, stale_after));
        assert!(!lock.is_stale(5 * MINUTE, stale_after));
        assert!(lock.is_stale(5 * MINUTE + 1, stale_after));
        // Clock skew never makes a lock stale.
        assert!(!TokenLock::new("alice", 10 * MINUTE).is_stale(0, stale_after));
    }

    #[test]
    fn test_supersedes_is_total() {
        let older = TokenLock::new("bob", 10);
        let newer = TokenLock::new("alice", 20);
        assert!(newer.supersedes(&older));
        assert!(!older.supersedes(&newer));

        let a = TokenLock::new("alice", 10);
        let b = TokenLock::new("bob", 10);
        assert!(b.supersedes(&a) ^ a.supersedes(&b));
        assert!(!a.supersedes(&a.clone()));
    }

    #[test]
    fn test_compare_and_swap() {
        let store = InMemoryLockStore::new();
        let entity: EntityId = "goblin".into();
        let alice = TokenLock::new("alice", 1);
        let bob = TokenLock::new("bob", 2);

        assert_eq!(store.compare_and_swap(&entity, None, Some(alice.clone())), Ok(()));
        assert_eq!(store.compare_and_swap(&entity, None, Some(bob.clone())), Err(Some(alice.clone())));
        assert_eq!(store.compare_and_swap(&entity, Some(&alice), Some(bob.clone())), Ok(()));
        assert_eq!(store.get(&entity), Some(bob.clone()));
        assert_eq!(store.compare_and_swap(&entity, Some(&bob), None), Ok(()));
        assert_eq!(store.get(&entity), None);
    }

    #[tokio::test]
    async fn test_watch_reports_changes() {
        let store = InMemoryLockStore::new();
        let mut rx = store.watch();
        let entity: EntityId = "goblin".into();

        store.set(&entity, TokenLock::new("alice", 1));
        store.clear(&entity);
        // Clearing an empty slot is silent.
        store.clear(&entity);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.lock.as_ref().map(|l| l.owner.as_str()), Some("alice"));
        let second = rx.recv().await.unwrap();
        assert_eq!(second.lock, None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_policy_defaults() {
        let policy = LockPolicy::default();
        assert_eq!(policy.stale_after(), Duration::from_secs(300));
        assert!(policy.gm_override);
    }
}
