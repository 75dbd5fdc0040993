//! Lock coordination between clients.
//!
//! The [`LockStore`] is the shared source of truth and gives exclusivity
//! through compare-and-swap. [`LockMessage`]s broadcast on a [`Topic`] keep
//! each client's local mirror current and tell a client when a lock it held
//! was taken over, so its session can be interrupted.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::bus::Topic;
use crate::clock::Clock;
use crate::error::LockError;
use crate::host::Identity;
use crate::lock::{LockPolicy, LockStore, TokenLock};
use crate::{EntityId, UserId};

/// Wire message exchanged between clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LockMessage {
    Lock {
        entity: EntityId,
        actor: UserId,
        timestamp: u64,
    },
    Unlock {
        entity: EntityId,
        actor: UserId,
        timestamp: u64,
    },
    Override {
        entity: EntityId,
        actor: UserId,
        actor_name: Option<String>,
        previous_owner: Option<UserId>,
        timestamp: u64,
    },
}

impl LockMessage {
    pub fn entity(&self) -> &EntityId {
        match self {
            LockMessage::Lock { entity, .. }
            | LockMessage::Unlock { entity, .. }
            | LockMessage::Override { entity, .. } => entity,
        }
    }

    pub fn actor(&self) -> &UserId {
        match self {
            LockMessage::Lock { actor, .. }
            | LockMessage::Unlock { actor, .. }
            | LockMessage::Override { actor, .. } => actor,
        }
    }
}

/// A lock this client held was taken by someone else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOverride {
    pub entity: EntityId,
    pub by: UserId,
    pub by_name: Option<String>,
}

/// Successful acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquired {
    pub lock: TokenLock,
    /// Owner of the lock that was replaced, if any.
    pub overridden: Option<UserId>,
}

/// Per-client view of the lock protocol.
pub struct LockCoordinator {
    identity: Identity,
    store: Arc<dyn LockStore>,
    topic: Topic<LockMessage>,
    inbox: broadcast::Receiver<Arc<LockMessage>>,
    mirror: HashMap<EntityId, TokenLock>,
    // Newest (timestamp, actor) applied per entity. Outlives unlocks.
    applied: HashMap<EntityId, (u64, UserId)>,
    pending: Vec<RemoteOverride>,
    policy: LockPolicy,
    clock: Arc<dyn Clock>,
}

impl LockCoordinator {
    pub fn new(
        identity: Identity,
        store: Arc<dyn LockStore>,
        topic: Topic<LockMessage>,
        policy: LockPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let inbox = topic.subscribe();
        Self {
            identity,
            store,
            topic,
            inbox,
            mirror: HashMap::new(),
            applied: HashMap::new(),
            pending: Vec::new(),
            policy,
            clock,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn policy(&self) -> &LockPolicy {
        &self.policy
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Local mirror entry for `entity`.
    pub fn mirrored(&self, entity: &EntityId) -> Option<&TokenLock> {
        self.mirror.get(entity)
    }

    /// Current store record for `entity`.
    pub fn current(&self, entity: &EntityId) -> Option<TokenLock> {
        self.store.get(entity)
    }

    /// Returns `true` if `lock` may be replaced by this identity.
    pub fn can_take(&self, lock: &TokenLock) -> bool {
        lock.owner == self.identity.user_id
            || (self.identity.is_gm && self.policy.gm_override)
            || lock.is_stale(self.clock.now_ms(), self.policy.stale_after())
    }

    /// Takes the lock on `entity` for this identity.
    ///
    /// # Errors
    /// [`LockError::Held`] if another identity holds a fresh lock and this
    /// identity may not override it, [`LockError::Conflict`] if the record
    /// changed between the read and the write.
    pub fn acquire(&mut self, entity: &EntityId) -> Result<Acquired, LockError> {
        let now = self.clock.now_ms();
        let current = self.store.get(entity);

        if let Some(lock) = &current {
            if !self.can_take(lock) {
                return Err(LockError::Held { entity: entity.clone(), owner: lock.owner.clone() });
            }
        }

        let lock = TokenLock::new(self.identity.user_id.clone(), now);
        self.store
            .compare_and_swap(entity, current.as_ref(), Some(lock.clone()))
            .map_err(|actual| match actual {
                Some(held) if !self.can_take(&held) => LockError::Held { entity: entity.clone(), owner: held.owner },
                _ => LockError::Conflict { entity: entity.clone() },
            })?;
        self.mirror.insert(entity.clone(), lock.clone());
        let me = self.identity.user_id.clone();
        self.record(entity, now, &me);

        let overridden = current.map(|l| l.owner).filter(|owner| *owner != self.identity.user_id);
        let message = match &overridden {
            Some(previous) => {
                info!(%entity, previous_owner = %previous, by = %self.identity.user_id, "Lock overridden");
                LockMessage::Override {
                    entity: entity.clone(),
                    actor: self.identity.user_id.clone(),
                    actor_name: Some(self.identity.name.clone()),
                    previous_owner: Some(previous.clone()),
                    timestamp: now,
                }
            }
            None => {
                info!(%entity, owner = %self.identity.user_id, "Lock acquired");
                LockMessage::Lock { entity: entity.clone(), actor: self.identity.user_id.clone(), timestamp: now }
            }
        };
        self.topic.publish(message);

        Ok(Acquired { lock, overridden })
    }

    /// Releases `entity` if this identity still owns it. Returns whether it did.
    pub fn release(&mut self, entity: &EntityId) -> bool {
        let Some(current) = self.store.get(entity) else {
            self.mirror.remove(entity);
            return false;
        };
        if current.owner != self.identity.user_id {
            debug!(%entity, owner = %current.owner, "Not releasing lock held by another identity");
            return false;
        }
        if self.store.compare_and_swap(entity, Some(&current), None).is_err() {
            debug!(%entity, "Lock changed before release");
            return false;
        }
        self.mirror.remove(entity);
        let now = self.clock.now_ms();
        let me = self.identity.user_id.clone();
        self.record(entity, now, &me);
        info!(%entity, owner = %self.identity.user_id, "Lock released");
        self.topic.publish(LockMessage::Unlock {
            entity: entity.clone(),
            actor: self.identity.user_id.clone(),
            timestamp: now,
        });
        true
    }

    /// Applies one remote message to the local mirror.
    ///
    /// Self-originated echoes are ignored. A message older than the newest
    /// one already applied to its entity is dropped, so redelivery and
    /// reordering leave the mirror unchanged. Returns an override notice when
    /// the message takes a lock this identity held.
    pub fn apply(&mut self, message: &LockMessage) -> Option<RemoteOverride> {
        if *message.actor() == self.identity.user_id {
            return None;
        }

        match message {
            LockMessage::Lock { entity, actor, timestamp } => {
                if self.is_newer(entity, *timestamp, actor) {
                    self.mirror.insert(entity.clone(), TokenLock::new(actor.clone(), *timestamp));
                    self.record(entity, *timestamp, actor);
                }
                None
            }
            LockMessage::Unlock { entity, actor, timestamp } => {
                let owned_by_sender = self.mirror.get(entity).is_some_and(|held| held.owner == *actor);
                if owned_by_sender && self.is_newer(entity, *timestamp, actor) {
                    self.mirror.remove(entity);
                    self.record(entity, *timestamp, actor);
                }
                None
            }
            LockMessage::Override { entity, actor, actor_name, previous_owner, timestamp } => {
                let held = self.mirror.get(entity).cloned();
                // An override of the lock we currently mirror is its successor
                // even when the timestamps tie.
                let replaces_held = held.as_ref().is_some_and(|held| {
                    previous_owner.as_ref() == Some(&held.owner) && *timestamp >= held.acquired_at
                });
                if !replaces_held && !self.is_newer(entity, *timestamp, actor) {
                    debug!(%entity, %actor, timestamp, "Dropping outdated override");
                    return None;
                }
                self.mirror.insert(entity.clone(), TokenLock::new(actor.clone(), *timestamp));
                self.record(entity, *timestamp, actor);

                let was_mine = held.is_some_and(|held| held.owner == self.identity.user_id && *timestamp >= held.acquired_at);
                was_mine.then(|| RemoteOverride {
                    entity: entity.clone(),
                    by: actor.clone(),
                    by_name: actor_name.clone(),
                })
            }
        }
    }

    fn is_newer(&self, entity: &EntityId, timestamp: u64, actor: &UserId) -> bool {
        self.applied
            .get(entity)
            .is_none_or(|(ts, by)| (timestamp, actor) > (*ts, by))
    }

    fn record(&mut self, entity: &EntityId, timestamp: u64, actor: &UserId) {
        if self.is_newer(entity, timestamp, actor) {
            self.applied.insert(entity.clone(), (timestamp, actor.clone()));
        }
    }

    /// Drains every queued message and returns the overrides that hit this
    /// identity, oldest first.
    pub fn poll(&mut self) -> Vec<RemoteOverride> {
        loop {
            match self.inbox.try_recv() {
                Ok(message) => {
                    if let Some(hit) = self.apply(&message) {
                        self.pending.push(hit);
                    }
                }
                Err(TryRecvError::Lagged(n)) => {
                    warn!(skipped = n, "Lock receiver lagged, resyncing mirror from store");
                    self.resync();
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        std::mem::take(&mut self.pending)
    }

    // After a lag the mirror may have missed an override. Anything we think we
    // hold that the store says someone else holds is reported as overridden.
    fn resync(&mut self) {
        let me = self.identity.user_id.clone();
        let entities: Vec<EntityId> = self.mirror.keys().cloned().collect();
        for entity in entities {
            let was_mine = self.mirror.get(&entity).is_some_and(|l| l.owner == me);
            match self.store.get(&entity) {
                Some(lock) => {
                    if was_mine && lock.owner != me {
                        self.pending.push(RemoteOverride { entity: entity.clone(), by: lock.owner.clone(), by_name: None });
                    }
                    self.record(&entity, lock.acquired_at, &lock.owner);
                    self.mirror.insert(entity, lock);
                }
                None => {
                    self.mirror.remove(&entity);
                }
            }
        }
    }
}
