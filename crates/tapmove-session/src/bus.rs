use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

use crate::session::MovementState;
use crate::{EntityId, SessionId};

/// Broadcast topic with bounded capacity.
/// `T` must be `Send + Sync` because we hop across threads.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes to every current subscriber. Returns how many received it.
    pub fn publish(&self, msg: T) -> usize {
        self.tx.send(Arc::new(msg)).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}

/// Events emitted by a movement controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged {
        session: SessionId,
        entity: EntityId,
        from: MovementState,
        to: MovementState,
    },
    PreviewUpdated {
        session: SessionId,
        entity: EntityId,
        distance: f64,
    },
    MovementCompleted {
        session: SessionId,
        entity: EntityId,
        distance: f64,
    },
    Interrupted {
        session: SessionId,
        entity: EntityId,
        by: String,
    },
    /// Last event a session-scoped subscriber receives.
    SessionEnded { session: SessionId },
}

impl SessionEvent {
    pub fn session(&self) -> SessionId {
        match self {
            SessionEvent::StateChanged { session, .. }
            | SessionEvent::PreviewUpdated { session, .. }
            | SessionEvent::MovementCompleted { session, .. }
            | SessionEvent::Interrupted { session, .. }
            | SessionEvent::SessionEnded { session } => *session,
        }
    }
}

/// Handle returned by [`SessionEventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug)]
struct Subscriber {
    tx: mpsc::UnboundedSender<SessionEvent>,
    scope: Option<SessionId>,
}

/// Fan-out of [`SessionEvent`]s with explicit subscription lifetimes.
///
/// A subscription is either global or scoped to one session. Scoped
/// subscriptions only see their session's events and are dropped when the
/// session is torn down, which closes the receiver.
#[derive(Debug, Default)]
pub struct SessionEventBus {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<SubscriptionId, Subscriber>>,
}

impl SessionEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, scope: Option<SessionId>) -> (SubscriptionId, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().insert(id, Subscriber { tx, scope });
        (id, rx)
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.lock().remove(&id).is_some()
    }

    pub fn publish(&self, event: SessionEvent) {
        let session = event.session();
        self.subscribers.lock().retain(|_, sub| {
            if sub.scope.is_some_and(|s| s != session) {
                return true;
            }
            sub.tx.send(event.clone()).is_ok()
        });
    }

    /// Removes every subscription scoped to `session`. Returns how many were removed.
    pub fn teardown_session(&self, session: SessionId) -> usize {
        let mut subs = self.subscribers.lock();
        let before = subs.len();
        subs.retain(|_, sub| {
            if sub.scope == Some(session) {
                let _ = sub.tx.send(SessionEvent::SessionEnded { session });
                false
            } else {
                true
            }
        });
        let removed = before - subs.len();
        if removed > 0 {
            debug!(%session, removed, "Session subscriptions torn down");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
