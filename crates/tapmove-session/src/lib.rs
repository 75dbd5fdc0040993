//! Tap-to-move sessions: per-client movement state machine, replicated
//! token locks and the ports through which the hosting tabletop is driven.

pub mod bus;
pub mod clock;
pub mod config;
pub mod error;
pub mod host;
pub mod input;
pub mod lock;
pub mod protocol;
pub mod session;

pub use bus::{SessionEvent, SessionEventBus, Topic};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SessionConfig;
pub use error::{LockError, SessionError};
pub use host::{EntityInfo, Identity, Notice, Notifier, PathOverlay, SceneHost};
pub use input::{InputAdapter, InputMode, PointerEvent, Routed};
pub use lock::{InMemoryLockStore, LockPolicy, LockStore, TokenLock};
pub use protocol::{LockCoordinator, LockMessage};
pub use session::{HostPorts, MovementSession, MovementState, PathPreview, TapMoveController, TapOutcome};

/// Token identifier in the host's scene.
pub type EntityId = String;

/// User identifier.
pub type UserId = String;

/// Identifies one movement session.
pub type SessionId = uuid::Uuid;
