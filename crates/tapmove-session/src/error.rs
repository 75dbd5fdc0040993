use tapmove_navigation::NavigationError;
use thiserror::Error;

use crate::{EntityId, UserId};

/// Why a lock could not be taken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("entity {entity} is locked by {owner}")]
    Held { entity: EntityId, owner: UserId },
    #[error("lock on {entity} changed while acquiring")]
    Conflict { entity: EntityId },
}

/// Errors surfaced by the movement controller.
///
/// User-facing variants have already been reported through the notifier by
/// the time the caller sees them. `GeometryQueryFailure` and `UnknownEntity`
/// mean the host supplied incomplete scene data; they are logged, not shown.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("no permission to move {0}")]
    PermissionDenied(EntityId),
    #[error("{entity} is being moved by {owner}")]
    EntityLocked { entity: EntityId, owner: String },
    #[error("destination is outside the scene")]
    DestinationOutOfBounds,
    #[error("no path to destination")]
    PathUnreachable,
    #[error("path is blocked by a wall")]
    MovementBlocked,
    #[error("movement failed: {0}")]
    MovementExecutionFailure(String),
    #[error("scene query failed: {0}")]
    GeometryQueryFailure(#[from] NavigationError),
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
    #[error("movement interrupted by {0}")]
    Interrupted(String),
}
