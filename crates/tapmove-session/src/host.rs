//! Ports to the hosting tabletop.
//!
//! The controller never touches rendering, animation or chat directly. It
//! reads scene data and drives side effects through these traits.

use std::fmt;

use async_trait::async_trait;
use tapmove_geometry::WorldPoint;
use tapmove_navigation::WorldContext;

use crate::session::PathPreview;
use crate::{EntityId, UserId};

/// The local user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub name: String,
    pub is_gm: bool,
}

impl Identity {
    pub fn new(user_id: impl Into<UserId>, name: impl Into<String>, is_gm: bool) -> Self {
        Self { user_id: user_id.into(), name: name.into(), is_gm }
    }
}

/// What the controller needs to know about a token.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityInfo {
    pub id: EntityId,
    pub name: String,
    /// Center of the token in world space.
    pub position: WorldPoint,
    pub owners: Vec<UserId>,
    /// Available movement in grid units, if tracked.
    pub movement: Option<f64>,
}

impl EntityInfo {
    /// Owners and GMs may move a token.
    pub fn can_be_moved_by(&self, identity: &Identity) -> bool {
        identity.is_gm || self.owners.contains(&identity.user_id)
    }
}

/// User-facing notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    PermissionDenied { entity: String },
    EntityLocked { entity: String, owner: String },
    DestinationOutOfBounds,
    PathUnreachable,
    MovementBlocked,
    MovementFailed { reason: String },
    LockOverridden { entity: String, by: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::PermissionDenied { entity } => write!(f, "You don't have permission to move {entity}."),
            Notice::EntityLocked { entity, owner } => write!(f, "{entity} is being moved by {owner}."),
            Notice::DestinationOutOfBounds => write!(f, "That destination is outside the scene."),
            Notice::PathUnreachable => write!(f, "No path to that destination."),
            Notice::MovementBlocked => write!(f, "The path is blocked by a wall."),
            Notice::MovementFailed { reason } => write!(f, "Movement failed: {reason}"),
            Notice::LockOverridden { entity, by } => write!(f, "{by} took control of {entity}."),
        }
    }
}

/// Scene data and token animation.
#[async_trait]
pub trait SceneHost: Send + Sync {
    /// Snapshot of grid, bounds and walls for the active scene.
    fn world(&self) -> WorldContext;

    fn entity(&self, id: &EntityId) -> Option<EntityInfo>;

    /// Topmost token whose footprint contains `point`.
    fn entity_at(&self, point: WorldPoint) -> Option<EntityId>;

    fn screen_to_world(&self, x: f64, y: f64) -> WorldPoint;

    fn user_name(&self, id: &UserId) -> Option<String>;

    /// Moves the token to `to`, resolving once the animation has finished.
    async fn move_entity(&self, id: &EntityId, to: WorldPoint) -> anyhow::Result<()>;
}

/// Preview overlay drawn over the grid.
pub trait PathOverlay: Send + Sync {
    fn show(&self, preview: &PathPreview);
    fn clear(&self);
}

/// Notifications and chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    async fn post_chat(&self, message: String) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_or_gm_may_move() {
        let entity = EntityInfo {
            id: "goblin".into(),
            name: "Goblin".into(),
            position: WorldPoint::new(50.0, 50.0),
            owners: vec!["alice".into()],
            movement: Some(30.0),
        };
        assert!(entity.can_be_moved_by(&Identity::new("alice", "Alice", false)));
        assert!(!entity.can_be_moved_by(&Identity::new("bob", "Bob", false)));
        assert!(entity.can_be_moved_by(&Identity::new("gm", "Dungeon Master", true)));
    }

    #[test]
    fn test_notice_text() {
        let notice = Notice::LockOverridden { entity: "Goblin".into(), by: "GM".into() };
        assert_eq!(notice.to_string(), "GM took control of Goblin.");
    }
}
