//! The tap-to-move state machine.
//!
//! ```text
//!  Idle --select--> AwaitingDestination --tap--> PreviewingPath --confirm--> ExecutingMovement
//!   ^                  ^   ^                        |  (tap elsewhere: re-preview)  |      |
//!   |                  |   +------ unreachable -----+                              |   failure
//!   |                  +------------------ Error <--------------------------------------+
//!   +---- cancel / scene change / remote override / success -------------------------+
//! ```
//!
//! One [`TapMoveController`] exists per client. It owns at most one
//! [`MovementSession`]; `Idle` means there is none.

use std::fmt;
use std::sync::Arc;

use tapmove_geometry::WorldPoint;
use tapmove_navigation::{CostTier, GridCell, MovementSummary, Oracle, Path, Pathfinder, format_distance};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bus::{SessionEvent, SessionEventBus};
use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::error::{LockError, SessionError};
use crate::host::{Identity, Notice, Notifier, PathOverlay, SceneHost};
use crate::protocol::LockCoordinator;
use crate::{EntityId, SessionId};

/// Workflow state of one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementState {
    Idle,
    AwaitingDestination,
    PreviewingPath,
    ExecutingMovement,
    /// Execution failed. Returns to `AwaitingDestination` after the recovery delay.
    Error,
}

impl fmt::Display for MovementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MovementState::Idle => "idle",
            MovementState::AwaitingDestination => "awaiting destination",
            MovementState::PreviewingPath => "previewing path",
            MovementState::ExecutingMovement => "executing movement",
            MovementState::Error => "error",
        };
        f.write_str(name)
    }
}

/// A path shown to the user, waiting for confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPreview {
    pub entity: EntityId,
    /// Center of the cell the entity starts from.
    pub origin: WorldPoint,
    pub destination: GridCell,
    pub path: Path,
    pub distance: f64,
    pub units: String,
    pub tier: CostTier,
    /// Path cells with a wall running through their interior.
    pub cut_cells: Vec<GridCell>,
}

impl PathPreview {
    /// Distance label for the overlay.
    pub fn label(&self) -> String {
        format!("{} {}", format_distance(self.distance), self.units)
    }
}

/// One client's live workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementSession {
    pub id: SessionId,
    pub state: MovementState,
    pub selected_entity: EntityId,
    pub preview: Option<PathPreview>,
    /// Grid-snapped point of the tap that produced the preview.
    pub last_confirmation_anchor: Option<WorldPoint>,
    errored_at: Option<u64>,
}

impl MovementSession {
    fn new(entity: EntityId) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: MovementState::AwaitingDestination,
            selected_entity: entity,
            preview: None,
            last_confirmation_anchor: None,
            errored_at: None,
        }
    }
}

/// What a tap did.
#[derive(Debug, Clone, PartialEq)]
pub enum TapOutcome {
    Selected(EntityId),
    Cancelled,
    PreviewShown { destination: GridCell, distance: f64 },
    PreviewCleared,
    Moved(MovementSummary),
    Ignored,
}

/// Host-side collaborators of a controller.
#[derive(Clone)]
pub struct HostPorts {
    pub scene: Arc<dyn SceneHost>,
    pub overlay: Arc<dyn PathOverlay>,
    pub notifier: Arc<dyn Notifier>,
}

/// Per-client movement controller.
pub struct TapMoveController {
    ports: HostPorts,
    locks: LockCoordinator,
    pathfinder: Pathfinder,
    config: SessionConfig,
    events: Arc<SessionEventBus>,
    session: Option<MovementSession>,
}

impl TapMoveController {
    pub fn new(
        ports: HostPorts,
        locks: LockCoordinator,
        pathfinder: Pathfinder,
        config: SessionConfig,
        events: Arc<SessionEventBus>,
    ) -> Self {
        Self {
            ports,
            locks,
            pathfinder,
            config,
            events,
            session: None,
        }
    }

    pub fn identity(&self) -> &Identity {
        self.locks.identity()
    }

    pub fn state(&self) -> MovementState {
        self.session.as_ref().map_or(MovementState::Idle, |s| s.state)
    }

    pub fn session(&self) -> Option<&MovementSession> {
        self.session.as_ref()
    }

    pub fn selected_entity(&self) -> Option<&EntityId> {
        self.session.as_ref().map(|s| &s.selected_entity)
    }

    pub fn preview(&self) -> Option<&PathPreview> {
        self.session.as_ref().and_then(|s| s.preview.as_ref())
    }

    pub fn events(&self) -> &Arc<SessionEventBus> {
        &self.events
    }

    pub fn locks(&self) -> &LockCoordinator {
        &self.locks
    }

    /// Handles one tap at a world-space point.
    pub async fn handle_tap(&mut self, point: WorldPoint) -> Result<TapOutcome, SessionError> {
        self.sync_remote();

        let hit = self.ports.scene.entity_at(point);
        let Some(session) = &self.session else {
            return match hit {
                Some(entity) => self.select_entity(&entity),
                None => Ok(TapOutcome::Ignored),
            };
        };

        let state = session.state;
        if state == MovementState::ExecutingMovement {
            return Ok(TapOutcome::Ignored);
        }

        if hit.as_ref() == Some(&session.selected_entity) {
            self.cancel();
            return Ok(TapOutcome::Cancelled);
        }

        if state == MovementState::PreviewingPath && self.within_anchor(point) {
            return self.execute().await;
        }

        if let Some(other) = hit {
            return self.select_entity(&other);
        }

        match state {
            MovementState::AwaitingDestination | MovementState::PreviewingPath => self.tap_destination(point),
            _ => Ok(TapOutcome::Ignored),
        }
    }

    /// Selects `entity` and takes its lock. Any current session is cancelled first.
    pub fn select_entity(&mut self, entity: &EntityId) -> Result<TapOutcome, SessionError> {
        if self.selected_entity() == Some(entity) {
            return Ok(TapOutcome::Selected(entity.clone()));
        }
        self.cancel();

        let info = self
            .ports
            .scene
            .entity(entity)
            .ok_or_else(|| SessionError::UnknownEntity(entity.clone()))
            .inspect_err(|e| warn!(error = %e, "Selected entity missing from scene"))?;

        if !info.can_be_moved_by(self.identity()) {
            self.ports.notifier.notify(Notice::PermissionDenied { entity: info.name.clone() });
            return Err(SessionError::PermissionDenied(entity.clone()));
        }

        if let Err(e) = self.locks.acquire(entity) {
            let owner = match e {
                LockError::Held { owner, .. } => Some(owner),
                LockError::Conflict { .. } => self.locks.current(entity).map(|l| l.owner),
            };
            let owner = owner
                .map(|id| self.ports.scene.user_name(&id).unwrap_or(id))
                .unwrap_or_else(|| "another user".to_string());
            self.ports.notifier.notify(Notice::EntityLocked { entity: info.name.clone(), owner: owner.clone() });
            return Err(SessionError::EntityLocked { entity: entity.clone(), owner });
        }

        let session = MovementSession::new(entity.clone());
        info!(session = %session.id, %entity, user = %self.identity().user_id, "Entity selected");
        self.events.publish(SessionEvent::StateChanged {
            session: session.id,
            entity: entity.clone(),
            from: MovementState::Idle,
            to: MovementState::AwaitingDestination,
        });
        self.session = Some(session);
        Ok(TapOutcome::Selected(entity.clone()))
    }

    /// Computes and shows a preview towards `point`, replacing any previous one.
    pub fn tap_destination(&mut self, point: WorldPoint) -> Result<TapOutcome, SessionError> {
        let Some(entity) = self.selected_entity().cloned() else {
            return Ok(TapOutcome::Ignored);
        };
        let info = self
            .ports
            .scene
            .entity(&entity)
            .ok_or_else(|| SessionError::UnknownEntity(entity.clone()))?;

        let world = self.ports.scene.world();
        let oracle = Oracle::new(&world);
        let grid = world.grid().inspect_err(|e| warn!(error = %e, "Destination tap without grid"))?;

        let destination = grid.cell_at(point);
        let in_scene = oracle
            .is_cell_in_bounds(destination, true)
            .inspect_err(|e| warn!(error = %e, "Destination tap without scene bounds"))?;
        if !in_scene {
            self.ports.notifier.notify(Notice::DestinationOutOfBounds);
            return Err(SessionError::DestinationOutOfBounds);
        }

        let origin = grid.cell_at(info.position);
        if origin == destination {
            self.clear_preview();
            self.transition(MovementState::AwaitingDestination);
            return Ok(TapOutcome::PreviewCleared);
        }

        let Some(path) = self.pathfinder.find_path(&world, origin, destination) else {
            self.clear_preview();
            self.transition(MovementState::AwaitingDestination);
            self.ports.notifier.notify(Notice::PathUnreachable);
            return Err(SessionError::PathUnreachable);
        };

        let origin_center = grid.cell_center(origin);
        let distance = path.measure(grid, origin_center);
        let cut_cells = path
            .cells
            .iter()
            .copied()
            .filter(|&cell| oracle.cell_cut_by_wall(cell).unwrap_or(false))
            .collect();
        let preview = PathPreview {
            entity: entity.clone(),
            origin: origin_center,
            destination,
            path,
            distance,
            units: grid.units().to_string(),
            tier: CostTier::classify(distance, info.movement),
            cut_cells,
        };
        let anchor = grid.snap_to_cell_center(point);

        self.ports.overlay.show(&preview);
        if let Some(session) = self.session.as_mut() {
            debug!(session = %session.id, %destination, distance, "Preview updated");
            self.events.publish(SessionEvent::PreviewUpdated { session: session.id, entity: entity.clone(), distance });
            session.preview = Some(preview);
            session.last_confirmation_anchor = Some(anchor);
        }
        self.transition(MovementState::PreviewingPath);
        Ok(TapOutcome::PreviewShown { destination, distance })
    }

    /// Drops the session, releasing the lock if this identity still owns it.
    /// Returns `false` if there was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        let Some(entity) = self.selected_entity().cloned() else {
            return false;
        };
        self.locks.release(&entity);
        self.clear_preview();
        self.end_session();
        true
    }

    /// The host switched scenes. Ends any session from any state.
    pub fn on_scene_change(&mut self) {
        if self.cancel() {
            info!(user = %self.identity().user_id, "Session ended by scene change");
        }
    }

    /// Processes queued lock messages and runs error recovery.
    pub fn tick(&mut self) -> MovementState {
        self.sync_remote();
        let now = self.locks.clock().now_ms();
        let recover = self.session.as_ref().is_some_and(|s| {
            s.state == MovementState::Error
                && s.errored_at.is_some_and(|t| now.saturating_sub(t) >= self.config.error_recovery_ms)
        });
        if recover {
            self.transition(MovementState::AwaitingDestination);
        }
        self.state()
    }

    /// Applies remote lock messages. If the selected entity was taken by
    /// someone else the session is forced to `Idle`; the interrupter's name
    /// is returned.
    pub fn sync_remote(&mut self) -> Option<String> {
        let mut interrupted_by = None;
        for hit in self.locks.poll() {
            if self.selected_entity() != Some(&hit.entity) {
                continue;
            }
            let by = hit
                .by_name
                .or_else(|| self.ports.scene.user_name(&hit.by))
                .unwrap_or_else(|| "GM".to_string());
            let entity_name = self.ports.scene.entity(&hit.entity).map_or_else(|| hit.entity.clone(), |e| e.name);

            if let Some(session) = &self.session {
                info!(session = %session.id, entity = %hit.entity, %by, "Session interrupted by lock override");
                self.events.publish(SessionEvent::Interrupted {
                    session: session.id,
                    entity: hit.entity.clone(),
                    by: by.clone(),
                });
            }
            self.ports.notifier.notify(Notice::LockOverridden { entity: entity_name, by: by.clone() });
            self.clear_preview();
            self.end_session();
            interrupted_by = Some(by);
        }
        interrupted_by
    }

    async fn execute(&mut self) -> Result<TapOutcome, SessionError> {
        let Some(preview) = self.preview().cloned() else {
            return Ok(TapOutcome::Ignored);
        };
        self.transition(MovementState::ExecutingMovement);

        let world = self.ports.scene.world();
        let oracle = Oracle::new(&world);
        let mut from = preview.origin;
        for &to in &preview.path.points {
            if oracle.is_movement_blocked(from, to) {
                debug!(%from, %to, "Segment blocked at confirmation");
                return Err(self.fail(SessionError::MovementBlocked, Notice::MovementBlocked));
            }
            from = to;
        }

        for &waypoint in &preview.path.points {
            if let Some(by) = self.sync_remote() {
                return Err(SessionError::Interrupted(by));
            }
            if let Err(e) = self.ports.scene.move_entity(&preview.entity, waypoint).await {
                let reason = format!("{e:#}");
                warn!(entity = %preview.entity, %waypoint, error = %reason, "Waypoint update failed");
                return Err(self.fail(
                    SessionError::MovementExecutionFailure(reason.clone()),
                    Notice::MovementFailed { reason },
                ));
            }
        }

        let info = self.ports.scene.entity(&preview.entity);
        let summary = MovementSummary {
            entity_name: info.as_ref().map_or_else(|| preview.entity.clone(), |e| e.name.clone()),
            distance: preview.distance,
            units: preview.units.clone(),
            movement: info.and_then(|e| e.movement),
        };

        self.locks.release(&preview.entity);
        self.clear_preview();
        if let Some(session) = &self.session {
            self.events.publish(SessionEvent::MovementCompleted {
                session: session.id,
                entity: preview.entity.clone(),
                distance: preview.distance,
            });
        }
        self.end_session();
        info!(entity = %preview.entity, distance = preview.distance, "Movement completed");

        if self.config.chat_summary {
            let notifier = self.ports.notifier.clone();
            let message = summary.to_string();
            tokio::spawn(async move {
                if let Err(e) = notifier.post_chat(message).await {
                    warn!(error = %e, "Failed to post movement summary");
                }
            });
        }
        Ok(TapOutcome::Moved(summary))
    }

    fn fail(&mut self, error: SessionError, notice: Notice) -> SessionError {
        self.ports.notifier.notify(notice);
        self.clear_preview();
        self.transition(MovementState::Error);
        let now = self.locks.clock().now_ms();
        if let Some(session) = self.session.as_mut() {
            session.errored_at = Some(now);
        }
        error
    }

    fn within_anchor(&self, point: WorldPoint) -> bool {
        self.session
            .as_ref()
            .and_then(|s| s.last_confirmation_anchor)
            .is_some_and(|anchor| anchor.distance_to(point) <= self.config.confirm_tolerance)
    }

    fn clear_preview(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.last_confirmation_anchor = None;
        if session.preview.take().is_some() {
            self.ports.overlay.clear();
        }
    }

    fn transition(&mut self, to: MovementState) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let from = session.state;
        if from == to {
            return;
        }
        session.state = to;
        if to != MovementState::Error {
            session.errored_at = None;
        }
        debug!(session = %session.id, %from, %to, "State transition");
        self.events.publish(SessionEvent::StateChanged {
            session: session.id,
            entity: session.selected_entity.clone(),
            from,
            to,
        });
    }

    fn end_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        debug!(session = %session.id, from = %session.state, "Session ended");
        self.events.publish(SessionEvent::StateChanged {
            session: session.id,
            entity: session.selected_entity,
            from: session.state,
            to: MovementState::Idle,
        });
        self.events.teardown_session(session.id);
    }
}
