//! Read-only scene data handed to the pathfinder and the wall oracle.

use tapmove_geometry::{Rect, WorldPoint};

use crate::error::NavigationError;
use crate::grid::GridParams;

/// Door state of a wall segment.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum DoorState {
    /// Plain wall, not a door.
    #[default]
    None,
    /// A closed door.
    Closed,
    /// An open door; never blocks movement.
    Open,
    /// A locked door.
    Locked,
}

/// A wall segment supplied by the scene.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WallSegment {
    /// First endpoint.
    pub a: WorldPoint,
    /// Second endpoint.
    pub b: WorldPoint,
    /// Whether the wall restricts movement at all (some walls only block sight).
    pub blocks_movement: bool,
    /// Door state.
    pub door: DoorState,
}

impl WallSegment {
    /// A movement-blocking wall from `(x1, y1)` to `(x2, y2)`.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            a: WorldPoint::new(x1, y1),
            b: WorldPoint::new(x2, y2),
            blocks_movement: true,
            door: DoorState::None,
        }
    }

    /// Sets the door state.
    #[must_use]
    pub fn with_door(mut self, door: DoorState) -> Self {
        self.door = door;
        self
    }

    /// Marks the wall as not restricting movement.
    #[must_use]
    pub fn passable(mut self) -> Self {
        self.blocks_movement = false;
        self
    }

    /// Returns `true` if the wall currently stops movement.
    pub fn blocks(&self) -> bool {
        self.blocks_movement && self.door != DoorState::Open
    }
}

/// The playable area of the scene.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneBounds {
    /// Bounds rectangle in world units.
    pub rect: Rect,
}

impl SceneBounds {
    /// Creates scene bounds from a minimum corner and extents.
    ///
    /// # Returns
    /// * `Result<Self, NavigationError>` - The bounds or an error if the rectangle is invalid
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, NavigationError> {
        Ok(Self { rect: Rect::new(x, y, width, height)? })
    }
}

/// Explicitly passed snapshot of everything the navigation engines read.
///
/// Grid and bounds are optional because the host may not have supplied them
/// yet (scene still loading). Queries that need them report
/// [`NavigationError::MissingGrid`] or [`NavigationError::MissingSceneBounds`].
#[derive(Debug, Clone, Default)]
pub struct WorldContext {
    /// Grid parameters.
    pub grid: Option<GridParams>,
    /// Scene bounds.
    pub bounds: Option<SceneBounds>,
    /// All wall segments in the scene.
    pub walls: Vec<WallSegment>,
}

impl WorldContext {
    /// Creates a context with a grid and bounds but no walls.
    pub fn new(grid: GridParams, bounds: SceneBounds) -> Self {
        Self {
            grid: Some(grid),
            bounds: Some(bounds),
            walls: Vec::new(),
        }
    }

    /// Replaces the wall list.
    #[must_use]
    pub fn with_walls(mut self, walls: Vec<WallSegment>) -> Self {
        self.walls = walls;
        self
    }

    /// Adds one wall.
    pub fn add_wall(&mut self, wall: WallSegment) {
        self.walls.push(wall);
    }

    /// Grid parameters or [`NavigationError::MissingGrid`].
    pub fn grid(&self) -> Result<&GridParams, NavigationError> {
        self.grid.as_ref().ok_or(NavigationError::MissingGrid)
    }

    /// Scene bounds or [`NavigationError::MissingSceneBounds`].
    pub fn bounds(&self) -> Result<&SceneBounds, NavigationError> {
        self.bounds.as_ref().ok_or(NavigationError::MissingSceneBounds)
    }
}
