//! Wall and bounds queries.
//!
//! The oracle answers two questions for the pathfinder and the movement
//! state machine: can a token step along the straight line between two
//! points, and does a cell belong to the playable area. Walls block
//! *edges* between cells, never whole cells.

use tapmove_geometry::{WorldPoint, clipped_length, segments_intersect};
use tracing::warn;

use crate::error::NavigationError;
use crate::grid::GridCell;
use crate::world::WorldContext;

/// Strict bounds tolerance, as a fraction of the cell size.
pub const STRICT_BOUNDS_TOLERANCE: f64 = 1.0 / 3.0;

/// Minimum length, as a fraction of the cell size, of wall inside a cell for
/// the cell to count as cut.
pub const INTERIOR_CUT_FRACTION: f64 = 0.25;

/// Inset applied to the cell rectangle before interior-cut clipping so that
/// walls lying exactly on the cell border are not counted.
const INTERIOR_INSET_FRACTION: f64 = 0.01;

/// Read-only wall and bounds oracle over a [`WorldContext`].
#[derive(Debug, Clone, Copy)]
pub struct Oracle<'a> {
    ctx: &'a WorldContext,
}

impl<'a> Oracle<'a> {
    /// Creates an oracle over `ctx`.
    pub fn new(ctx: &'a WorldContext) -> Self {
        Self { ctx }
    }

    /// Returns `true` if any blocking wall crosses the line `from`-`to`.
    pub fn is_blocked(&self, from: WorldPoint, to: WorldPoint) -> bool {
        self.ctx
            .walls
            .iter()
            .filter(|wall| wall.blocks())
            .any(|wall| segments_intersect(from, to, wall.a, wall.b))
    }

    /// Edge-crossing check between two cell centers.
    ///
    /// # Errors
    /// Returns [`NavigationError::MissingGrid`] when the context has no grid.
    pub fn edge_blocked(&self, from: GridCell, to: GridCell) -> Result<bool, NavigationError> {
        let grid = self.ctx.grid()?;
        Ok(self.is_blocked(grid.cell_center(from), grid.cell_center(to)))
    }

    /// Bounds check for one cell.
    ///
    /// Strict mode requires the cell center to lie within a third of a cell
    /// of the scene bounds. Lenient mode only requires the cell rectangle to
    /// overlap the scene bounds, so destinations on the map edge stay valid.
    ///
    /// # Errors
    /// Returns [`NavigationError::MissingGrid`] or
    /// [`NavigationError::MissingSceneBounds`] when the context lacks that data.
    pub fn is_cell_in_bounds(&self, cell: GridCell, lenient: bool) -> Result<bool, NavigationError> {
        let grid = self.ctx.grid()?;
        let bounds = self.ctx.bounds()?;

        if lenient {
            return Ok(grid.cell_rect(cell).overlaps(&bounds.rect));
        }

        let tolerance = grid.cell_size() * STRICT_BOUNDS_TOLERANCE;
        Ok(bounds.rect.expanded(tolerance).contains(grid.cell_center(cell)))
    }

    /// Top-level collision query used before committing movement.
    ///
    /// Unlike the checks made during search this fails closed: if grid or
    /// bounds data is missing the move is reported as blocked.
    pub fn is_movement_blocked(&self, from: WorldPoint, to: WorldPoint) -> bool {
        if let Err(e) = self.ctx.grid().and_then(|_| self.ctx.bounds()) {
            warn!(error = %e, %from, %to, "Collision check without scene data, treating as blocked");
            return true;
        }
        self.is_blocked(from, to)
    }

    /// Returns `true` if a blocking wall runs through the interior of `cell`.
    ///
    /// # Errors
    /// Returns [`NavigationError::MissingGrid`] when the context has no grid.
    pub fn cell_cut_by_wall(&self, cell: GridCell) -> Result<bool, NavigationError> {
        let grid = self.ctx.grid()?;
        let interior = grid
            .cell_rect(cell)
            .expanded(-grid.cell_size() * INTERIOR_INSET_FRACTION);
        let threshold = grid.cell_size() * INTERIOR_CUT_FRACTION;

        Ok(self
            .ctx
            .walls
            .iter()
            .filter(|wall| wall.blocks())
            .any(|wall| clipped_length(wall.a, wall.b, &interior) >= threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridParams, GridTopology};
    use crate::world::{DoorState, SceneBounds, WallSegment};

    fn context() -> WorldContext {
        let grid = GridParams::new(GridTopology::Square, 100.0, 5.0).unwrap();
        let bounds = SceneBounds::new(0.0, 0.0, 1000.0, 1000.0).unwrap();
        WorldContext::new(grid, bounds)
    }

    #[test]
    fn test_wall_blocks_edge() {
        let ctx = context().with_walls(vec![WallSegment::new(100.0, 0.0, 100.0, 100.0)]);
        let oracle = Oracle::new(&ctx);
        assert!(oracle.edge_blocked(GridCell::new(0, 0), GridCell::new(1, 0)).unwrap());
        assert!(!oracle.edge_blocked(GridCell::new(0, 1), GridCell::new(1, 1)).unwrap());
        // Diagonal through the wall's end point is blocked too.
        assert!(oracle.edge_blocked(GridCell::new(0, 0), GridCell::new(1, 1)).unwrap());
    }

    #[test]
    fn test_open_door_and_sight_only_walls_do_not_block() {
        let ctx = context().with_walls(vec![
            WallSegment::new(100.0, 0.0, 100.0, 100.0).with_door(DoorState::Open),
            WallSegment::new(100.0, 100.0, 100.0, 200.0).passable(),
        ]);
        let oracle = Oracle::new(&ctx);
        assert!(!oracle.edge_blocked(GridCell::new(0, 0), GridCell::new(1, 0)).unwrap());
        assert!(!oracle.edge_blocked(GridCell::new(0, 1), GridCell::new(1, 1)).unwrap());
    }

    #[test]
    fn test_strict_bounds_tolerance() {
        let ctx = context();
        let oracle = Oracle::new(&ctx);
        assert!(oracle.is_cell_in_bounds(GridCell::new(0, 0), false).unwrap());
        assert!(oracle.is_cell_in_bounds(GridCell::new(9, 9), false).unwrap());
        // Center at -50, tolerance 33.3: outside.
        assert!(!oracle.is_cell_in_bounds(GridCell::new(-1, 0), false).unwrap());
        assert!(!oracle.is_cell_in_bounds(GridCell::new(10, 0), false).unwrap());
    }

    #[test]
    fn test_lenient_bounds_accepts_partial_overlap() {
        let grid = GridParams::new(GridTopology::Square, 100.0, 5.0).unwrap();
        // Scene ends 10 units into column 10.
        let bounds = SceneBounds::new(0.0, 0.0, 1010.0, 1000.0).unwrap();
        let ctx = WorldContext::new(grid, bounds);
        let oracle = Oracle::new(&ctx);
        let edge = GridCell::new(10, 0);
        assert!(!oracle.is_cell_in_bounds(edge, false).unwrap());
        assert!(oracle.is_cell_in_bounds(edge, true).unwrap());
        // Wholly outside never overlaps.
        assert!(!oracle.is_cell_in_bounds(GridCell::new(11, 0), true).unwrap());
    }

    #[test]
    fn test_missing_data_fails_closed_for_collision() {
        let ctx = WorldContext::default();
        let oracle = Oracle::new(&ctx);
        assert!(oracle.is_movement_blocked(WorldPoint::new(50.0, 50.0), WorldPoint::new(150.0, 50.0)));
        assert_eq!(
            oracle.is_cell_in_bounds(GridCell::new(0, 0), false),
            Err(NavigationError::MissingGrid)
        );

        let full = context();
        assert!(!Oracle::new(&full).is_movement_blocked(WorldPoint::new(50.0, 50.0), WorldPoint::new(150.0, 50.0)));
    }

    #[test]
    fn test_interior_cut_ignores_border_walls() {
        let ctx = context().with_walls(vec![
            // Along the border between (0,0) and (1,0).
            WallSegment::new(100.0, 0.0, 100.0, 100.0),
            // Straight through the middle of (3,3).
            WallSegment::new(300.0, 350.0, 400.0, 350.0),
        ]);
        let oracle = Oracle::new(&ctx);
        assert!(!oracle.cell_cut_by_wall(GridCell::new(0, 0)).unwrap());
        assert!(!oracle.cell_cut_by_wall(GridCell::new(1, 0)).unwrap());
        assert!(oracle.cell_cut_by_wall(GridCell::new(3, 3)).unwrap());
    }
}
