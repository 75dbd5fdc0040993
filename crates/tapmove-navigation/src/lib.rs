//! Grid navigation for tap-to-move: grid topologies, the wall and bounds
//! oracle, wall-aware A* and movement-cost tiers.

pub mod astar;
pub mod cost;
pub mod error;
pub mod grid;
pub mod oracle;
pub mod world;

pub use astar::{Path, PathResult, Pathfinder, PathfinderConfig, SearchOutcome};
pub use cost::{CostTier, MovementSummary, format_distance};
pub use error::NavigationError;
pub use grid::{DiagonalRule, GridCell, GridParams, GridTopology};
pub use oracle::Oracle;
pub use world::{DoorState, SceneBounds, WallSegment, WorldContext};
