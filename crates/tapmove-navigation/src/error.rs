//! This module defines the error types used by the `tapmove-navigation` crate.

#![warn(missing_docs)]

use tapmove_geometry::GeometryError;

/// Error type for navigation operations.
///
/// Most of these surface as a geometry query failure: the scene did not
/// supply the grid or bounds data a query needed. Callers decide per call
/// site whether that fails open or closed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NavigationError {
    /// The world context has no grid parameters.
    #[error("grid parameters unavailable")]
    MissingGrid,
    /// The world context has no scene bounds.
    #[error("scene bounds unavailable")]
    MissingSceneBounds,
    /// Cell size must be a positive, finite number of world units.
    #[error("invalid cell size: {0}")]
    InvalidCellSize(f64),
    /// Distance per cell must be a positive, finite number.
    #[error("invalid distance per cell: {0}")]
    InvalidDistancePerCell(f64),
    /// Diagonal step cost must be a positive, finite number.
    #[error("invalid diagonal cost: {0}")]
    InvalidDiagonalCost(f64),
    /// A geometric primitive could not be built.
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
}
