use std::fmt;

/// Identifies one cell in grid coordinates under the active topology.
///
/// Coordinates are signed so that cells just outside the scene (which the
/// pathfinder must be able to name in order to reject them) are representable.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    /// Column index.
    pub col: i32,
    /// Row index.
    pub row: i32,
}

impl GridCell {
    /// Creates a new `GridCell`.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.col, self.row)
    }
}

/// A neighbouring cell produced by the topology, tagged with the kind of step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Neighbor {
    /// The adjacent cell.
    pub cell: GridCell,
    /// `true` for square-grid diagonal steps. Hex steps are never diagonal.
    pub diagonal: bool,
}
