//! Grid topologies and coordinate conversion.
//!
//! A grid maps world-space points to cells and back, enumerates the cells
//! adjacent to a cell, and measures distances the way the host game system
//! does. Hex grids use offset coordinates (odd/even rows for pointy-top,
//! odd/even columns for flat-top) and convert through axial coordinates for
//! rounding, adjacency, and distance.

#![warn(missing_docs)]

mod point_types;

pub use point_types::{GridCell, Neighbor};
pub use tapmove_geometry::{Rect, WorldPoint};

use crate::error::NavigationError;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Axial directions shared by both hex orientations.
const AXIAL_DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// Neighbour offsets for square grids, orthogonal first.
const SQUARE_DIRECTIONS: [(i32, i32, bool); 8] = [
    (1, 0, false),
    (0, 1, false),
    (-1, 0, false),
    (0, -1, false),
    (1, 1, true),
    (-1, 1, true),
    (-1, -1, true),
    (1, -1, true),
];

/// The adjacency scheme of the grid.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GridTopology {
    /// Square cells with 8 neighbours.
    #[default]
    Square,
    /// Pointy-top hexes, odd rows shifted right by half a cell.
    HexPointyOdd,
    /// Pointy-top hexes, odd rows shifted left by half a cell.
    HexPointyEven,
    /// Flat-top hexes, odd columns shifted down by half a cell.
    HexFlatOdd,
    /// Flat-top hexes, odd columns shifted up by half a cell.
    HexFlatEven,
}

impl GridTopology {
    /// Returns `true` for any hexagonal topology.
    pub fn is_hex(&self) -> bool {
        !matches!(self, GridTopology::Square)
    }

    fn is_pointy(&self) -> bool {
        matches!(self, GridTopology::HexPointyOdd | GridTopology::HexPointyEven)
    }
}

/// How diagonal steps are counted when measuring on a square grid.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DiagonalRule {
    /// Every diagonal step costs one cell (5/5/5).
    #[default]
    Equidistant,
    /// Every second diagonal step costs two cells (5/10/5).
    Alternating,
    /// Straight-line distance in cells.
    Euclidean,
}

/// Grid parameters supplied by the scene.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GridParams {
    topology: GridTopology,
    /// Cell size in world units. For hexes this is the vertex-to-vertex size
    /// across the pointed axis.
    cell_size: f64,
    /// Game distance represented by one cell (e.g. 5 feet).
    distance_per_cell: f64,
    units: String,
    diagonal_rule: DiagonalRule,
}

impl GridParams {
    /// Creates new grid parameters.
    ///
    /// # Arguments
    /// * `topology` - Adjacency scheme
    /// * `cell_size` - Size of one cell in world units
    /// * `distance_per_cell` - Game distance covered by one cell step
    ///
    /// # Returns
    /// * `Result<Self, NavigationError>` - The parameters or an error if a value is not positive
    pub fn new(topology: GridTopology, cell_size: f64, distance_per_cell: f64) -> Result<Self, NavigationError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(NavigationError::InvalidCellSize(cell_size));
        }
        if !(distance_per_cell.is_finite() && distance_per_cell > 0.0) {
            return Err(NavigationError::InvalidDistancePerCell(distance_per_cell));
        }
        Ok(Self {
            topology,
            cell_size,
            distance_per_cell,
            units: String::from("ft"),
            diagonal_rule: DiagonalRule::default(),
        })
    }

    /// Sets the diagonal measurement rule.
    #[must_use]
    pub fn with_diagonal_rule(mut self, rule: DiagonalRule) -> Self {
        self.diagonal_rule = rule;
        self
    }

    /// Sets the distance unit label.
    #[must_use]
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    /// The grid topology.
    pub fn topology(&self) -> GridTopology {
        self.topology
    }

    /// Cell size in world units.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Game distance represented by one cell.
    pub fn distance_per_cell(&self) -> f64 {
        self.distance_per_cell
    }

    /// Distance unit label.
    pub fn units(&self) -> &str {
        &self.units
    }

    /// The diagonal measurement rule.
    pub fn diagonal_rule(&self) -> DiagonalRule {
        self.diagonal_rule
    }

    fn hex_radius(&self) -> f64 {
        self.cell_size / 2.0
    }

    /// Width and height of one cell's bounding box in world units.
    pub fn cell_dimensions(&self) -> (f64, f64) {
        let r = self.hex_radius();
        match self.topology {
            GridTopology::Square => (self.cell_size, self.cell_size),
            GridTopology::HexPointyOdd | GridTopology::HexPointyEven => (SQRT_3 * r, 2.0 * r),
            GridTopology::HexFlatOdd | GridTopology::HexFlatEven => (2.0 * r, SQRT_3 * r),
        }
    }

    /// Returns the cell containing a world-space point.
    pub fn cell_at(&self, p: WorldPoint) -> GridCell {
        if !self.topology.is_hex() {
            return GridCell::new(
                (p.x / self.cell_size).floor() as i32,
                (p.y / self.cell_size).floor() as i32,
            );
        }

        let (w, h) = self.cell_dimensions();
        let r = self.hex_radius();
        let px = p.x - w / 2.0;
        let py = p.y - h / 2.0;
        let (q, ar) = if self.topology.is_pointy() {
            ((SQRT_3 / 3.0 * px - py / 3.0) / r, (2.0 / 3.0 * py) / r)
        } else {
            ((2.0 / 3.0 * px) / r, (-px / 3.0 + SQRT_3 / 3.0 * py) / r)
        };
        let (q, ar) = axial_round(q, ar);
        self.axial_to_offset(q, ar)
    }

    /// Returns the world-space center of a cell.
    pub fn cell_center(&self, cell: GridCell) -> WorldPoint {
        if !self.topology.is_hex() {
            return WorldPoint::new(
                (cell.col as f64 + 0.5) * self.cell_size,
                (cell.row as f64 + 0.5) * self.cell_size,
            );
        }

        let (w, h) = self.cell_dimensions();
        let r = self.hex_radius();
        let (q, ar) = self.offset_to_axial(cell);
        let (q, ar) = (q as f64, ar as f64);
        if self.topology.is_pointy() {
            WorldPoint::new(w / 2.0 + r * SQRT_3 * (q + ar / 2.0), h / 2.0 + 1.5 * r * ar)
        } else {
            WorldPoint::new(w / 2.0 + 1.5 * r * q, h / 2.0 + r * SQRT_3 * (ar + q / 2.0))
        }
    }

    /// Snaps a point to the center of the cell that contains it.
    pub fn snap_to_cell_center(&self, p: WorldPoint) -> WorldPoint {
        self.cell_center(self.cell_at(p))
    }

    /// Bounding rectangle of a cell in world units.
    pub fn cell_rect(&self, cell: GridCell) -> Rect {
        let (w, h) = self.cell_dimensions();
        Rect::from_center(self.cell_center(cell), w, h)
    }

    /// Lists the cells adjacent to `cell`.
    ///
    /// Square grids yield 8 neighbours (orthogonal first, then diagonal).
    /// Hex grids yield 6 whose offsets depend on the parity of the row or
    /// column, which falls out of the axial round trip.
    pub fn neighbors(&self, cell: GridCell) -> Vec<Neighbor> {
        if !self.topology.is_hex() {
            return SQUARE_DIRECTIONS
                .iter()
                .map(|&(dc, dr, diagonal)| Neighbor {
                    cell: GridCell::new(cell.col + dc, cell.row + dr),
                    diagonal,
                })
                .collect();
        }

        let (q, r) = self.offset_to_axial(cell);
        AXIAL_DIRECTIONS
            .iter()
            .map(|&(dq, dr)| Neighbor {
                cell: self.axial_to_offset(q + dq, r + dr),
                diagonal: false,
            })
            .collect()
    }

    /// Number of hex steps between two cells. Only meaningful on hex grids.
    pub fn hex_distance(&self, a: GridCell, b: GridCell) -> i32 {
        let (aq, ar) = self.offset_to_axial(a);
        let (bq, br) = self.offset_to_axial(b);
        let dq = aq - bq;
        let dr = ar - br;
        (dq.abs() + dr.abs() + (dq + dr).abs()) / 2
    }

    /// Measures the game distance between two world points.
    pub fn measure_distance(&self, origin: WorldPoint, destination: WorldPoint) -> f64 {
        self.measure_path(&[origin, destination])
    }

    /// Measures the game distance along a chain of waypoints.
    ///
    /// With [`DiagonalRule::Alternating`] diagonals are counted cumulatively
    /// across the whole chain, so two single-diagonal legs cost 5 + 10.
    pub fn measure_path(&self, points: &[WorldPoint]) -> f64 {
        let mut cells = 0.0;
        let mut diagonals_so_far: i64 = 0;

        for leg in points.windows(2) {
            let (a, b) = (leg[0], leg[1]);
            if self.topology.is_hex() {
                cells += self.hex_distance(self.cell_at(a), self.cell_at(b)) as f64;
                continue;
            }

            if self.diagonal_rule == DiagonalRule::Euclidean {
                cells += a.distance_to(b) / self.cell_size;
                continue;
            }

            let ca = self.cell_at(a);
            let cb = self.cell_at(b);
            let dx = (ca.col - cb.col).abs() as i64;
            let dy = (ca.row - cb.row).abs() as i64;
            let diagonal = dx.min(dy);
            let straight = dx.max(dy) - diagonal;
            cells += match self.diagonal_rule {
                DiagonalRule::Alternating => {
                    let extra = (diagonals_so_far + diagonal) / 2 - diagonals_so_far / 2;
                    (straight + diagonal + extra) as f64
                }
                _ => (straight + diagonal) as f64,
            };
            diagonals_so_far += diagonal;
        }

        cells * self.distance_per_cell
    }

    fn offset_to_axial(&self, cell: GridCell) -> (i32, i32) {
        let GridCell { col, row } = cell;
        match self.topology {
            GridTopology::Square => (col, row),
            GridTopology::HexPointyOdd => (col - (row - (row & 1)) / 2, row),
            GridTopology::HexPointyEven => (col - (row + (row & 1)) / 2, row),
            GridTopology::HexFlatOdd => (col, row - (col - (col & 1)) / 2),
            GridTopology::HexFlatEven => (col, row - (col + (col & 1)) / 2),
        }
    }

    fn axial_to_offset(&self, q: i32, r: i32) -> GridCell {
        match self.topology {
            GridTopology::Square => GridCell::new(q, r),
            GridTopology::HexPointyOdd => GridCell::new(q + (r - (r & 1)) / 2, r),
            GridTopology::HexPointyEven => GridCell::new(q + (r + (r & 1)) / 2, r),
            GridTopology::HexFlatOdd => GridCell::new(q, r + (q - (q & 1)) / 2),
            GridTopology::HexFlatEven => GridCell::new(q, r + (q + (q & 1)) / 2),
        }
    }
}

/// Rounds fractional axial coordinates to the nearest hex via cube rounding.
fn axial_round(q: f64, r: f64) -> (i32, i32) {
    let s = -q - r;
    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();

    let dq = (rq - q).abs();
    let dr = (rr - r).abs();
    let ds = (rs - s).abs();

    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    (rq as i32, rr as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL_HEX: [GridTopology; 4] = [
        GridTopology::HexPointyOdd,
        GridTopology::HexPointyEven,
        GridTopology::HexFlatOdd,
        GridTopology::HexFlatEven,
    ];

    fn square() -> GridParams {
        GridParams::new(GridTopology::Square, 100.0, 5.0).unwrap()
    }

    #[test]
    fn test_invalid_params() {
        assert!(matches!(
            GridParams::new(GridTopology::Square, 0.0, 5.0),
            Err(NavigationError::InvalidCellSize(_))
        ));
        assert!(matches!(
            GridParams::new(GridTopology::Square, 100.0, -5.0),
            Err(NavigationError::InvalidDistancePerCell(_))
        ));
    }

    #[test]
    fn test_square_conversion() {
        let grid = square();
        assert_eq!(grid.cell_at(WorldPoint::new(0.0, 0.0)), GridCell::new(0, 0));
        assert_eq!(grid.cell_at(WorldPoint::new(199.9, 100.0)), GridCell::new(1, 1));
        assert_eq!(grid.cell_at(WorldPoint::new(-1.0, 50.0)), GridCell::new(-1, 0));
        assert_eq!(grid.cell_center(GridCell::new(3, 0)), WorldPoint::new(350.0, 50.0));
    }

    #[test]
    fn test_snap_is_stable_within_a_cell() {
        let grid = square();
        let a = grid.snap_to_cell_center(WorldPoint::new(301.0, 12.0));
        let b = grid.snap_to_cell_center(WorldPoint::new(399.0, 99.0));
        assert_eq!(a, b);
        assert_eq!(a, WorldPoint::new(350.0, 50.0));
    }

    #[test]
    fn test_hex_center_round_trip() {
        for topology in ALL_HEX {
            let grid = GridParams::new(topology, 100.0, 5.0).unwrap();
            for col in -4..5 {
                for row in -4..5 {
                    let cell = GridCell::new(col, row);
                    let center = grid.cell_center(cell);
                    assert_eq!(grid.cell_at(center), cell, "{:?} {}", topology, cell);
                    // A point slightly off-center still maps to the same hex.
                    let nudged = WorldPoint::new(center.x + 10.0, center.y - 10.0);
                    assert_eq!(grid.cell_at(nudged), cell, "{:?} {}", topology, cell);
                }
            }
        }
    }

    #[test]
    fn test_square_neighbors() {
        let grid = square();
        let neighbors = grid.neighbors(GridCell::new(0, 0));
        assert_eq!(neighbors.len(), 8);
        assert_eq!(neighbors.iter().filter(|n| n.diagonal).count(), 4);
        assert!(neighbors.contains(&Neighbor { cell: GridCell::new(1, 1), diagonal: true }));
        assert!(neighbors.contains(&Neighbor { cell: GridCell::new(0, -1), diagonal: false }));
    }

    #[test]
    fn test_hex_pointy_odd_neighbors_depend_on_row_parity() {
        let grid = GridParams::new(GridTopology::HexPointyOdd, 100.0, 5.0).unwrap();
        let even: HashSet<GridCell> = grid.neighbors(GridCell::new(0, 0)).into_iter().map(|n| n.cell).collect();
        let expected_even: HashSet<GridCell> = [(1, 0), (0, -1), (-1, -1), (-1, 0), (-1, 1), (0, 1)]
            .into_iter()
            .map(|(c, r)| GridCell::new(c, r))
            .collect();
        assert_eq!(even, expected_even);

        let odd: HashSet<GridCell> = grid.neighbors(GridCell::new(0, 1)).into_iter().map(|n| n.cell).collect();
        let expected_odd: HashSet<GridCell> = [(1, 1), (1, 0), (0, 0), (-1, 1), (0, 2), (1, 2)]
            .into_iter()
            .map(|(c, r)| GridCell::new(c, r))
            .collect();
        assert_eq!(odd, expected_odd);
    }

    #[test]
    fn test_hex_neighbors_are_symmetric_and_adjacent() {
        for topology in ALL_HEX {
            let grid = GridParams::new(topology, 100.0, 5.0).unwrap();
            for col in -3..4 {
                for row in -3..4 {
                    let cell = GridCell::new(col, row);
                    let neighbors = grid.neighbors(cell);
                    let unique: HashSet<GridCell> = neighbors.iter().map(|n| n.cell).collect();
                    assert_eq!(unique.len(), 6);
                    for n in neighbors {
                        assert!(!n.diagonal);
                        assert_eq!(grid.hex_distance(cell, n.cell), 1);
                        assert!(grid.neighbors(n.cell).iter().any(|back| back.cell == cell));
                        // Adjacent hex centers are exactly one cell width apart.
                        let d = grid.cell_center(cell).distance_to(grid.cell_center(n.cell));
                        assert!((d - SQRT_3 * 50.0).abs() < 1e-6, "{:?} {} -> {}", topology, cell, n.cell);
                    }
                }
            }
        }
    }

    #[test]
    fn test_measure_straight_line() {
        let grid = square();
        let d = grid.measure_distance(
            grid.cell_center(GridCell::new(0, 0)),
            grid.cell_center(GridCell::new(3, 0)),
        );
        assert!((d - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_measure_diagonal_rules() {
        let a = WorldPoint::new(50.0, 50.0);
        let b = WorldPoint::new(350.0, 350.0);

        let equidistant = square();
        assert!((equidistant.measure_distance(a, b) - 15.0).abs() < 1e-9);

        let alternating = square().with_diagonal_rule(DiagonalRule::Alternating);
        assert!((alternating.measure_distance(a, b) - 20.0).abs() < 1e-9);

        let euclidean = square().with_diagonal_rule(DiagonalRule::Euclidean);
        assert!((euclidean.measure_distance(a, b) - 18.0f64.sqrt() * 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_alternating_diagonals_accumulate_across_legs() {
        let grid = square().with_diagonal_rule(DiagonalRule::Alternating);
        let points = [
            WorldPoint::new(50.0, 50.0),
            WorldPoint::new(150.0, 150.0),
            WorldPoint::new(250.0, 250.0),
        ];
        // 5 for the first diagonal, 10 for the second.
        assert!((grid.measure_path(&points) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_hex_measurement_counts_steps() {
        let grid = GridParams::new(GridTopology::HexFlatOdd, 100.0, 5.0).unwrap();
        let a = grid.cell_center(GridCell::new(0, 0));
        let b = grid.cell_center(GridCell::new(3, 0));
        assert!((grid.measure_distance(a, b) - 15.0).abs() < 1e-9);
    }
}
