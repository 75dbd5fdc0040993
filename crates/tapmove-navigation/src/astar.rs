/*

A* = f(n) = g(n) + h(n)

Where:
    n = a grid cell
    g(n) = cost of the cheapest known route from the origin to n
    h(n) = admissible estimate of the remaining cost from n to the destination
    f(n) = estimated cost of the cheapest route through n

Loop:
    - pop the open node with lowest f(n) (ties: lower h, then first pushed)
    - if n is the destination, rebuild the path
    - close n and count one expansion against the budget
    - for each neighbour of n:
        - out of bounds  -> close it for good, skip
        - wall on edge   -> skip, but leave it open to other approaches
        - otherwise relax g and push

*/

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;

use tapmove_geometry::WorldPoint;
use tracing::{debug, warn};

use crate::error::NavigationError;
use crate::grid::{GridCell, GridParams, GridTopology};
use crate::oracle::Oracle;
use crate::world::WorldContext;

/// Default expansion budget for one search.
pub const DEFAULT_MAX_ITERATIONS: usize = 5000;

/// Tunables for the pathfinder.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathfinderConfig {
    /// Maximum number of node expansions before giving up.
    pub max_iterations: usize,
    /// Cost of a diagonal step on square grids. Orthogonal steps cost 1.
    pub diagonal_cost: f64,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            diagonal_cost: std::f64::consts::SQRT_2,
        }
    }
}

impl PathfinderConfig {
    /// Rejects diagonal costs that would make step costs non-positive.
    pub fn validate(&self) -> Result<(), NavigationError> {
        if !(self.diagonal_cost.is_finite() && self.diagonal_cost > 0.0) {
            return Err(NavigationError::InvalidDiagonalCost(self.diagonal_cost));
        }
        Ok(())
    }
}

/// A route from just after the origin up to and including the destination.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    /// Cells along the route, origin excluded.
    pub cells: Vec<GridCell>,
    /// World-space cell centers matching `cells`.
    pub points: Vec<WorldPoint>,
}

impl Path {
    /// Number of steps in the path.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the origin already is the destination.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The final cell, if any.
    pub fn destination(&self) -> Option<GridCell> {
        self.cells.last().copied()
    }

    /// Game distance of the path measured from `origin` through every waypoint.
    pub fn measure(&self, grid: &GridParams, origin: WorldPoint) -> f64 {
        let mut chain = Vec::with_capacity(self.points.len() + 1);
        chain.push(origin);
        chain.extend_from_slice(&self.points);
        grid.measure_path(&chain)
    }
}

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The destination was reached.
    Found,
    /// The open set ran dry.
    Exhausted,
    /// The expansion budget ran out first.
    BudgetExceeded,
    /// The context had no grid to search on.
    NoGrid,
}

/// Detailed result of one search, used for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// Cells from origin to destination inclusive, when found.
    pub cells: Option<Vec<GridCell>>,
    /// Why the search stopped.
    pub outcome: SearchOutcome,
    /// Number of nodes expanded.
    pub expanded: usize,
    /// Cost of the found route in step units.
    pub cost: Option<f64>,
}

impl PathResult {
    /// Returns `true` if a route was found.
    pub fn is_success(&self) -> bool {
        self.outcome == SearchOutcome::Found
    }
}

impl fmt::Display for PathResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.cells, self.cost) {
            (Some(cells), Some(cost)) => write!(
                f,
                "{:?}: {} cells, cost {:.2}, {} expansions",
                self.outcome,
                cells.len(),
                cost,
                self.expanded
            ),
            _ => write!(f, "{:?} after {} expansions", self.outcome, self.expanded),
        }
    }
}

#[derive(Copy, Clone)]
struct State {
    f: f64,
    h: f64,
    seq: u64,
    cell: GridCell,
}

// The priority queue depends on `Ord`. Flip every comparison so the
// max-heap pops the lowest f, then the lowest h, then the earliest push.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

/// Wall-aware A* over square and hex grids.
#[derive(Debug, Clone, Default)]
pub struct Pathfinder {
    config: PathfinderConfig,
}

impl Pathfinder {
    /// Creates a pathfinder with the given configuration.
    pub fn new(config: PathfinderConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    /// Finds a route from `origin` to `destination`.
    ///
    /// # Returns
    /// * `Option<Path>` - The route without the origin cell, or `None` when the
    ///   destination is unreachable or the expansion budget ran out. Returns an
    ///   empty path when `origin == destination`.
    pub fn find_path(&self, ctx: &WorldContext, origin: GridCell, destination: GridCell) -> Option<Path> {
        let result = self.search(ctx, origin, destination);
        let grid = ctx.grid.as_ref()?;
        let cells: Vec<GridCell> = result.cells?.into_iter().skip(1).collect();
        let points = cells.iter().map(|&c| grid.cell_center(c)).collect();
        Some(Path { cells, points })
    }

    /// Runs the search and reports how it ended.
    pub fn search(&self, ctx: &WorldContext, origin: GridCell, destination: GridCell) -> PathResult {
        let grid = match ctx.grid() {
            Ok(grid) => grid,
            Err(e) => {
                warn!(error = %e, "Pathfinding without grid data");
                return PathResult { cells: None, outcome: SearchOutcome::NoGrid, expanded: 0, cost: None };
            }
        };

        if origin == destination {
            return PathResult { cells: Some(vec![origin]), outcome: SearchOutcome::Found, expanded: 0, cost: Some(0.0) };
        }

        let oracle = Oracle::new(ctx);
        let topology = grid.topology();

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<GridCell, GridCell> = HashMap::new();
        let mut g_score: HashMap<GridCell, f64> = HashMap::new();
        let mut closed: HashSet<GridCell> = HashSet::new();
        let mut seq: u64 = 0;
        let mut expanded = 0;

        g_score.insert(origin, 0.0);
        let h = self.heuristic(grid, origin, destination);
        open_set.push(State { f: h, h, seq, cell: origin });

        while let Some(State { cell: current, .. }) = open_set.pop() {
            if current == destination {
                let cells = reconstruct_path(&came_from, current);
                let cost = g_score.get(&current).copied();
                debug!(%origin, %destination, expanded, steps = cells.len() - 1, "Path found");
                return PathResult { cells: Some(cells), outcome: SearchOutcome::Found, expanded, cost };
            }

            // Stale heap entry for a node already expanded via a cheaper route.
            if !closed.insert(current) {
                continue;
            }

            if expanded >= self.config.max_iterations {
                debug!(%origin, %destination, expanded, "Expansion budget exhausted");
                return PathResult { cells: None, outcome: SearchOutcome::BudgetExceeded, expanded, cost: None };
            }
            expanded += 1;

            let current_g = g_score.get(&current).copied().unwrap_or(f64::INFINITY);
            for neighbor in grid.neighbors(current) {
                let next = neighbor.cell;
                if closed.contains(&next) {
                    continue;
                }

                let lenient = next == destination;
                let in_bounds = oracle.is_cell_in_bounds(next, lenient).unwrap_or_else(|e| {
                    warn!(error = %e, cell = %next, "Bounds check failed mid-search, treating as in bounds");
                    true
                });
                if !in_bounds {
                    closed.insert(next);
                    continue;
                }

                let blocked = oracle.edge_blocked(current, next).unwrap_or_else(|e| {
                    warn!(error = %e, from = %current, to = %next, "Edge check failed mid-search, treating as open");
                    false
                });
                if blocked {
                    continue;
                }

                let step = if neighbor.diagonal && topology == GridTopology::Square {
                    self.config.diagonal_cost
                } else {
                    1.0
                };
                let tentative_g = current_g + step;
                if tentative_g < g_score.get(&next).copied().unwrap_or(f64::INFINITY) {
                    came_from.insert(next, current);
                    g_score.insert(next, tentative_g);
                    let h = self.heuristic(grid, next, destination);
                    seq += 1;
                    open_set.push(State { f: tentative_g + h, h, seq, cell: next });
                }
            }
        }

        debug!(%origin, %destination, expanded, "Open set exhausted");
        PathResult { cells: None, outcome: SearchOutcome::Exhausted, expanded, cost: None }
    }

    /// Admissible distance estimate between two cells.
    ///
    /// Square grids use octile distance `dx + dy + (c - 2) * min(dx, dy)`
    /// with the diagonal cost `c` capped at 2. With `c = 1.41` this is
    /// `dx + dy - 0.59 * min(dx, dy)`. Below `c = 1` two diagonals can beat
    /// one orthogonal step, so the estimate falls back to `c * max(dx, dy)`.
    /// Hex grids use the hex step count.
    pub fn heuristic(&self, grid: &GridParams, a: GridCell, b: GridCell) -> f64 {
        if grid.topology().is_hex() {
            return grid.hex_distance(a, b) as f64;
        }
        let dx = (a.col - b.col).abs() as f64;
        let dy = (a.row - b.row).abs() as f64;
        let c = self.config.diagonal_cost.min(2.0);
        if c < 1.0 {
            return c * dx.max(dy);
        }
        dx + dy + (c - 2.0) * dx.min(dy)
    }
}

fn reconstruct_path(came_from: &HashMap<GridCell, GridCell>, mut current: GridCell) -> Vec<GridCell> {
    let mut path = vec![current];
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridParams, GridTopology};
    use crate::world::{SceneBounds, WallSegment};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tapmove_geometry::segments_intersect;

    const EPSILON: f64 = 1e-9;

    fn context(topology: GridTopology, cols: f64, rows: f64) -> WorldContext {
        let grid = GridParams::new(topology, 100.0, 5.0).unwrap();
        let bounds = SceneBounds::new(0.0, 0.0, cols * 100.0, rows * 100.0).unwrap();
        WorldContext::new(grid, bounds)
    }

    fn route_crosses_wall(ctx: &WorldContext, origin: GridCell, path: &Path) -> bool {
        let grid = ctx.grid().unwrap();
        let mut prev = grid.cell_center(origin);
        for &p in &path.points {
            if ctx.walls.iter().any(|w| w.blocks() && segments_intersect(prev, p, w.a, w.b)) {
                return true;
            }
            prev = p;
        }
        false
    }

    /// Dijkstra over the same rules, used as ground truth.
    fn brute_force_cost(ctx: &WorldContext, config: &PathfinderConfig, origin: GridCell, destination: GridCell) -> Option<f64> {
        let grid = ctx.grid().unwrap();
        let oracle = Oracle::new(ctx);
        let mut dist: HashMap<GridCell, f64> = HashMap::new();
        let mut done: HashSet<GridCell> = HashSet::new();
        dist.insert(origin, 0.0);
        loop {
            let current = dist
                .iter()
                .filter(|(c, _)| !done.contains(*c))
                .min_by(|a, b| a.1.total_cmp(b.1).then_with(|| a.0.cmp(b.0)))
                .map(|(c, d)| (*c, *d));
            let Some((cell, d)) = current else { return None };
            if cell == destination {
                return Some(d);
            }
            done.insert(cell);
            for n in grid.neighbors(cell) {
                let lenient = n.cell == destination;
                if !oracle.is_cell_in_bounds(n.cell, lenient).unwrap() || oracle.edge_blocked(cell, n.cell).unwrap() {
                    continue;
                }
                let step = if n.diagonal { config.diagonal_cost } else { 1.0 };
                let nd = d + step;
                if nd < dist.get(&n.cell).copied().unwrap_or(f64::INFINITY) {
                    dist.insert(n.cell, nd);
                }
            }
        }
    }

    #[test]
    fn test_straight_path_without_walls() {
        let ctx = context(GridTopology::Square, 10.0, 10.0);
        let pathfinder = Pathfinder::default();
        let origin = GridCell::new(0, 0);
        let path = pathfinder.find_path(&ctx, origin, GridCell::new(3, 0)).unwrap();

        assert_eq!(path.cells, vec![GridCell::new(1, 0), GridCell::new(2, 0), GridCell::new(3, 0)]);
        assert_eq!(path.points.last(), Some(&WorldPoint::new(350.0, 50.0)));
        let grid = ctx.grid().unwrap();
        assert!((path.measure(grid, grid.cell_center(origin)) - 15.0).abs() < EPSILON);
    }

    #[test]
    fn test_origin_equals_destination() {
        let ctx = context(GridTopology::Square, 3.0, 3.0);
        let path = Pathfinder::default().find_path(&ctx, GridCell::new(1, 1), GridCell::new(1, 1)).unwrap();
        assert!(path.is_empty());
        assert_eq!(path.destination(), None);
    }

    #[test]
    fn test_bisecting_wall_forces_detour() {
        let ctx = context(GridTopology::Square, 10.0, 10.0).with_walls(vec![WallSegment::new(100.0, 0.0, 100.0, 100.0)]);
        let origin = GridCell::new(0, 0);
        let destination = GridCell::new(1, 0);
        let path = Pathfinder::default().find_path(&ctx, origin, destination).unwrap();

        // Unobstructed this is one step.
        assert!(path.len() >= 3, "path {:?}", path.cells);
        assert_eq!(path.destination(), Some(destination));
        assert!(!route_crosses_wall(&ctx, origin, &path));
    }

    #[test]
    fn test_wall_blocked_cell_stays_reachable_from_another_side() {
        // Column wall between x=0 and x=1 for rows 0..2, open at row 2.
        let ctx = context(GridTopology::Square, 4.0, 4.0).with_walls(vec![WallSegment::new(100.0, 0.0, 100.0, 200.0)]);
        let origin = GridCell::new(0, 0);
        let destination = GridCell::new(1, 0);
        let path = Pathfinder::default().find_path(&ctx, origin, destination).unwrap();
        assert_eq!(path.destination(), Some(destination));
        assert!(!route_crosses_wall(&ctx, origin, &path));
        // Cell (1, 1) is wall-adjacent to (0, 1) yet must still be usable.
        let via_side = Pathfinder::default().find_path(&ctx, GridCell::new(0, 1), GridCell::new(1, 1)).unwrap();
        assert_eq!(via_side.destination(), Some(GridCell::new(1, 1)));
    }

    #[test]
    fn test_out_of_bounds_cells_never_used() {
        // Single-row corridor: detours above or below would leave the scene.
        let ctx = context(GridTopology::Square, 5.0, 1.0);
        let path = Pathfinder::default().find_path(&ctx, GridCell::new(0, 0), GridCell::new(4, 0)).unwrap();
        let oracle = Oracle::new(&ctx);
        for cell in &path.cells {
            assert!(oracle.is_cell_in_bounds(*cell, true).unwrap());
            assert_eq!(cell.row, 0);
        }

        // Blocking the corridor makes it unreachable instead of escaping the map.
        let blocked = ctx.with_walls(vec![WallSegment::new(200.0, -500.0, 200.0, 500.0)]);
        assert!(Pathfinder::default().find_path(&blocked, GridCell::new(0, 0), GridCell::new(4, 0)).is_none());
    }

    #[test]
    fn test_lenient_destination_on_map_edge() {
        let grid = GridParams::new(GridTopology::Square, 100.0, 5.0).unwrap();
        let bounds = SceneBounds::new(0.0, 0.0, 510.0, 100.0).unwrap();
        let ctx = WorldContext::new(grid, bounds);
        let edge = GridCell::new(5, 0);
        assert!(!Oracle::new(&ctx).is_cell_in_bounds(edge, false).unwrap());
        let path = Pathfinder::default().find_path(&ctx, GridCell::new(0, 0), edge).unwrap();
        assert_eq!(path.destination(), Some(edge));
    }

    #[test]
    fn test_enclosed_destination_unreachable() {
        let ctx = context(GridTopology::Square, 10.0, 10.0).with_walls(vec![
            WallSegment::new(500.0, 500.0, 600.0, 500.0),
            WallSegment::new(600.0, 500.0, 600.0, 600.0),
            WallSegment::new(600.0, 600.0, 500.0, 600.0),
            WallSegment::new(500.0, 600.0, 500.0, 500.0),
        ]);
        let result = Pathfinder::default().search(&ctx, GridCell::new(0, 0), GridCell::new(5, 5));
        assert_eq!(result.outcome, SearchOutcome::Exhausted);
        assert!(result.cells.is_none());
    }

    #[test]
    fn test_budget_exhaustion_in_serpentine_maze() {
        // 100 columns x 60 rows; every row boundary is walled except a gap
        // alternating between the right and left ends.
        let cols = 100.0;
        let rows = 60.0;
        let mut ctx = context(GridTopology::Square, cols, rows);
        for k in 1..rows as i32 {
            let y = k as f64 * 100.0;
            if k % 2 == 1 {
                ctx.add_wall(WallSegment::new(0.0, y, (cols - 1.0) * 100.0, y));
            } else {
                ctx.add_wall(WallSegment::new(100.0, y, cols * 100.0, y));
            }
        }
        let origin = GridCell::new(0, 0);
        let destination = GridCell::new(0, rows as i32 - 1);

        let bounded = Pathfinder::default().search(&ctx, origin, destination);
        assert_eq!(bounded.outcome, SearchOutcome::BudgetExceeded);
        assert!(bounded.cells.is_none());
        assert!(Pathfinder::default().find_path(&ctx, origin, destination).is_none());

        let generous = Pathfinder::new(PathfinderConfig { max_iterations: 50_000, ..Default::default() });
        let path = generous.find_path(&ctx, origin, destination).unwrap();
        assert!(path.len() > DEFAULT_MAX_ITERATIONS);
        assert!(!route_crosses_wall(&ctx, origin, &path));
    }

    #[test]
    fn test_missing_grid_returns_none() {
        let ctx = WorldContext::default();
        let result = Pathfinder::default().search(&ctx, GridCell::new(0, 0), GridCell::new(1, 0));
        assert_eq!(result.outcome, SearchOutcome::NoGrid);
        assert!(Pathfinder::default().find_path(&ctx, GridCell::new(0, 0), GridCell::new(1, 0)).is_none());
    }

    #[test]
    fn test_missing_bounds_fails_open_mid_search() {
        let mut ctx = context(GridTopology::Square, 10.0, 10.0);
        ctx.bounds = None;
        let path = Pathfinder::default().find_path(&ctx, GridCell::new(0, 0), GridCell::new(2, 0)).unwrap();
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_search_is_deterministic() {
        let ctx = context(GridTopology::Square, 12.0, 12.0).with_walls(vec![WallSegment::new(300.0, 0.0, 300.0, 800.0)]);
        let pathfinder = Pathfinder::default();
        let first = pathfinder.find_path(&ctx, GridCell::new(0, 0), GridCell::new(8, 2));
        for _ in 0..5 {
            assert_eq!(pathfinder.find_path(&ctx, GridCell::new(0, 0), GridCell::new(8, 2)), first);
        }
    }

    #[test]
    fn test_hex_path_steps_are_adjacent() {
        for topology in [GridTopology::HexPointyOdd, GridTopology::HexFlatEven] {
            let ctx = context(topology, 12.0, 12.0);
            let grid = ctx.grid().unwrap().clone();
            let origin = GridCell::new(1, 1);
            let destination = GridCell::new(6, 5);
            let result = Pathfinder::default().search(&ctx, origin, destination);
            let cells = result.cells.unwrap();
            assert_eq!(cells.len() as i32 - 1, grid.hex_distance(origin, destination));
            for pair in cells.windows(2) {
                assert_eq!(grid.hex_distance(pair[0], pair[1]), 1);
            }
        }
    }

    #[test]
    fn test_cost_matches_brute_force_on_random_grids() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = PathfinderConfig::default();
        let pathfinder = Pathfinder::new(config);

        for topology in [GridTopology::Square, GridTopology::HexPointyOdd, GridTopology::HexFlatOdd] {
            for _ in 0..40 {
                let mut ctx = context(topology, 6.0, 6.0);
                let grid = ctx.grid().unwrap().clone();
                // Random short walls along cell borders.
                for _ in 0..rng.random_range(0..12) {
                    let col = rng.random_range(0..6) as f64;
                    let row = rng.random_range(0..6) as f64;
                    let (w, _) = grid.cell_dimensions();
                    let len = w.max(100.0);
                    if rng.random_bool(0.5) {
                        ctx.add_wall(WallSegment::new(col * 100.0, row * 100.0, col * 100.0 + len, row * 100.0));
                    } else {
                        ctx.add_wall(WallSegment::new(col * 100.0, row * 100.0, col * 100.0, row * 100.0 + len));
                    }
                }
                let origin = GridCell::new(rng.random_range(0..5), rng.random_range(0..5));
                let destination = GridCell::new(rng.random_range(0..5), rng.random_range(0..5));

                let expected = brute_force_cost(&ctx, &config, origin, destination);
                let actual = pathfinder.search(&ctx, origin, destination);
                match expected {
                    Some(cost) => {
                        assert!(actual.is_success(), "{:?} {} -> {} should be reachable", topology, origin, destination);
                        assert!((actual.cost.unwrap() - cost).abs() < 1e-6, "{:?}: {} vs optimal {}", topology, actual, cost);
                    }
                    None => assert!(!actual.is_success()),
                }
            }
        }
    }

    #[test]
    fn test_cheap_diagonals_stay_optimal() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = PathfinderConfig { diagonal_cost: 0.4, ..Default::default() };
        let pathfinder = Pathfinder::new(config);

        let ctx = context(GridTopology::Square, 8.0, 8.0);
        let result = pathfinder.search(&ctx, GridCell::new(0, 0), GridCell::new(4, 0));
        assert!((result.cost.unwrap() - 1.6).abs() < EPSILON, "{}", result);

        for _ in 0..40 {
            let mut ctx = context(GridTopology::Square, 8.0, 8.0);
            for _ in 0..rng.random_range(0..10) {
                let col = rng.random_range(1..8) as f64;
                let row = rng.random_range(0..6) as f64;
                ctx.add_wall(WallSegment::new(col * 100.0, row * 100.0, col * 100.0, row * 100.0 + 200.0));
            }
            let origin = GridCell::new(rng.random_range(0..8), rng.random_range(0..8));
            let destination = GridCell::new(rng.random_range(0..8), rng.random_range(0..8));

            let expected = brute_force_cost(&ctx, &config, origin, destination);
            let actual = pathfinder.search(&ctx, origin, destination);
            match expected {
                Some(cost) => assert!((actual.cost.unwrap() - cost).abs() < 1e-6, "{} vs optimal {}", actual, cost),
                None => assert!(!actual.is_success()),
            }
        }
    }

    #[test]
    fn test_config_rejects_non_positive_diagonal_cost() {
        assert!(PathfinderConfig::default().validate().is_ok());
        assert!(PathfinderConfig { diagonal_cost: 0.5, ..Default::default() }.validate().is_ok());
        assert_eq!(
            PathfinderConfig { diagonal_cost: 0.0, ..Default::default() }.validate(),
            Err(NavigationError::InvalidDiagonalCost(0.0))
        );
        assert!(PathfinderConfig { diagonal_cost: f64::NAN, ..Default::default() }.validate().is_err());
    }
}
