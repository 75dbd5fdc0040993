use std::collections::HashSet;

use tapmove_navigation::{
    CostTier, GridCell, GridParams, GridTopology, Oracle, Pathfinder, SceneBounds, WallSegment, WorldContext,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let cols = 10;
    let rows = 10;
    let grid = GridParams::new(GridTopology::Square, 100.0, 5.0)?;
    let bounds = SceneBounds::new(0.0, 0.0, cols as f64 * 100.0, rows as f64 * 100.0)?;

    // A room with a single doorway on its south wall.
    let ctx = WorldContext::new(grid, bounds).with_walls(vec![
        WallSegment::new(200.0, 200.0, 700.0, 200.0),
        WallSegment::new(700.0, 200.0, 700.0, 700.0),
        WallSegment::new(700.0, 700.0, 500.0, 700.0),
        WallSegment::new(400.0, 700.0, 200.0, 700.0),
        WallSegment::new(200.0, 700.0, 200.0, 200.0),
        WallSegment::new(450.0, 350.0, 450.0, 450.0),
    ]);

    let start = GridCell::new(0, 0);
    let goal = GridCell::new(4, 3);

    let pathfinder = Pathfinder::default();
    let result = pathfinder.search(&ctx, start, goal);
    println!("{}", result);

    let Some(path) = pathfinder.find_path(&ctx, start, goal) else {
        println!("\nNo path found.");
        return Ok(());
    };

    let grid = ctx.grid()?;
    let oracle = Oracle::new(&ctx);
    let on_path: HashSet<GridCell> = path.cells.iter().copied().collect();

    println!("\nGrid with path (# = cell cut by a wall):");
    for r in 0..rows {
        for c in 0..cols {
            let cell = GridCell::new(c, r);
            if cell == start {
                print!("S ");
            } else if cell == goal {
                print!("G ");
            } else if on_path.contains(&cell) {
                print!("* ");
            } else if oracle.cell_cut_by_wall(cell)? {
                print!("# ");
            } else {
                print!(". ");
            }
        }
        println!();
    }

    let distance = path.measure(grid, grid.cell_center(start));
    let tier = CostTier::classify(distance, Some(30.0));
    println!("\n{} cells, {} {} ({:?}, color {:?})", path.len(), distance, grid.units(), tier, tier.color());
    Ok(())
}
