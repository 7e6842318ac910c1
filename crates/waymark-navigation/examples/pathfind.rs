use waymark_navigation::{CostModel, Grid, GridSquare, pathfind, pathfind_grid};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create a 10x10 grid with unit cells
    let mut grid = Grid::new(10, 1.0)?;

    let obstacles = vec![
        (1, 1), (1, 2), (1, 7), (1, 8),
        (2, 4),
        (3, 2), (3, 3), (3, 4), (3, 5), (3, 7),
        (4, 5), (4, 7),
        (5, 1), (5, 2), (5, 3), (5, 5), (5, 7), (5, 8),
        (6, 3),
        (7, 1), (7, 3), (7, 5), (7, 6), (7, 7),
        (8, 1), (8, 8),
        (9, 3), (9, 4), (9, 5),
    ];
    let squares: Vec<GridSquare> = obstacles
        .into_iter()
        .map(|(row, col)| GridSquare::new(row, col))
        .collect();
    grid.mark_squares_occupied(&squares, true);

    // A band of rough ground the weighted search should try to avoid
    for row in 0..=2 {
        grid.set_pathfinding_cost(GridSquare::new(row, 9), 8)?;
    }

    let start = GridSquare::new(0, 0);
    let goal = GridSquare::new(9, 9);
    let window = grid.full_window();

    println!("{}", grid);
    println!("Start: {}", start);
    println!("Goal: {}", goal);

    for model in [CostModel::Uniform, CostModel::Weighted] {
        let result = pathfind_grid(&grid, start, goal, &window, model);
        println!("\n[{}] {}", model, result);
        match result.path {
            Some(path) => print!("{}", grid.render_window(&window, &path, Some(start), Some(goal))),
            None => println!("No path found."),
        }
    }

    let start_world = grid.grid_to_world(start).ok_or("start off grid")?;
    let goal_world = grid.grid_to_world(goal).ok_or("goal off grid")?;
    let waypoints = pathfind(&grid, &start_world, &goal_world, &window, CostModel::Weighted);
    println!("\nWaypoints:");
    for waypoint in waypoints.into_waypoints() {
        println!("  ({:.1}, {:.1}, {:.1})", waypoint.x, waypoint.y, waypoint.z);
    }

    Ok(())
}
