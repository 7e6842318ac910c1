use waymark_common::{Aabb, EntityId, Vector3, WorldPoint};
use waymark_navigation::{
    Actor, Direction, Grid, GridSquare, pathfind_avoid_local_obstacle, resolve_local_obstacle,
};

fn squares_of(grid: &Grid, waypoints: &[WorldPoint]) -> Vec<GridSquare> {
    waypoints.iter().filter_map(|w| grid.world_to_grid(w)).collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut grid = Grid::new(12, 1.0)?;
    // Standing wall with a doorway at row 6
    let wall: Vec<GridSquare> = (0..12)
        .filter(|&row| row != 6)
        .map(|row| GridSquare::new(row, 4))
        .collect();
    grid.mark_squares_occupied(&wall, true);

    let start = WorldPoint::new(-4.5, 0.0, 0.5);
    let goal = WorldPoint::new(4.5, 0.0, 0.5);
    let actor = Actor::new(
        EntityId(1),
        Aabb::from_center(start, Vector3::new(0.3, 0.5, 0.3)),
    );
    // A cart parked just past the doorway
    let cart = Aabb::new(WorldPoint::new(-0.5, 0.0, -0.5), WorldPoint::new(0.5, 1.0, 1.5));

    let path = pathfind_avoid_local_obstacle(&mut grid, &actor, &(), &cart, &start, &goal);
    println!("Replanned around the cart ({} waypoints):", path.len());
    let window = grid.full_window();
    print!(
        "{}",
        grid.render_window(
            &window,
            &squares_of(&grid, &path),
            grid.world_to_grid(&start),
            grid.world_to_grid(&goal),
        )
    );
    println!(
        "Cart cells occupied after the call: {}",
        grid.is_occupied_at(&WorldPoint::new(0.0, 0.0, 0.0))
    );

    let steer = resolve_local_obstacle(&grid, &actor.bounds, &cart, Direction::East);
    println!("\nSide-step heading east:");
    for waypoint in steer {
        println!("  ({:.1}, {:.1}, {:.1})", waypoint.x, waypoint.y, waypoint.z);
    }

    Ok(())
}
