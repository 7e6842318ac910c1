//! Grid-based spatial index and path planning.
//!
//! The crate keeps a square, discretised picture of the walkable world in a
//! [`Grid`], maps world points onto it, and plans routes across it with either
//! a breadth-first or a weighted A* search. Routes come back as lists of
//! world-space waypoints for an external movement system to follow.
//!
//! Nothing here is global: callers own the [`Grid`] and pass it to every
//! operation that needs it.

pub mod error;
pub mod map;
pub mod obstacle;
pub mod range;
pub mod search;

pub use error::NavigationError;
pub use map::{Direction, Footprint, Grid, GridCell, GridSquare, Occupancy};
pub use obstacle::{Actor, TransientOccupancy, pathfind_avoid_local_obstacle, resolve_local_obstacle};
pub use range::{DEFAULT_PATHFINDING_BOUND, MovementBounds, SearchWindow};
pub use search::{
    CostModel, MAX_SLOPE_DEGREES, PathResult, astar_pathfind, bfs_pathfind, find_next_best_location, pathfind,
    pathfind_grid, simplify_path, slope_cost,
};
