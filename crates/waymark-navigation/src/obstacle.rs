//! Steering around obstacles that are not part of the grid's standing occupancy.
//!
//! [`resolve_local_obstacle`] is a constant-time side-step for reactive
//! steering. [`pathfind_avoid_local_obstacle`] folds the obstacle into the grid
//! for the length of one breadth-first search and then removes it again.

use std::ops::Deref;

use tracing::{debug, trace};
use waymark_common::{Aabb, EntityId, WorldPoint};

use crate::map::{Direction, Footprint, Grid, GridSquare, Occupancy};
use crate::range::{MovementBounds, SearchWindow};
use crate::search::bfs_pathfind;

/// An entity whose movement is being planned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actor {
    /// Handle used to look up the actor's movement bound.
    pub id: EntityId,
    /// World-space bounding volume of the actor.
    pub bounds: Aabb,
}

impl Actor {
    /// Creates a new `Actor`.
    pub fn new(id: EntityId, bounds: Aabb) -> Self {
        Self { id, bounds }
    }
}

/// Scoped occupancy change on a grid.
///
/// Marks a footprint occupied when created and puts every cell back the way
/// it was when dropped. The guard holds the only mutable borrow of the grid,
/// so nothing else can write to it, or open a second guard, until the
/// original occupancy is back.
pub struct TransientOccupancy<'g> {
    grid: &'g mut Grid,
    saved: Vec<(GridSquare, Occupancy)>,
}

impl<'g> TransientOccupancy<'g> {
    /// Marks every grid square of `footprint` occupied, with no occupant.
    pub fn mark(grid: &'g mut Grid, footprint: Footprint) -> Self {
        let mut saved = Vec::new();
        for square in footprint.squares() {
            if let Ok(cell) = grid.cell_mut(square) {
                let previous = cell.set_occupancy(Occupancy::Occupied { occupant: None });
                saved.push((square, previous));
            }
        }
        trace!(cells = saved.len(), "Transient occupancy applied");
        Self { grid, saved }
    }

    /// Number of cells held by the guard.
    pub fn len(&self) -> usize {
        self.saved.len()
    }

    /// Whether the guard holds no cells.
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}

impl Deref for TransientOccupancy<'_> {
    type Target = Grid;

    fn deref(&self) -> &Grid {
        self.grid
    }
}

impl Drop for TransientOccupancy<'_> {
    fn drop(&mut self) {
        for (square, previous) in self.saved.drain(..) {
            if let Ok(cell) = self.grid.cell_mut(square) {
                cell.set_occupancy(previous);
            }
        }
        trace!("Transient occupancy restored");
    }
}

/// First grid square past an inclusive `[min, max]` span when moving along `step`.
fn beyond(min: i32, max: i32, step: i32) -> i32 {
    if step > 0 { max + 1 } else { min - 1 }
}

/// Side-step heuristic for an obstacle directly in the actor's way.
///
/// Picks a cell beside the obstacle corner on the actor's right-hand side and
/// a second cell past the obstacle in the direction of travel. Both are
/// returned as cell corners when free. If either is occupied or off the grid,
/// the result is just the corner of the actor's own cell.
///
/// # Arguments
/// * `grid` - The grid holding standing occupancy.
/// * `actor_bounds` - Bounding volume of the moving actor.
/// * `obstacle_bounds` - Bounding volume of the obstacle.
/// * `direction` - The actor's current heading.
///
/// # Returns
/// * `Vec<WorldPoint>` - Two waypoints, one fallback waypoint, or none if the
///   actor itself is off the grid.
pub fn resolve_local_obstacle(
    grid: &Grid,
    actor_bounds: &Aabb,
    obstacle_bounds: &Aabb,
    direction: Direction,
) -> Vec<WorldPoint> {
    let Some(actor_square) = grid.world_to_grid(&actor_bounds.center()) else {
        debug!("Actor is outside the grid, no side-step");
        return Vec::new();
    };
    let Some(fallback) = grid.grid_to_world(actor_square) else {
        return Vec::new();
    };

    let side_step = grid.footprint(obstacle_bounds).and_then(|obstacle| {
        let forward = direction.offset();
        let right = direction.turn_right().offset();

        let axis = |min: i32, max: i32, forward: i32, right: i32| -> (i32, i32) {
            let aside = if right != 0 {
                beyond(min, max, right)
            } else if forward > 0 {
                min - 1
            } else {
                max + 1
            };
            let ahead = if forward != 0 {
                beyond(min, max, forward)
            } else {
                aside
            };
            (aside, ahead)
        };

        let (aside_row, ahead_row) = axis(obstacle.min.row, obstacle.max.row, forward.row, right.row);
        let (aside_col, ahead_col) = axis(obstacle.min.col, obstacle.max.col, forward.col, right.col);
        let aside = GridSquare::new(aside_row, aside_col);
        let ahead = GridSquare::new(ahead_row, ahead_col);

        let usable = |square: GridSquare| grid.contains(square) && !grid.is_occupied(square);
        if !usable(aside) || !usable(ahead) {
            return None;
        }
        Some(vec![grid.grid_to_world(aside)?, grid.grid_to_world(ahead)?])
    });

    match side_step {
        Some(waypoints) => {
            debug!(?direction, "Side-stepping local obstacle");
            waypoints
        }
        None => {
            debug!(%actor_square, "No side-step available, holding position");
            vec![fallback]
        }
    }
}

/// Plans around an obstacle the grid does not know about.
///
/// Marks the obstacle's footprint occupied, runs a breadth-first search inside
/// the actor's movement range, then restores every marked cell to its value
/// before the call. The restoration happens on every return path.
///
/// The range comes from `bounds` for the actor, or the default radius when
/// it has none. If the range cannot be computed the whole grid is searched.
///
/// # Returns
/// * `Vec<WorldPoint>` - Simplified waypoints, or empty if the obstacle is off
///   the grid or no route exists.
pub fn pathfind_avoid_local_obstacle<B>(
    grid: &mut Grid,
    actor: &Actor,
    bounds: &B,
    obstacle_bounds: &Aabb,
    start: &WorldPoint,
    goal: &WorldPoint,
) -> Vec<WorldPoint>
where
    B: MovementBounds + ?Sized,
{
    let Some(footprint) = grid.footprint(obstacle_bounds) else {
        debug!(?obstacle_bounds, "Obstacle is outside the grid");
        return Vec::new();
    };

    let guarded = TransientOccupancy::mark(grid, footprint);
    let radius = bounds.bound_or_default(actor.id);
    let window: SearchWindow = guarded
        .pathfind_range(&actor.bounds, radius)
        .unwrap_or_else(|| guarded.full_window());

    let path = bfs_pathfind(&guarded, start, goal, &window);
    debug!(
        actor = %actor.id,
        radius,
        blocked = guarded.len(),
        waypoints = path.len(),
        "Replanned around local obstacle"
    );
    path
}
