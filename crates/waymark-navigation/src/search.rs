//! Graph search over the navigation grid.
//!
//! Two searches share one contract: map the endpoints, explore the eight
//! neighbours of each cell inside a [`SearchWindow`], skip occupied cells,
//! and rebuild the route through a predecessor map. Which one runs is chosen
//! with a [`CostModel`]:
//!
//! - [`CostModel::Uniform`] is a breadth-first search. Every step costs one and
//!   the route has the fewest cells.
//! - [`CostModel::Weighted`] is A*. Stepping onto a cell costs that cell's
//!   `pathfinding_cost` plus a slope penalty read from its terrain normal,
//!   and the frontier is ordered by cost so far plus the Manhattan distance
//!   to the goal. Cells steeper than [`MAX_SLOPE_DEGREES`] are never entered.
//!
//! The two can legitimately return different routes on the same grid. On
//! terrain without steep cells they agree on whether a route exists.

use crate::map::{Direction, Grid, GridSquare, manhattan_distance};
use crate::range::SearchWindow;
use waymark_common::{Vector3, WorldPoint};

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::fmt;

use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a search weighs a step from one cell to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CostModel {
    /// Every step costs one. Breadth-first search with a FIFO frontier.
    Uniform,
    /// A step costs the destination cell's `pathfinding_cost` plus its slope
    /// penalty. A* search.
    ///
    /// The cost belongs to the cell being entered, not to the edge, so the
    /// cost of a route depends on its direction of travel. Cells sloping more
    /// than [`MAX_SLOPE_DEGREES`] are impassable.
    #[default]
    Weighted,
}

impl fmt::Display for CostModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostModel::Uniform => write!(f, "bfs"),
            CostModel::Weighted => write!(f, "astar"),
        }
    }
}

/// Represents the result of a search with metadata.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathResult<T> {
    /// The computed path, if one was found.
    pub path: Option<Vec<T>>,
    /// The total cost of the path under the cost model that produced it.
    pub total_cost: Option<u64>,
    /// The number of nodes explored during the search.
    pub nodes_explored: usize,
    /// The length of the path (number of entries).
    pub path_length: usize,
}

impl<T> PathResult<T> {
    /// Creates a new PathResult for a successful path.
    pub fn success(path: Vec<T>, total_cost: u64, nodes_explored: usize) -> Self {
        let path_length = path.len();
        Self {
            path: Some(path),
            total_cost: Some(total_cost),
            nodes_explored,
            path_length,
        }
    }

    /// Creates a new PathResult for a failed path search.
    pub fn failure(nodes_explored: usize) -> Self {
        Self {
            path: None,
            total_cost: None,
            nodes_explored,
            path_length: 0,
        }
    }

    /// Returns true if a path was found.
    pub fn is_success(&self) -> bool {
        self.path.is_some()
    }

    /// Returns the path if one was found.
    pub fn into_path(self) -> Option<Vec<T>> {
        self.path
    }

    /// Returns the path, or an empty list if none was found.
    pub fn into_waypoints(self) -> Vec<T> {
        self.path.unwrap_or_default()
    }
}

impl<T> fmt::Display for PathResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(_) => write!(
                f,
                "PathResult {{ success: true, path_length: {}, total_cost: {}, nodes_explored: {} }}",
                self.path_length,
                self.total_cost.unwrap_or(0),
                self.nodes_explored
            ),
            None => write!(
                f,
                "PathResult {{ success: false, nodes_explored: {} }}",
                self.nodes_explored
            ),
        }
    }
}

/// A cell may be entered if it lies inside the window and nothing occupies it.
fn is_expandable(grid: &Grid, window: &SearchWindow, square: GridSquare) -> bool {
    window.contains(square) && !grid.is_occupied(square)
}

/// Gets the expandable neighbours of a cell in all eight directions.
fn neighbors<'a>(
    grid: &'a Grid,
    window: &'a SearchWindow,
    square: GridSquare,
) -> impl Iterator<Item = GridSquare> + 'a {
    Direction::ALL
        .into_iter()
        .map(move |direction| square + direction.offset())
        .filter(move |next| is_expandable(grid, window, *next))
}

/// Steepest terrain, in degrees from vertical up, that a weighted search will enter.
pub const MAX_SLOPE_DEGREES: f32 = 45.0;

/// Extra cost of entering ground with the given normal.
///
/// Flat ground adds nothing and the penalty reaches one step at the cutoff.
/// Returns `None` for slopes steeper than [`MAX_SLOPE_DEGREES`].
pub fn slope_cost(normal: &Vector3<f32>) -> Option<u64> {
    let angle = normal.angle(&Vector3::y()).to_degrees();
    if angle > MAX_SLOPE_DEGREES {
        return None;
    }
    Some((angle / MAX_SLOPE_DEGREES).round() as u64)
}

/// Gets the cost of stepping onto a cell, or `None` if it is too steep.
/// Negative pathfinding costs count as free.
fn step_cost(grid: &Grid, square: GridSquare) -> Option<u64> {
    let cell = grid.cell(square).ok()?;
    let slope = slope_cost(&cell.terrain_normal)?;
    Some(cell.pathfinding_cost.max(0) as u64 + slope)
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct State {
    cost: u64,
    position: GridSquare,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| self.position.cmp(&other.position))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reconstructs the path from a map of `came_from` links.
fn reconstruct_path(
    came_from: &HashMap<GridSquare, GridSquare>,
    mut current: GridSquare,
) -> Vec<GridSquare> {
    let mut path = vec![current];
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

fn breadth_first(
    grid: &Grid,
    start: GridSquare,
    goal: GridSquare,
    window: &SearchWindow,
) -> PathResult<GridSquare> {
    let mut nodes_explored = 0;
    let mut frontier = VecDeque::from([start]);
    let mut visited = HashSet::from([start]);
    let mut came_from: HashMap<GridSquare, GridSquare> = HashMap::new();

    while let Some(current) = frontier.pop_front() {
        nodes_explored += 1;

        if current == goal {
            let path = reconstruct_path(&came_from, current);
            let total_cost = (path.len() - 1) as u64;
            return PathResult::success(path, total_cost, nodes_explored);
        }

        for next in neighbors(grid, window, current) {
            if visited.insert(next) {
                came_from.insert(next, current);
                frontier.push_back(next);
            }
        }
    }

    PathResult::failure(nodes_explored)
}

fn weighted_astar(
    grid: &Grid,
    start: GridSquare,
    goal: GridSquare,
    window: &SearchWindow,
) -> PathResult<GridSquare> {
    let mut nodes_explored = 0;
    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<GridSquare, GridSquare> = HashMap::new();

    let mut g_score: HashMap<GridSquare, u64> = HashMap::new();
    g_score.insert(start, 0);

    open_set.push(State {
        cost: manhattan_distance(start, goal) as u64,
        position: start,
    });

    while let Some(State {
        cost,
        position: current,
    }) = open_set.pop()
    {
        let current_g = g_score.get(&current).copied().unwrap_or(0);
        // Skip stale queue entries left behind by later improvements
        if cost > current_g + manhattan_distance(current, goal) as u64 {
            continue;
        }
        nodes_explored += 1;

        if current == goal {
            let path = reconstruct_path(&came_from, current);
            return PathResult::success(path, current_g, nodes_explored);
        }

        for neighbor in neighbors(grid, window, current) {
            let Some(step) = step_cost(grid, neighbor) else {
                continue;
            };
            let tentative_g_score = current_g + step;

            if tentative_g_score < *g_score.get(&neighbor).unwrap_or(&u64::MAX) {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative_g_score);
                let h = manhattan_distance(neighbor, goal) as u64;
                open_set.push(State {
                    cost: tentative_g_score + h,
                    position: neighbor,
                });
            }
        }
    }

    PathResult::failure(nodes_explored)
}

/// Finds a route between two grid squares.
///
/// The window is clipped to the grid first. The start cell may itself be
/// occupied; every other cell on the route is free at call time.
///
/// # Arguments
/// * `grid` - The grid to plan in.
/// * `start` - Starting square.
/// * `goal` - Goal square.
/// * `window` - Region the search may explore.
/// * `model` - Cost model, which also selects the algorithm.
///
/// # Returns
/// * `PathResult<GridSquare>` - Every square on the route, start to goal.
pub fn pathfind_grid(
    grid: &Grid,
    start: GridSquare,
    goal: GridSquare,
    window: &SearchWindow,
    model: CostModel,
) -> PathResult<GridSquare> {
    let window = window.clip(grid.extent());
    if !window.contains(start) || !window.contains(goal) {
        debug!(%start, %goal, "Start or goal outside the search window");
        return PathResult::failure(0);
    }

    let result = match model {
        CostModel::Uniform => breadth_first(grid, start, goal, &window),
        CostModel::Weighted => weighted_astar(grid, start, goal, &window),
    };
    debug!(
        %model,
        %start,
        %goal,
        success = result.is_success(),
        nodes_explored = result.nodes_explored,
        path_length = result.path_length,
        "Search finished"
    );
    result
}

/// Finds a route between two world points.
///
/// Both points must map into `window`. The route is simplified to the cells
/// where the heading changes, and each one is reported as its cell's
/// minimum corner at terrain height.
///
/// # Returns
/// * `PathResult<WorldPoint>` - Waypoints from start to goal. `total_cost` and
///   `nodes_explored` describe the underlying grid search.
pub fn pathfind(
    grid: &Grid,
    start_world: &WorldPoint,
    goal_world: &WorldPoint,
    window: &SearchWindow,
    model: CostModel,
) -> PathResult<WorldPoint> {
    let (Some(start), Some(goal)) = (
        grid.world_to_grid_in(start_world, window),
        grid.world_to_grid_in(goal_world, window),
    ) else {
        debug!(?start_world, ?goal_world, "Start or goal not mappable");
        return PathResult::failure(0);
    };

    let result = pathfind_grid(grid, start, goal, window, model);
    match result.path {
        Some(squares) => {
            let waypoints: Vec<WorldPoint> = simplify_path(&squares)
                .into_iter()
                .filter_map(|square| grid.grid_to_world(square))
                .collect();
            PathResult::success(
                waypoints,
                result.total_cost.unwrap_or(0),
                result.nodes_explored,
            )
        }
        None => PathResult::failure(result.nodes_explored),
    }
}

/// Weighted A* between two world points. Empty if there is no route.
pub fn astar_pathfind(
    grid: &Grid,
    start_world: &WorldPoint,
    goal_world: &WorldPoint,
    window: &SearchWindow,
) -> Vec<WorldPoint> {
    pathfind(grid, start_world, goal_world, window, CostModel::Weighted).into_waypoints()
}

/// Breadth-first search between two world points. Empty if there is no route.
pub fn bfs_pathfind(
    grid: &Grid,
    start_world: &WorldPoint,
    goal_world: &WorldPoint,
    window: &SearchWindow,
) -> Vec<WorldPoint> {
    pathfind(grid, start_world, goal_world, window, CostModel::Uniform).into_waypoints()
}

/// Collapses straight runs of a route to their endpoints.
///
/// Keeps the first and last square and every square where the heading
/// changes. Headings are compared by sign, so running the function on its own
/// output returns it unchanged.
pub fn simplify_path(path: &[GridSquare]) -> Vec<GridSquare> {
    let Some((&first, rest)) = path.split_first() else {
        return Vec::new();
    };

    let mut simplified = vec![first];
    let mut heading: Option<GridSquare> = None;
    let mut previous = first;
    for &next in rest {
        let step = (next - previous).signum();
        if step == GridSquare::ZERO {
            continue;
        }
        if heading.is_some_and(|h| h != step) {
            simplified.push(previous);
        }
        heading = Some(step);
        previous = next;
    }
    if previous != first {
        simplified.push(previous);
    }
    simplified
}

/// Finds a free place for something of size `extents` near `target`.
///
/// Searches outward from `target`, always expanding the candidate closest
/// (Manhattan) to `current`, and returns the first square whose whole area is
/// unoccupied.
///
/// # Returns
/// * `Option<GridSquare>` - The location, or `None` if the window has no room.
pub fn find_next_best_location(
    grid: &Grid,
    current: GridSquare,
    target: GridSquare,
    window: &SearchWindow,
    extents: GridSquare,
) -> Option<GridSquare> {
    let window = window.clip(grid.extent());
    if window.contains(target) && grid.area_unoccupied(target, extents) {
        return Some(target);
    }

    let mut frontier = BinaryHeap::from([State {
        cost: 0,
        position: target,
    }]);
    let mut visited = HashSet::from([target]);

    while let Some(State {
        position: candidate,
        ..
    }) = frontier.pop()
    {
        for direction in Direction::ALL {
            let next = candidate + direction.offset();
            if !window.contains(next) || !visited.insert(next) {
                continue;
            }
            if grid.area_unoccupied(next, extents) {
                return Some(next);
            }
            frontier.push(State {
                cost: manhattan_distance(current, next) as u64,
                position: next,
            });
        }
    }
    None
}
