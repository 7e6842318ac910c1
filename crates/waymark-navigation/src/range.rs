//! Search windows and the per-actor movement range that bounds a search.

#![warn(missing_docs)]

use std::collections::HashMap;

use tracing::{debug, warn};
use waymark_common::{Aabb, EntityId, WorldPoint};

use crate::map::{Grid, GridSquare};

/// Radius, in cells, used for actors that have no registered movement bound.
pub const DEFAULT_PATHFINDING_BOUND: i32 = 50;

/// Rectangular range of grid indices that a search may explore.
///
/// The range is half-open: a square is inside when
/// `min.row <= row < max.row` and `min.col <= col < max.col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchWindow {
    /// Inclusive lower corner.
    pub min: GridSquare,
    /// Exclusive upper corner.
    pub max: GridSquare,
}

impl SearchWindow {
    /// Creates a window from its two corners.
    pub const fn new(min: GridSquare, max: GridSquare) -> Self {
        Self { min, max }
    }

    /// The window covering a whole grid of `extent` cells per side.
    pub const fn full(extent: i32) -> Self {
        Self::new(GridSquare::new(0, 0), GridSquare::new(extent, extent))
    }

    /// Returns true if `square` lies inside the window.
    pub fn contains(&self, square: GridSquare) -> bool {
        self.min.row <= square.row
            && square.row < self.max.row
            && self.min.col <= square.col
            && square.col < self.max.col
    }

    /// Restricts the window to a grid of `extent` cells per side.
    #[must_use]
    pub fn clip(&self, extent: i32) -> Self {
        let full = Self::full(extent);
        Self::new(self.min.max(full.min), self.max.min(full.max))
    }

    /// Returns true if no square lies inside the window.
    pub fn is_empty(&self) -> bool {
        self.min.row >= self.max.row || self.min.col >= self.max.col
    }

    /// Number of rows covered by the window.
    pub fn rows(&self) -> usize {
        (self.max.row - self.min.row).max(0) as usize
    }

    /// Number of columns covered by the window.
    pub fn cols(&self) -> usize {
        (self.max.col - self.min.col).max(0) as usize
    }

    /// Iterates over every square inside the window, row by row.
    pub fn squares(&self) -> impl Iterator<Item = GridSquare> + use<> {
        let SearchWindow { min, max } = *self;
        (min.row..max.row).flat_map(move |row| (min.col..max.col).map(move |col| GridSquare::new(row, col)))
    }
}

/// Supplies the roaming radius of actors with restricted movement.
///
/// Implemented by whatever external system knows about individual actors.
/// Actors without an entry fall back to [`DEFAULT_PATHFINDING_BOUND`].
pub trait MovementBounds {
    /// Returns the movement radius, in cells, registered for `actor`.
    fn pathfinding_bound(&self, actor: EntityId) -> Option<i32>;

    /// Returns the registered radius or the default one.
    fn bound_or_default(&self, actor: EntityId) -> i32 {
        self.pathfinding_bound(actor)
            .unwrap_or(DEFAULT_PATHFINDING_BOUND)
    }
}

impl MovementBounds for HashMap<EntityId, i32> {
    fn pathfinding_bound(&self, actor: EntityId) -> Option<i32> {
        self.get(&actor).copied()
    }
}

/// No actor has a registered bound.
impl MovementBounds for () {
    fn pathfinding_bound(&self, _actor: EntityId) -> Option<i32> {
        None
    }
}

impl Grid {
    /// Computes the window an actor may path within.
    ///
    /// The window is a square of half-width `radius` cells around the centre
    /// of `actor_bounds`. Both corners must map onto the grid; they are then
    /// clamped to `[0, extent - 1]`. It is recomputed on every call.
    ///
    /// # Returns
    /// * `None` if the actor's centre or either corner of the square falls
    ///   outside the grid.
    pub fn pathfind_range(&self, actor_bounds: &Aabb, radius: i32) -> Option<SearchWindow> {
        let center = actor_bounds.center();
        if self.world_to_grid(&center).is_none() {
            warn!(?center, "Actor is outside the grid, no pathfinding range");
            return None;
        }

        let reach = radius as f32 * self.spacing();
        let top_left = WorldPoint::new(center.x - reach, center.y, center.z - reach);
        let bottom_right = WorldPoint::new(center.x + reach, center.y, center.z + reach);

        let (Some(min), Some(max)) = (self.world_to_grid(&top_left), self.world_to_grid(&bottom_right))
        else {
            debug!(radius, ?center, "Pathfinding range reaches past the grid edge");
            return None;
        };

        let last = GridSquare::new(self.extent() - 1, self.extent() - 1);
        let window = SearchWindow::new(
            min.max(GridSquare::ZERO).min(last),
            max.max(GridSquare::ZERO).min(last),
        );
        debug!(radius, min = %window.min, max = %window.max, "Computed pathfinding range");
        Some(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_common::Vector3;

    fn actor_at(x: f32, z: f32) -> Aabb {
        Aabb::from_center(WorldPoint::new(x, 0.5, z), Vector3::new(0.4, 0.5, 0.4))
    }

    #[test]
    fn test_window_contains_is_half_open() {
        let window = SearchWindow::new(GridSquare::new(2, 2), GridSquare::new(5, 5));
        assert!(window.contains(GridSquare::new(2, 2)));
        assert!(window.contains(GridSquare::new(4, 4)));
        assert!(!window.contains(GridSquare::new(5, 4)));
        assert!(!window.contains(GridSquare::new(4, 5)));
        assert!(!window.contains(GridSquare::new(1, 3)));
        assert_eq!(window.rows(), 3);
        assert_eq!(window.squares().count(), 9);
    }

    #[test]
    fn test_window_clip() {
        let window = SearchWindow::new(GridSquare::new(-3, 2), GridSquare::new(12, 20));
        let clipped = window.clip(10);
        assert_eq!(clipped, SearchWindow::new(GridSquare::new(0, 2), GridSquare::new(10, 10)));
        assert!(SearchWindow::new(GridSquare::new(4, 4), GridSquare::new(4, 9)).is_empty());
    }

    #[test]
    fn test_range_centered_is_symmetric() {
        let grid = Grid::new(10, 1.0).unwrap();
        let window = grid.pathfind_range(&actor_at(0.0, 0.0), 3).unwrap();

        // Centre (0, 0) is index (5, 5)
        assert_eq!(window.min, GridSquare::new(2, 2));
        assert_eq!(window.max, GridSquare::new(8, 8));
        assert_eq!(5 - window.min.row, window.max.row - 5);
        assert_eq!(5 - window.min.col, window.max.col - 5);
    }

    #[test]
    fn test_range_touching_edge_is_kept() {
        let grid = Grid::new(10, 1.0).unwrap();
        let window = grid.pathfind_range(&actor_at(-1.5, 0.5), 3).unwrap();
        assert_eq!(window.min, GridSquare::new(2, 0));
        assert_eq!(window.max, GridSquare::new(8, 6));
    }

    #[test]
    fn test_range_past_edge_fails() {
        let grid = Grid::new(10, 1.0).unwrap();
        assert!(grid.pathfind_range(&actor_at(-4.0, 3.5), 3).is_none());
        assert!(grid.pathfind_range(&actor_at(0.0, 0.0), DEFAULT_PATHFINDING_BOUND).is_none());
        // One cell short of the far edge still maps
        assert!(grid.pathfind_range(&actor_at(0.5, 0.5), 4).is_some());
        assert!(grid.pathfind_range(&actor_at(0.5, 0.5), 5).is_none());
    }

    #[test]
    fn test_range_fails_outside_grid() {
        let grid = Grid::new(10, 1.0).unwrap();
        assert!(grid.pathfind_range(&actor_at(20.0, 0.0), 3).is_none());
    }

    #[test]
    fn test_movement_bounds_registry() {
        let mut registry = HashMap::new();
        registry.insert(EntityId(1), 4);
        assert_eq!(registry.bound_or_default(EntityId(1)), 4);
        assert_eq!(registry.bound_or_default(EntityId(2)), DEFAULT_PATHFINDING_BOUND);
        assert_eq!(().bound_or_default(EntityId(1)), DEFAULT_PATHFINDING_BOUND);
    }
}
