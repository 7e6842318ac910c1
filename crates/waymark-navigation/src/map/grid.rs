//! Square navigation grid covering the walkable world.
//!
//! The grid owns one [`GridCell`] per index and answers the world↔grid
//! coordinate queries every other part of the engine builds on. The grid is
//! centred on the world origin: for a grid of `extent` cells with edge
//! `spacing`, world `x` in `[-extent/2 * spacing, (extent - extent/2) * spacing)`
//! maps to columns `0..extent`, and likewise `z` to rows.

#![warn(missing_docs)]

use std::fmt;

use tracing::{debug, info, warn};
use waymark_common::{Aabb, EntityId, OccupancyProvider, Vector3, WorldPoint};

use crate::error::NavigationError;
use crate::map::cell::{Direction, GridCell, GridSquare, Occupancy};
use crate::range::SearchWindow;

/// World-space height of the cell boxes.
const CELL_HEIGHT: f32 = 1.0;

/// Inclusive rectangle of grid squares covered by a bounding volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    /// Smallest covered square.
    pub min: GridSquare,
    /// Largest covered square (inclusive).
    pub max: GridSquare,
}

impl Footprint {
    /// Returns true if `square` is covered.
    pub fn contains(&self, square: GridSquare) -> bool {
        self.min.row <= square.row
            && square.row <= self.max.row
            && self.min.col <= square.col
            && square.col <= self.max.col
    }

    /// Iterates over every covered square, row by row.
    pub fn squares(&self) -> impl Iterator<Item = GridSquare> + use<> {
        let Footprint { min, max } = *self;
        (min.row..=max.row).flat_map(move |row| (min.col..=max.col).map(move |col| GridSquare::new(row, col)))
    }
}

/// The navigation grid.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Cells per side.
    extent: i32,
    /// World units per cell edge.
    spacing: f32,
    /// Row-major cell storage.
    cells: Vec<GridCell>,
}

impl Grid {
    /// Creates a grid of `extent × extent` free cells, each `spacing` world units wide.
    ///
    /// # Arguments
    /// * `extent` - Number of cells per side
    /// * `spacing` - World units per cell edge
    ///
    /// # Returns
    /// * `Result<Self, NavigationError>` - The grid, or an error if the parameters are invalid
    pub fn new(extent: i32, spacing: f32) -> Result<Self, NavigationError> {
        if extent <= 0 {
            return Err(NavigationError::InvalidExtent("Extent must be positive"));
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(NavigationError::InvalidSpacing(
                "Spacing must be positive and finite",
            ));
        }

        let total_cells = (extent as usize)
            .checked_mul(extent as usize)
            .ok_or(NavigationError::InvalidExtent(
                "Grid extent too large, would cause overflow",
            ))?;

        let half = extent / 2;
        let mut cells = Vec::with_capacity(total_cells);
        for row in 0..extent {
            for col in 0..extent {
                let i = (col - half) as f32;
                let j = (row - half) as f32;
                let world_min = WorldPoint::new(i * spacing, 0.0, j * spacing);
                let world_max = WorldPoint::new((i + 1.0) * spacing, CELL_HEIGHT, (j + 1.0) * spacing);
                cells.push(GridCell::new(GridSquare::new(row, col), world_min, world_max));
            }
        }

        debug!(extent, spacing, "Navigation grid initialised");
        Ok(Self {
            extent,
            spacing,
            cells,
        })
    }

    /// Gets the number of cells per side.
    pub fn extent(&self) -> i32 {
        self.extent
    }

    /// Gets the world size of one cell edge.
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Gets the window covering the whole grid.
    pub fn full_window(&self) -> SearchWindow {
        SearchWindow::full(self.extent)
    }

    /// Returns true if `square` is a valid index of this grid.
    pub fn contains(&self, square: GridSquare) -> bool {
        self.full_window().contains(square)
    }

    /// Calculates the linear index of a square.
    fn index(&self, square: GridSquare) -> Option<usize> {
        self.contains(square)
            .then(|| square.row as usize * self.extent as usize + square.col as usize)
    }

    /// Gets every cell in row-major order.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Gets the cell at `square`.
    pub fn cell(&self, square: GridSquare) -> Result<&GridCell, NavigationError> {
        self.index(square)
            .map(|index| &self.cells[index])
            .ok_or(NavigationError::OutOfBounds("Grid square out of bounds"))
    }

    /// Gets the cell at `square` for modification.
    pub fn cell_mut(&mut self, square: GridSquare) -> Result<&mut GridCell, NavigationError> {
        match self.index(square) {
            Some(index) => Ok(&mut self.cells[index]),
            None => Err(NavigationError::OutOfBounds("Grid square out of bounds")),
        }
    }

    /// Maps a world point onto grid indices without checking the result.
    ///
    /// `row = floor(z / spacing) + extent / 2`, `col = floor(x / spacing) + extent / 2`.
    pub fn world_to_grid_unchecked(&self, world: &WorldPoint) -> GridSquare {
        let half = self.extent / 2;
        let row = (world.z / self.spacing).floor() as i32;
        let col = (world.x / self.spacing).floor() as i32;
        GridSquare::new(row.saturating_add(half), col.saturating_add(half))
    }

    /// Converts world coordinates to grid coordinates.
    /// Returns None if the world coordinates are outside the grid.
    pub fn world_to_grid(&self, world: &WorldPoint) -> Option<GridSquare> {
        self.world_to_grid_in(world, &self.full_window())
    }

    /// Converts world coordinates to grid coordinates inside `window`.
    /// Returns None if the resulting square falls outside the window.
    pub fn world_to_grid_in(&self, world: &WorldPoint, window: &SearchWindow) -> Option<GridSquare> {
        let square = self.world_to_grid_unchecked(world);
        window.contains(square).then_some(square)
    }

    /// Converts grid coordinates to the world point used as a waypoint.
    ///
    /// This is the cell's minimum corner, raised to the sampled terrain height,
    /// not the cell centre.
    pub fn grid_to_world(&self, square: GridSquare) -> Option<WorldPoint> {
        let cell = self.cell(square).ok()?;
        let mut world = cell.world_min;
        world.y = cell.terrain_height;
        Some(world)
    }

    /// Maps a bounding volume onto the squares it covers.
    /// Returns None if either corner lies outside the grid.
    pub fn footprint(&self, bounds: &Aabb) -> Option<Footprint> {
        let a = self.world_to_grid(&bounds.min)?;
        let b = self.world_to_grid(&bounds.max)?;
        Some(Footprint {
            min: a.min(b),
            max: a.max(b),
        })
    }

    /// Converts a bounding volume to its size in grid squares.
    ///
    /// Returns None if the volume does not map onto the grid.
    pub fn extents(&self, bounds: &Aabb) -> Option<GridSquare> {
        let footprint = self.footprint(bounds)?;
        Some(footprint.max - footprint.min)
    }

    /// Returns true if the cell at `square` is blocked. Squares outside the grid are not.
    pub fn is_occupied(&self, square: GridSquare) -> bool {
        self.cell(square).is_ok_and(GridCell::is_occupied)
    }

    /// Returns true if the cell under a world point is blocked.
    pub fn is_occupied_at(&self, world: &WorldPoint) -> bool {
        self.world_to_grid(world)
            .is_some_and(|square| self.is_occupied(square))
    }

    /// Returns the entity blocking `square`, if any.
    pub fn occupant(&self, square: GridSquare) -> Option<EntityId> {
        self.cell(square).ok().and_then(GridCell::occupant)
    }

    /// Returns the entity blocking the cell under a world point, if any.
    pub fn occupant_at(&self, world: &WorldPoint) -> Option<EntityId> {
        self.world_to_grid(world)
            .and_then(|square| self.occupant(square))
    }

    /// Checks whether an area of `extents` around `square` is inside the grid and unblocked.
    pub fn area_unoccupied(&self, square: GridSquare, extents: GridSquare) -> bool {
        let min = square - extents;
        let max = square + extents;
        if !self.contains(min) || !self.contains(max) {
            return false;
        }
        Footprint { min, max }
            .squares()
            .all(|covered| !self.is_occupied(covered))
    }

    /// Checks whether a bounding volume would fit, unblocked, at a world position.
    pub fn bounding_box_area_unoccupied(&self, world: &WorldPoint, bounds: &Aabb) -> bool {
        match (self.world_to_grid(world), self.extents(bounds)) {
            (Some(square), Some(extents)) => self.area_unoccupied(square, extents),
            _ => false,
        }
    }

    /// Sets or clears occupancy over the squares covered by `bounds`.
    ///
    /// Marking records `occupant` on every covered cell; clearing removes it.
    /// Volumes that do not map onto the grid are ignored.
    pub fn mark_area_occupied(&mut self, bounds: &Aabb, occupied: bool, occupant: Option<EntityId>) {
        let Some(footprint) = self.footprint(bounds) else {
            debug!(?bounds, "Bounding volume outside the grid, occupancy unchanged");
            return;
        };
        let occupancy = if occupied {
            Occupancy::Occupied { occupant }
        } else {
            Occupancy::Free
        };
        for square in footprint.squares() {
            if let Ok(cell) = self.cell_mut(square) {
                cell.set_occupancy(occupancy);
            }
        }
    }

    /// Sets or clears anonymous occupancy on a list of squares, skipping invalid ones.
    pub fn mark_squares_occupied(&mut self, squares: &[GridSquare], occupied: bool) {
        for &square in squares {
            if let Ok(cell) = self.cell_mut(square) {
                if occupied {
                    cell.occupy(None);
                } else {
                    cell.vacate();
                }
            }
        }
    }

    /// Clears occupancy on every cell.
    pub fn clear_occupancy(&mut self) {
        for cell in &mut self.cells {
            cell.vacate();
        }
    }

    /// Rebuilds standing occupancy from the collision system.
    ///
    /// Clears every cell, then marks the footprint of each collider on a
    /// blocking layer as occupied by that collider's entity. Colliders that
    /// fall outside the grid are skipped.
    ///
    /// # Returns
    /// * `usize` - Number of colliders that were marked.
    pub fn populate<P>(&mut self, provider: &P) -> usize
    where
        P: OccupancyProvider + ?Sized,
    {
        self.clear_occupancy();

        let mut marked = 0;
        let mut skipped = 0;
        for collider in provider.colliders() {
            if !collider.layer.is_blocking() {
                continue;
            }
            if self.footprint(&collider.bounds).is_none() {
                skipped += 1;
                continue;
            }
            self.mark_area_occupied(&collider.bounds, true, Some(collider.entity));
            marked += 1;
        }

        if skipped > 0 {
            warn!(skipped, "Blocking colliders outside the grid were skipped");
        }
        info!(marked, "Populated navigation grid");
        marked
    }

    /// Sets the traversal cost of one cell.
    pub fn set_pathfinding_cost(&mut self, square: GridSquare, cost: i32) -> Result<(), NavigationError> {
        self.cell_mut(square)?.pathfinding_cost = cost;
        Ok(())
    }

    /// Writes a terrain sample onto one cell.
    pub fn set_terrain(
        &mut self,
        square: GridSquare,
        height: f32,
        normal: Vector3<f32>,
    ) -> Result<(), NavigationError> {
        let cell = self.cell_mut(square)?;
        cell.terrain_height = height;
        cell.terrain_normal = normal;
        Ok(())
    }

    /// Applies a height map given as one byte per cell, row-major.
    ///
    /// Each byte is scaled so that `255` becomes `max_height`.
    pub fn apply_height_map(&mut self, samples: &[u8], max_height: f32) -> Result<(), NavigationError> {
        self.check_terrain_len(samples.len())?;
        for (cell, &sample) in self.cells.iter_mut().zip(samples) {
            cell.terrain_height = sample as f32 / 255.0 * max_height;
        }
        debug!(max_height, "Height map applied to grid");
        Ok(())
    }

    /// Applies a normal map given as one RGB triple per cell, row-major.
    ///
    /// Each channel is mapped from `[0, 255]` to `[-1, 1]` and the result normalised.
    /// Degenerate samples leave the cell pointing straight up.
    pub fn apply_normal_map(&mut self, samples: &[[u8; 3]]) -> Result<(), NavigationError> {
        self.check_terrain_len(samples.len())?;
        for (cell, [r, g, b]) in self.cells.iter_mut().zip(samples) {
            let raw = Vector3::new(*r, *g, *b).map(|c| c as f32 / 127.5 - 1.0);
            cell.terrain_normal = raw.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::y);
        }
        debug!("Normal map applied to grid");
        Ok(())
    }

    fn check_terrain_len(&self, actual: usize) -> Result<(), NavigationError> {
        let expected = self.cells.len();
        if actual != expected {
            return Err(NavigationError::TerrainSizeMismatch { expected, actual });
        }
        Ok(())
    }

    /// Walks up to `distance` cells from `from` along `direction` and returns
    /// the first square that has an occupant. Steps outside the grid are skipped.
    pub fn cast_ray(&self, from: GridSquare, direction: Direction, distance: u32) -> Option<GridSquare> {
        let step = direction.offset();
        let mut square = from;
        for _ in 0..distance {
            if self.occupant(square).is_some() {
                return Some(square);
            }
            square += step;
        }
        None
    }

    /// Renders the grid with a window, a path and endpoints overlaid.
    ///
    /// `#` occupied, `.` free, `,` outside the window, `*` path, `S`/`G` endpoints.
    pub fn render_window(
        &self,
        window: &SearchWindow,
        path: &[GridSquare],
        start: Option<GridSquare>,
        goal: Option<GridSquare>,
    ) -> String {
        let mut out = String::with_capacity(self.cells.len() * 2 + self.extent as usize);
        for row in 0..self.extent {
            for col in 0..self.extent {
                let square = GridSquare::new(row, col);
                let glyph = if Some(square) == start {
                    'S'
                } else if Some(square) == goal {
                    'G'
                } else if path.contains(&square) {
                    '*'
                } else if self.is_occupied(square) {
                    '#'
                } else if !window.contains(square) {
                    ','
                } else {
                    '.'
                };
                out.push(glyph);
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Grid ({}x{}, spacing: {:.3})",
            self.extent, self.extent, self.spacing
        )?;
        f.write_str(&self.render_window(&self.full_window(), &[], None, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use waymark_common::{Collider, CollisionLayer};

    fn building(entity: u32, min: (f32, f32), max: (f32, f32)) -> Collider {
        Collider {
            entity: EntityId(entity),
            bounds: Aabb::new(
                WorldPoint::new(min.0, 0.0, min.1),
                WorldPoint::new(max.0, 2.0, max.1),
            ),
            layer: CollisionLayer::Building,
        }
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10, 2.0).unwrap();
        assert_eq!(grid.extent(), 10);
        assert_eq!(grid.spacing(), 2.0);
        assert_eq!(grid.cells().len(), 100);

        let cell = grid.cell(GridSquare::new(0, 0)).unwrap();
        assert_eq!(cell.world_min, WorldPoint::new(-10.0, 0.0, -10.0));
        assert_eq!(cell.world_max, WorldPoint::new(-8.0, 1.0, -8.0));
        assert_eq!(cell.world_center, WorldPoint::new(-9.0, 0.5, -9.0));
        assert_eq!(cell.pathfinding_cost, 1);

        let cell = grid.cell(GridSquare::new(5, 7)).unwrap();
        assert_eq!(cell.index, GridSquare::new(5, 7));
        assert_eq!(cell.world_min, WorldPoint::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_invalid_creation() {
        assert!(matches!(Grid::new(0, 1.0), Err(NavigationError::InvalidExtent(_))));
        assert!(matches!(Grid::new(-4, 1.0), Err(NavigationError::InvalidExtent(_))));
        assert!(matches!(Grid::new(10, 0.0), Err(NavigationError::InvalidSpacing(_))));
        assert!(matches!(Grid::new(10, f32::NAN), Err(NavigationError::InvalidSpacing(_))));
    }

    #[test]
    fn test_coordinate_conversion() {
        let grid = Grid::new(10, 1.0).unwrap();

        assert_eq!(
            grid.world_to_grid(&WorldPoint::new(0.0, 0.0, 0.0)),
            Some(GridSquare::new(5, 5))
        );
        // x selects the column, z the row
        assert_eq!(
            grid.world_to_grid(&WorldPoint::new(-4.5, 3.0, 2.2)),
            Some(GridSquare::new(7, 0))
        );
        assert_eq!(
            grid.grid_to_world(GridSquare::new(7, 0)),
            Some(WorldPoint::new(-5.0, 0.0, 2.0))
        );
        assert!(grid.grid_to_world(GridSquare::new(10, 0)).is_none());
        assert!(grid.grid_to_world(GridSquare::new(0, -1)).is_none());
    }

    #[test]
    fn test_unchecked_mapping_is_always_computable() {
        let grid = Grid::new(10, 1.0).unwrap();
        assert_eq!(
            grid.world_to_grid_unchecked(&WorldPoint::new(-12.0, 0.0, 30.5)),
            GridSquare::new(35, -7)
        );
        assert!(grid.world_to_grid(&WorldPoint::new(-12.0, 0.0, 30.5)).is_none());
    }

    #[test]
    fn test_round_trip_lands_in_same_cell() {
        let grid = Grid::new(16, 0.5).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for cell in grid.cells() {
            for _ in 0..8 {
                let fx: f32 = rng.random_range(0.0..0.999);
                let fz: f32 = rng.random_range(0.0..0.999);
                let p = WorldPoint::new(
                    cell.world_min.x + fx * grid.spacing(),
                    rng.random_range(-3.0..3.0),
                    cell.world_min.z + fz * grid.spacing(),
                );
                assert_eq!(grid.world_to_grid(&p), Some(cell.index));
            }
            let corner = grid.grid_to_world(cell.index).unwrap();
            assert_eq!(grid.world_to_grid(&corner), Some(cell.index));
        }
    }

    #[test]
    fn test_boundary_is_half_open() {
        let grid = Grid::new(10, 1.0).unwrap();
        // Lower edge is inside, upper edge is outside
        assert_eq!(
            grid.world_to_grid(&WorldPoint::new(-5.0, 0.0, -5.0)),
            Some(GridSquare::new(0, 0))
        );
        assert!(grid.world_to_grid(&WorldPoint::new(5.0, 0.0, 0.0)).is_none());
        assert!(grid.world_to_grid(&WorldPoint::new(0.0, 0.0, 5.0)).is_none());
        assert_eq!(
            grid.world_to_grid(&WorldPoint::new(4.999, 0.0, 4.999)),
            Some(GridSquare::new(9, 9))
        );
        assert!(grid.world_to_grid(&WorldPoint::new(-5.001, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_world_to_grid_in_window() {
        let grid = Grid::new(10, 1.0).unwrap();
        let window = SearchWindow::new(GridSquare::new(2, 2), GridSquare::new(6, 6));
        assert_eq!(
            grid.world_to_grid_in(&WorldPoint::new(-1.5, 0.0, -2.5), &window),
            Some(GridSquare::new(2, 3))
        );
        assert!(grid.world_to_grid_in(&WorldPoint::new(1.5, 0.0, 0.0), &window).is_none());
    }

    #[test]
    fn test_mark_area_sets_and_clears_occupant() {
        let mut grid = Grid::new(10, 1.0).unwrap();
        let bounds = Aabb::new(WorldPoint::new(0.2, 0.0, 0.2), WorldPoint::new(1.8, 1.0, 2.5));
        grid.mark_area_occupied(&bounds, true, Some(EntityId(9)));

        let footprint = grid.footprint(&bounds).unwrap();
        assert_eq!(footprint.min, GridSquare::new(5, 5));
        assert_eq!(footprint.max, GridSquare::new(7, 6));
        for square in footprint.squares() {
            assert!(grid.is_occupied(square));
            assert_eq!(grid.occupant(square), Some(EntityId(9)));
        }
        assert!(!grid.is_occupied(GridSquare::new(5, 7)));
        assert_eq!(grid.occupant_at(&WorldPoint::new(1.5, 0.0, 2.5)), Some(EntityId(9)));

        grid.mark_area_occupied(&bounds, false, Some(EntityId(9)));
        assert!(grid.cells().iter().all(|c| !c.is_occupied() && c.occupant().is_none()));
    }

    #[test]
    fn test_mark_squares_ignores_out_of_range() {
        let mut grid = Grid::new(4, 1.0).unwrap();
        grid.mark_squares_occupied(&[GridSquare::new(1, 1), GridSquare::new(9, 9)], true);
        assert!(grid.is_occupied(GridSquare::new(1, 1)));
        assert_eq!(grid.occupant(GridSquare::new(1, 1)), None);
        assert!(!grid.is_occupied(GridSquare::new(9, 9)));
        grid.mark_squares_occupied(&[GridSquare::new(1, 1)], false);
        assert!(!grid.is_occupied(GridSquare::new(1, 1)));
    }

    #[test]
    fn test_populate_marks_buildings_only() {
        let mut grid = Grid::new(10, 1.0).unwrap();
        grid.mark_squares_occupied(&[GridSquare::new(0, 0)], true);

        let mut floor = building(2, (-5.0, -5.0), (4.9, 4.9));
        floor.layer = CollisionLayer::Floor;
        let colliders = vec![
            building(1, (0.0, 0.0), (0.5, 0.5)),
            floor,
            building(3, (20.0, 20.0), (22.0, 22.0)),
        ];

        let marked = grid.populate(&colliders);
        assert_eq!(marked, 1);
        // Previous occupancy is cleared
        assert!(!grid.is_occupied(GridSquare::new(0, 0)));
        assert_eq!(grid.occupant(GridSquare::new(5, 5)), Some(EntityId(1)));
        let occupied = grid.cells().iter().filter(|c| c.is_occupied()).count();
        assert_eq!(occupied, 1);
    }

    #[test]
    fn test_area_unoccupied() {
        let mut grid = Grid::new(10, 1.0).unwrap();
        grid.mark_squares_occupied(&[GridSquare::new(4, 4)], true);

        let one = GridSquare::new(1, 1);
        assert!(!grid.area_unoccupied(GridSquare::new(5, 5), one));
        assert!(grid.area_unoccupied(GridSquare::new(6, 6), GridSquare::new(0, 0)));
        assert!(grid.area_unoccupied(GridSquare::new(7, 7), one));
        // Must fit inside the grid
        assert!(!grid.area_unoccupied(GridSquare::new(0, 5), one));

        let actor = Aabb::new(WorldPoint::new(0.1, 0.0, 0.1), WorldPoint::new(1.2, 1.0, 1.2));
        assert_eq!(grid.extents(&actor), Some(one));
        assert!(grid.bounding_box_area_unoccupied(&WorldPoint::new(2.5, 0.0, 2.5), &actor));
        assert!(!grid.bounding_box_area_unoccupied(&WorldPoint::new(0.5, 0.0, 0.5), &actor));
    }

    #[test]
    fn test_terrain_maps() {
        let mut grid = Grid::new(2, 1.0).unwrap();
        grid.apply_height_map(&[0, 255, 51, 102], 10.0).unwrap();
        assert_eq!(grid.cell(GridSquare::new(0, 1)).unwrap().terrain_height, 10.0);
        assert!((grid.cell(GridSquare::new(1, 0)).unwrap().terrain_height - 2.0).abs() < 1e-5);
        assert_eq!(
            grid.grid_to_world(GridSquare::new(0, 1)),
            Some(WorldPoint::new(0.0, 10.0, -1.0))
        );

        grid.apply_normal_map(&[[128, 255, 128], [255, 128, 128], [128, 128, 128], [0, 128, 128]])
            .unwrap();
        let up = grid.cell(GridSquare::new(0, 0)).unwrap().terrain_normal;
        assert!((up - Vector3::y()).norm() < 0.01);
        let east = grid.cell(GridSquare::new(0, 1)).unwrap().terrain_normal;
        assert!((east - Vector3::x()).norm() < 0.01);
        assert!((east.norm() - 1.0).abs() < 1e-5);

        assert_eq!(
            grid.apply_height_map(&[0; 3], 1.0),
            Err(NavigationError::TerrainSizeMismatch { expected: 4, actual: 3 })
        );
    }

    #[test]
    fn test_set_terrain_and_cost_bounds() {
        let mut grid = Grid::new(4, 1.0).unwrap();
        grid.set_terrain(GridSquare::new(1, 2), 3.5, Vector3::x()).unwrap();
        grid.set_pathfinding_cost(GridSquare::new(1, 2), 7).unwrap();
        let cell = grid.cell(GridSquare::new(1, 2)).unwrap();
        assert_eq!(cell.terrain_height, 3.5);
        assert_eq!(cell.pathfinding_cost, 7);
        assert!(matches!(
            grid.set_pathfinding_cost(GridSquare::new(4, 0), 2),
            Err(NavigationError::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_cast_ray_finds_occupant() {
        let mut grid = Grid::new(10, 1.0).unwrap();
        let bounds = Aabb::new(WorldPoint::new(2.0, 0.0, 0.0), WorldPoint::new(2.5, 1.0, 0.5));
        grid.mark_area_occupied(&bounds, true, Some(EntityId(4)));
        grid.mark_squares_occupied(&[GridSquare::new(5, 6)], true);

        // Anonymous obstacles are ignored
        assert_eq!(
            grid.cast_ray(GridSquare::new(5, 5), Direction::East, 5),
            Some(GridSquare::new(5, 7))
        );
        assert_eq!(grid.cast_ray(GridSquare::new(5, 5), Direction::East, 2), None);
        assert_eq!(grid.cast_ray(GridSquare::new(5, 5), Direction::West, 10), None);
    }

    #[test]
    fn test_display() {
        let mut grid = Grid::new(3, 0.5).unwrap();
        grid.mark_squares_occupied(&[GridSquare::new(1, 1)], true);
        let display = format!("{}", grid);
        assert!(display.contains("Grid (3x3, spacing: 0.500)"));
        assert!(display.contains(". # ."));
    }
}
