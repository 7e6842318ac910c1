//! Grid indices, movement directions and the per-cell record of the navigation grid.

#![warn(missing_docs)]

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use waymark_common::{EntityId, Vector3, WorldPoint};

/// Integer `(row, col)` index of a grid cell.
///
/// Indices are signed so that the result of mapping an arbitrary world point,
/// or of offsetting a square by a direction, can be represented before it is
/// checked against the grid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSquare {
    /// Row index. Follows world `z`.
    pub row: i32,
    /// Column index. Follows world `x`.
    pub col: i32,
}

impl GridSquare {
    /// The `(0, 0)` square.
    pub const ZERO: GridSquare = GridSquare::new(0, 0);

    /// Creates a new `GridSquare`.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Component-wise sign, used to compare headings of grid moves of any length.
    #[must_use]
    pub fn signum(self) -> Self {
        Self::new(self.row.signum(), self.col.signum())
    }

    /// Component-wise minimum.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.row.min(other.row), self.col.min(other.col))
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.row.max(other.row), self.col.max(other.col))
    }
}

impl Add for GridSquare {
    type Output = GridSquare;

    fn add(self, other: GridSquare) -> GridSquare {
        GridSquare::new(self.row + other.row, self.col + other.col)
    }
}

impl AddAssign for GridSquare {
    fn add_assign(&mut self, other: GridSquare) {
        self.row += other.row;
        self.col += other.col;
    }
}

impl Sub for GridSquare {
    type Output = GridSquare;

    fn sub(self, other: GridSquare) -> GridSquare {
        GridSquare::new(self.row - other.row, self.col - other.col)
    }
}

impl SubAssign for GridSquare {
    fn sub_assign(&mut self, other: GridSquare) {
        self.row -= other.row;
        self.col -= other.col;
    }
}

impl fmt::Display for GridSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Calculates the Manhattan distance between two grid squares.
pub fn manhattan_distance(a: GridSquare, b: GridSquare) -> u32 {
    a.row.abs_diff(b.row) + a.col.abs_diff(b.col)
}

/// One of the eight grid headings.
///
/// "North" is decreasing row (world `-z`), "east" is increasing column (world `+x`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Row - 1.
    North,
    /// Row + 1.
    South,
    /// Column - 1.
    West,
    /// Column + 1.
    East,
    /// Row - 1, column - 1.
    NorthWest,
    /// Row - 1, column + 1.
    NorthEast,
    /// Row + 1, column - 1.
    SouthWest,
    /// Row + 1, column + 1.
    SouthEast,
}

impl Direction {
    /// Expansion order used by every search: orthogonal moves first, then diagonals.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    /// The index offset of one step in this direction.
    pub const fn offset(self) -> GridSquare {
        match self {
            Direction::North => GridSquare::new(-1, 0),
            Direction::South => GridSquare::new(1, 0),
            Direction::West => GridSquare::new(0, -1),
            Direction::East => GridSquare::new(0, 1),
            Direction::NorthWest => GridSquare::new(-1, -1),
            Direction::NorthEast => GridSquare::new(-1, 1),
            Direction::SouthWest => GridSquare::new(1, -1),
            Direction::SouthEast => GridSquare::new(1, 1),
        }
    }

    /// Looks up the direction for a unit offset. Returns `None` for `(0, 0)`
    /// and for anything that is not a single step.
    pub fn from_offset(offset: GridSquare) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.offset() == offset)
    }

    /// Rounds a world-space heading onto the grid, ignoring its vertical component.
    ///
    /// Returns `None` when the heading has no horizontal component.
    pub fn from_vector(heading: &Vector3<f32>) -> Option<Direction> {
        let flat = Vector3::new(heading.x, 0.0, heading.z);
        let flat = flat.try_normalize(f32::EPSILON)?;
        let offset = GridSquare::new(flat.z.round() as i32, flat.x.round() as i32);
        Direction::from_offset(offset)
    }

    /// Quarter turn clockwise when the grid is viewed with row 0 at the top.
    pub fn turn_right(self) -> Direction {
        // (row, col) -> (col, -row)
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
            Direction::NorthEast => Direction::SouthEast,
            Direction::SouthEast => Direction::SouthWest,
            Direction::SouthWest => Direction::NorthWest,
            Direction::NorthWest => Direction::NorthEast,
        }
    }
}

/// Whether something currently blocks a cell.
///
/// A cell is either free, or occupied with an optional back-reference to the
/// entity responsible. Keeping both facts in one value means they can only
/// ever be set and cleared together.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Occupancy {
    /// Nothing blocks the cell.
    #[default]
    Free,
    /// The cell is blocked. `occupant` is `None` for anonymous obstacles.
    Occupied {
        /// Handle of the blocking entity, if known.
        occupant: Option<EntityId>,
    },
}

impl Occupancy {
    /// Returns true if the cell is blocked.
    pub fn is_occupied(&self) -> bool {
        matches!(self, Occupancy::Occupied { .. })
    }

    /// Returns the blocking entity, if any.
    pub fn occupant(&self) -> Option<EntityId> {
        match self {
            Occupancy::Free => None,
            Occupancy::Occupied { occupant } => *occupant,
        }
    }
}

/// One cell of the navigation grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    /// Index of the cell, fixed at grid construction.
    pub index: GridSquare,
    /// Minimum world-space corner of the cell footprint.
    pub world_min: WorldPoint,
    /// Maximum world-space corner of the cell footprint.
    pub world_max: WorldPoint,
    /// Centre of the footprint, cached at construction.
    pub world_center: WorldPoint,
    /// Ground height sampled by the terrain system.
    pub terrain_height: f32,
    /// Ground normal sampled by the terrain system.
    pub terrain_normal: Vector3<f32>,
    /// Cost of stepping onto this cell in weighted searches.
    pub pathfinding_cost: i32,
    occupancy: Occupancy,
}

impl GridCell {
    /// Creates a free, flat cell with the default pathfinding cost.
    pub fn new(index: GridSquare, world_min: WorldPoint, world_max: WorldPoint) -> Self {
        Self {
            index,
            world_min,
            world_max,
            world_center: nalgebra::center(&world_min, &world_max),
            terrain_height: 0.0,
            terrain_normal: Vector3::y(),
            pathfinding_cost: 1,
            occupancy: Occupancy::Free,
        }
    }

    /// Returns the current occupancy of the cell.
    pub fn occupancy(&self) -> Occupancy {
        self.occupancy
    }

    /// Returns true if the cell is blocked.
    pub fn is_occupied(&self) -> bool {
        self.occupancy.is_occupied()
    }

    /// Returns the entity blocking the cell, if any.
    pub fn occupant(&self) -> Option<EntityId> {
        self.occupancy.occupant()
    }

    /// Replaces the occupancy of the cell, returning the previous value.
    pub fn set_occupancy(&mut self, occupancy: Occupancy) -> Occupancy {
        std::mem::replace(&mut self.occupancy, occupancy)
    }

    /// Marks the cell occupied by `occupant`.
    pub fn occupy(&mut self, occupant: Option<EntityId>) {
        self.occupancy = Occupancy::Occupied { occupant };
    }

    /// Clears both the occupied flag and the occupant reference.
    pub fn vacate(&mut self) {
        self.occupancy = Occupancy::Free;
    }
}
