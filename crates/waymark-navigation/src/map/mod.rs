//! Grid storage and coordinate mapping for navigation.
//!
//! This module provides the navigation grid, its cells and the index types
//! used to address them.

pub mod cell;
pub mod grid;

pub use cell::{Direction, GridCell, GridSquare, Occupancy, manhattan_distance};
pub use grid::{Footprint, Grid};
