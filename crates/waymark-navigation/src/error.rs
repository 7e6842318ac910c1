//! This module defines the error types used by the `waymark-navigation` crate.

#![warn(missing_docs)]

/// Error type for grid operations.
///
/// Only construction and direct, index-based cell access report errors this
/// way. Pathfinding never does: a search that cannot produce a route returns
/// an empty path instead.
#[derive(Debug, PartialEq)]
pub enum NavigationError {
    /// Error for an invalid grid extent.
    /// This variant is returned when the number of cells per side is not positive.
    InvalidExtent(&'static str),
    /// Error for invalid cell spacing.
    /// This variant is returned when the world size of a cell is not a positive, finite number.
    InvalidSpacing(&'static str),
    /// Error for out-of-bounds access.
    /// This variant is returned when attempting to access cells outside the grid.
    OutOfBounds(&'static str),
    /// Error for terrain data that does not cover the grid exactly.
    TerrainSizeMismatch {
        /// Number of samples the grid needs.
        expected: usize,
        /// Number of samples that were supplied.
        actual: usize,
    },
}

impl core::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NavigationError::InvalidExtent(msg) => write!(f, "Invalid grid extent: {}", msg),
            NavigationError::InvalidSpacing(msg) => write!(f, "Invalid grid spacing: {}", msg),
            NavigationError::OutOfBounds(msg) => write!(f, "Grid access out of bounds: {}", msg),
            NavigationError::TerrainSizeMismatch { expected, actual } => write!(
                f,
                "Terrain data size mismatch: expected {} samples, got {}",
                expected, actual
            ),
        }
    }
}

impl core::error::Error for NavigationError {}
