//! Core geometric types shared between the navigation engine and the world around it.
//!
//! This crate wraps nalgebra types to give the rest of the workspace a small,
//! domain-specific vocabulary: world-space points, axis-aligned bounding volumes,
//! opaque entity handles and the coarse collision layers reported by the
//! collision system.
//!
//! # Coordinate Systems
//!
//! - **World Frame**: Y-up, right-handed. The ground plane is spanned by `x` and `z`.
//! - **Grid Frame**: integer `(row, col)` indices where `row` follows world `z`
//!   and `col` follows world `x`. See `waymark-navigation` for the mapping.

#![warn(missing_docs)]

use std::fmt;

use nalgebra::Point3;

// Re-export nalgebra types for direct use where appropriate
pub use nalgebra::Vector3;

/// A point in world coordinates.
pub type WorldPoint = Point3<f32>;

/// Opaque handle into an external entity store.
///
/// The navigation grid only ever stores these as back-references; it never
/// owns, creates or destroys the entity behind the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: WorldPoint,
    /// Maximum corner.
    pub max: WorldPoint,
}

impl Aabb {
    /// Creates a bounding box from two corners.
    ///
    /// The corners do not need to be ordered; each axis is sorted so that
    /// `min <= max` holds component-wise.
    pub fn new(a: WorldPoint, b: WorldPoint) -> Self {
        Self {
            min: WorldPoint::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: WorldPoint::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates a bounding box centred on `center` with the given half-size.
    pub fn from_center(center: WorldPoint, half_extents: Vector3<f32>) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Returns the centre of the box.
    pub fn center(&self) -> WorldPoint {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns the size of the box along each axis.
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Returns true if `point` lies inside the box (inclusive).
    pub fn contains(&self, point: &WorldPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

/// Coarse classification attached to every collider by the collision system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CollisionLayer {
    /// No special meaning.
    #[default]
    Default,
    /// Walkable ground. Feeds terrain sampling, never blocks movement.
    Floor,
    /// Permanent structures that block movement.
    Building,
    /// Moving agents. They reserve cells themselves while they move.
    Player,
    /// Hostile agents.
    Enemy,
    /// Scenery that is only used for visuals.
    Background,
}

impl CollisionLayer {
    /// Returns true if objects on this layer permanently block movement.
    pub fn is_blocking(self) -> bool {
        matches!(self, CollisionLayer::Building)
    }
}

impl fmt::Display for CollisionLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollisionLayer::Default => "default",
            CollisionLayer::Floor => "floor",
            CollisionLayer::Building => "building",
            CollisionLayer::Player => "player",
            CollisionLayer::Enemy => "enemy",
            CollisionLayer::Background => "background",
        };
        f.write_str(name)
    }
}

/// One object reported by the collision system.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Collider {
    /// The entity that owns the collider.
    pub entity: EntityId,
    /// World-space bounding volume.
    pub bounds: Aabb,
    /// Collision layer of the object.
    pub layer: CollisionLayer,
}

/// Source of colliders for bulk grid population.
///
/// Implemented by whatever external system tracks collision volumes. The
/// navigation grid only reads from it while repopulating.
pub trait OccupancyProvider {
    /// Iterates over every collider currently known to the provider.
    fn colliders(&self) -> impl Iterator<Item = Collider> + '_;
}

impl OccupancyProvider for [Collider] {
    fn colliders(&self) -> impl Iterator<Item = Collider> + '_ {
        self.iter().copied()
    }
}

impl OccupancyProvider for Vec<Collider> {
    fn colliders(&self) -> impl Iterator<Item = Collider> + '_ {
        self.iter().copied()
    }
}
