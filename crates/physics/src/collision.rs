//! Collision primitives shared by the broad and narrow phase
//!
//! Bounding boxes and contacts use only glam types.

use glam::{Quat, Vec3};

/// Axis-aligned bounding box used by the broad phase and terrain cell lookup
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from its center and half extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// An inverted box that the first `expand_to_include` replaces
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    /// World box enclosing this local box after rotation and translation
    ///
    /// # Example
    /// ```
    /// use coldet_physics::Aabb;
    /// use glam::{Quat, Vec3};
    ///
    /// let local = Aabb::new(Vec3::ZERO, Vec3::ONE);
    /// let world = local.to_world(Vec3::new(10.0, 0.0, 0.0), Quat::IDENTITY);
    /// assert_eq!(world.min, Vec3::new(10.0, 0.0, 0.0));
    /// assert_eq!(world.max, Vec3::new(11.0, 1.0, 1.0));
    /// ```
    pub fn to_world(&self, position: Vec3, rotation: Quat) -> Self {
        let mut world = Self::empty();
        for corner in self.corners() {
            world.expand_to_include(position + rotation * corner);
        }
        world
    }

    /// The 8 corners of the box
    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Overlap test; touching faces count as overlapping
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Expand the AABB to include a point
    pub fn expand_to_include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Grow the box by `margin` on every side
    pub fn loosened(&self, margin: f32) -> Aabb {
        Aabb {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }
}

/// A single contact between two shapes.
///
/// `normal` points from the second shape towards the first, so pushing the
/// first body along `normal` separates the pair. For terrain contacts the
/// terrain is always second and the normal points away from the terrain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// World-space contact point
    pub point: Vec3,
    /// Unit separation direction
    pub normal: Vec3,
    /// Penetration depth, always >= 0
    pub depth: f32,
}

impl Contact {
    pub fn new(point: Vec3, normal: Vec3, depth: f32) -> Self {
        Self {
            point,
            normal,
            depth: depth.max(0.0),
        }
    }

    /// Same contact seen from the other shape
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }

    /// Keep whichever contact penetrates deeper
    pub fn deepest(current: Option<Contact>, candidate: Contact) -> Option<Contact> {
        match current {
            Some(existing) if existing.depth >= candidate.depth => Some(existing),
            _ => Some(candidate),
        }
    }
}
