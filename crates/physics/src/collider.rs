//! Collision shapes
//!
//! A [`CollisionShape`] is immutable once created and shared between bodies
//! through an `Arc`, so every box in a scene can point at one box shape.
//!
//! # Shapes
//!
//! - **Heightfield**: static terrain, see [`HeightfieldShape`]
//! - **Box**: oriented box given by half extents
//! - **Sphere**: sphere given by radius

use crate::collision::Aabb;
use crate::error::{PhysicsError, Result};
use crate::terrain::HeightfieldShape;
use coldet_terrain::HeightSampleGrid;
use glam::Vec3;
use std::sync::Arc;

/// Shape discriminant, used for rendering and narrow-phase dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Heightfield = 0,
    Box = 1,
    Sphere = 2,
}

/// Collision geometry attached to a rigid body
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionShape {
    /// Static terrain
    Heightfield(HeightfieldShape),
    /// Box centred on the body origin
    Box { half_extents: Vec3 },
    /// Sphere centred on the body origin
    Sphere { radius: f32 },
}

impl CollisionShape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            CollisionShape::Heightfield(_) => ShapeKind::Heightfield,
            CollisionShape::Box { .. } => ShapeKind::Box,
            CollisionShape::Sphere { .. } => ShapeKind::Sphere,
        }
    }

    /// Boxes and spheres are convex; a heightfield is not
    pub fn is_convex(&self) -> bool {
        !matches!(self, CollisionShape::Heightfield(_))
    }

    /// Check shape dimensions
    pub fn validate(&self) -> Result<()> {
        match self {
            CollisionShape::Heightfield(_) => Ok(()),
            CollisionShape::Box { half_extents } => {
                if half_extents.is_finite() && half_extents.min_element() > 0.0 {
                    Ok(())
                } else {
                    Err(PhysicsError::InvalidShape(format!(
                        "box half extents must be finite and > 0, got {half_extents}"
                    )))
                }
            }
            CollisionShape::Sphere { radius } => {
                if radius.is_finite() && *radius > 0.0 {
                    Ok(())
                } else {
                    Err(PhysicsError::InvalidShape(format!(
                        "sphere radius must be finite and > 0, got {radius}"
                    )))
                }
            }
        }
    }

    /// Farthest point of the shape along `direction`, in shape space.
    ///
    /// For a heightfield this is the support point of its bounding box.
    pub fn support(&self, direction: Vec3) -> Vec3 {
        match self {
            CollisionShape::Box { half_extents } => *half_extents * direction.signum(),
            CollisionShape::Sphere { radius } => direction.normalize_or_zero() * *radius,
            CollisionShape::Heightfield(_) => {
                let aabb = self.local_aabb();
                Vec3::select(direction.cmpge(Vec3::ZERO), aabb.max, aabb.min)
            }
        }
    }

    /// Bounding box in shape space
    pub fn local_aabb(&self) -> Aabb {
        match self {
            CollisionShape::Box { half_extents } => {
                Aabb::from_center_half_extents(Vec3::ZERO, *half_extents)
            }
            CollisionShape::Sphere { radius } => {
                Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(*radius))
            }
            CollisionShape::Heightfield(hf) => {
                hf.local_aabb().to_world(Vec3::ZERO, hf.up_axis().frame())
            }
        }
    }

    /// Diagonal of the local inertia tensor for `mass`.
    ///
    /// Zero for zero mass and for heightfields.
    pub fn local_inertia(&self, mass: f32) -> Vec3 {
        if mass <= 0.0 {
            return Vec3::ZERO;
        }
        match self {
            CollisionShape::Box { half_extents } => {
                let e = *half_extents * 2.0;
                let (x2, y2, z2) = (e.x * e.x, e.y * e.y, e.z * e.z);
                Vec3::new(y2 + z2, x2 + z2, x2 + y2) * (mass / 12.0)
            }
            CollisionShape::Sphere { radius } => Vec3::splat(0.4 * mass * radius * radius),
            CollisionShape::Heightfield(_) => Vec3::ZERO,
        }
    }

    pub fn as_heightfield(&self) -> Option<&HeightfieldShape> {
        match self {
            CollisionShape::Heightfield(hf) => Some(hf),
            _ => None,
        }
    }
}

/// Create a shared box shape from half extents
pub fn create_box_collider(half_extents: Vec3) -> Result<Arc<CollisionShape>> {
    let shape = CollisionShape::Box { half_extents };
    shape.validate()?;
    Ok(Arc::new(shape))
}

/// Create a shared sphere shape
pub fn create_sphere_collider(radius: f32) -> Result<Arc<CollisionShape>> {
    let shape = CollisionShape::Sphere { radius };
    shape.validate()?;
    Ok(Arc::new(shape))
}

/// Create a shared heightfield shape laid out like the grid's render mesh
pub fn create_heightfield_collider(grid: HeightSampleGrid) -> Arc<CollisionShape> {
    Arc::new(CollisionShape::Heightfield(HeightfieldShape::from_grid(grid)))
}
