//! Convex shapes against a static heightfield
//!
//! Work happens in heightfield-local space (height on y), where the
//! footprint of the body picks the grid cells to test.

use super::convex::weighted_centre;
use crate::body::Pose;
use crate::collider::CollisionShape;
use crate::collision::{Aabb, Contact};
use crate::terrain::{HeightfieldShape, Triangle};
use glam::Vec3;

/// Barycentric slack past triangle edges so points on a cell seam are not lost
const EDGE_TOLERANCE: f32 = 0.01;

/// Contact of a convex body against the terrain; normal points away from the terrain
pub fn convex_heightfield(
    shape: &CollisionShape,
    body_pose: &Pose,
    heightfield: &HeightfieldShape,
    terrain_pose: &Pose,
) -> Option<Contact> {
    let frame = Pose::new(
        terrain_pose.position,
        terrain_pose.orientation * heightfield.up_axis().frame(),
    );
    let local_pose = Pose::new(
        frame.inverse_transform_point(body_pose.position),
        (frame.orientation.inverse() * body_pose.orientation).normalize(),
    );
    let local_aabb = shape
        .local_aabb()
        .to_world(local_pose.position, local_pose.orientation);
    let cells = heightfield.cells_in_aabb(&local_aabb)?;
    let triangles = cells
        .iter()
        .flat_map(|(row, col)| heightfield.cell_triangles(row, col));

    let local = match shape {
        CollisionShape::Sphere { radius } => sphere_triangles(local_pose.position, *radius, triangles),
        CollisionShape::Box { half_extents } => {
            let corners = Aabb::from_center_half_extents(Vec3::ZERO, *half_extents)
                .corners()
                .map(|c| local_pose.transform_point(c));
            points_triangles(&corners, triangles)
        }
        CollisionShape::Heightfield(_) => None,
    }?;

    Some(Contact::new(
        frame.transform_point(local.point),
        frame.orientation * local.normal,
        local.depth,
    ))
}

/// Deepest contact of a sphere against a set of triangles
fn sphere_triangles(center: Vec3, radius: f32, triangles: impl Iterator<Item = Triangle>) -> Option<Contact> {
    let mut deepest = None;
    for tri in triangles {
        let face_normal = tri.normal();
        if face_normal == Vec3::ZERO {
            continue;
        }
        let plane_distance = (center - tri.a).dot(face_normal);
        if plane_distance > radius {
            continue;
        }

        let contact = if plane_distance < 0.0 {
            // Centre sunk below the surface: only the triangle right above it counts
            if !tri.contains_xz(center, EDGE_TOLERANCE) {
                continue;
            }
            Contact::new(
                center - face_normal * plane_distance,
                face_normal,
                radius - plane_distance,
            )
        } else {
            let closest = tri.closest_point(center);
            let offset = center - closest;
            let distance = offset.length();
            if distance > radius {
                continue;
            }
            let normal = if distance > 1e-6 { offset / distance } else { face_normal };
            Contact::new(closest, normal, radius - distance)
        };
        deepest = Contact::deepest(deepest, contact);
    }
    deepest
}

/// Contact of a set of vertices against triangles.
///
/// A vertex below a triangle's plane and over its footprint is a candidate,
/// counted once with its deepest triangle. Depth is the deepest candidate;
/// point and normal are the depth-weighted average so a flat resting face
/// gets a centred contact.
fn points_triangles(points: &[Vec3], triangles: impl Iterator<Item = Triangle>) -> Option<Contact> {
    let faces: Vec<(Triangle, Vec3)> = triangles
        .map(|tri| (tri, tri.normal()))
        .filter(|(_, normal)| *normal != Vec3::ZERO)
        .collect();

    let mut candidates: Vec<(Vec3, Vec3, f32)> = Vec::new();
    for &p in points {
        let mut deepest: Option<(Vec3, Vec3, f32)> = None;
        for (tri, face_normal) in &faces {
            let distance = (p - tri.a).dot(*face_normal);
            if distance >= 0.0 || !tri.contains_xz(p, EDGE_TOLERANCE) {
                continue;
            }
            if deepest.map_or(true, |(_, _, depth)| -distance > depth) {
                deepest = Some((p - *face_normal * distance, *face_normal, -distance));
            }
        }
        candidates.extend(deepest);
    }

    let depth = candidates.iter().map(|c| c.2).fold(0.0_f32, f32::max);
    if depth <= 0.0 {
        return None;
    }
    let point = weighted_centre(candidates.iter().map(|&(p, _, d)| (p, d)))?;
    let normal = candidates
        .iter()
        .fold(Vec3::ZERO, |acc, &(_, n, d)| acc + n * d)
        .normalize_or_zero();
    if normal == Vec3::ZERO {
        return None;
    }
    Some(Contact::new(point, normal, depth))
}
