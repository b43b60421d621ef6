//! Exact contact generation for candidate pairs
//!
//! Dispatch goes through a table indexed by the two [`ShapeKind`]s. Each
//! entry names a handler and whether the pair must be swapped to fit it;
//! swapped results are flipped back so the normal always points from the
//! second body to the first.

mod convex;
mod heightfield;

pub use convex::{box_box, sphere_box, sphere_sphere};
pub use heightfield::convex_heightfield;

use crate::body::RigidBody;
use crate::collider::{CollisionShape, ShapeKind};
use crate::collision::Contact;

type ContactFn = fn(&RigidBody, &RigidBody) -> Option<Contact>;

#[derive(Clone, Copy)]
enum Handler {
    Direct(ContactFn),
    Swapped(ContactFn),
    Unsupported,
}

use Handler::{Direct, Swapped, Unsupported};

// Rows: first body kind, columns: second body kind (Heightfield, Box, Sphere)
const DISPATCH: [[Handler; 3]; 3] = [
    [Unsupported, Swapped(convex_vs_terrain), Swapped(convex_vs_terrain)],
    [Direct(convex_vs_terrain), Direct(box_vs_box), Swapped(sphere_vs_box)],
    [Direct(convex_vs_terrain), Direct(sphere_vs_box), Direct(sphere_vs_sphere)],
];

/// Contact between two bodies, normal pointing from `b` towards `a`
pub fn contact(a: &RigidBody, b: &RigidBody) -> Option<Contact> {
    match DISPATCH[a.shape_kind() as usize][b.shape_kind() as usize] {
        Direct(handler) => handler(a, b),
        Swapped(handler) => handler(b, a).map(Contact::flipped),
        Unsupported => None,
    }
}

/// Whether the narrow phase handles this pair of shape kinds
pub fn supports(a: ShapeKind, b: ShapeKind) -> bool {
    !matches!(DISPATCH[a as usize][b as usize], Unsupported)
}

fn convex_vs_terrain(body: &RigidBody, terrain: &RigidBody) -> Option<Contact> {
    let heightfield = terrain.shape().as_heightfield()?;
    convex_heightfield(body.shape(), &body.pose(), heightfield, &terrain.pose())
}

fn box_vs_box(a: &RigidBody, b: &RigidBody) -> Option<Contact> {
    match (a.shape().as_ref(), b.shape().as_ref()) {
        (CollisionShape::Box { half_extents: ha }, CollisionShape::Box { half_extents: hb }) => {
            box_box(&a.pose(), *ha, &b.pose(), *hb)
        }
        _ => None,
    }
}

fn sphere_vs_box(sphere: &RigidBody, cuboid: &RigidBody) -> Option<Contact> {
    match (sphere.shape().as_ref(), cuboid.shape().as_ref()) {
        (CollisionShape::Sphere { radius }, CollisionShape::Box { half_extents }) => {
            sphere_box(sphere.position(), *radius, &cuboid.pose(), *half_extents)
        }
        _ => None,
    }
}

fn sphere_vs_sphere(a: &RigidBody, b: &RigidBody) -> Option<Contact> {
    match (a.shape().as_ref(), b.shape().as_ref()) {
        (CollisionShape::Sphere { radius: ra }, CollisionShape::Sphere { radius: rb }) => {
            sphere_sphere(a.position(), *ra, b.position(), *rb)
        }
        _ => None,
    }
}
