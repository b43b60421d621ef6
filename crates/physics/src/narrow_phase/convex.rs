//! Contacts between convex primitives
//!
//! All functions return the normal pointing from the second shape to the first.

use crate::body::Pose;
use crate::collision::Contact;
use glam::{Mat3, Vec3};

const PARALLEL_EPSILON: f32 = 1e-6;

/// Sphere `a` against sphere `b`
pub fn sphere_sphere(center_a: Vec3, radius_a: f32, center_b: Vec3, radius_b: f32) -> Option<Contact> {
    let delta = center_a - center_b;
    let distance = delta.length();
    let depth = radius_a + radius_b - distance;
    if depth < 0.0 {
        return None;
    }
    let normal = if distance > PARALLEL_EPSILON {
        delta / distance
    } else {
        Vec3::Y
    };
    let point = center_b + normal * (radius_b - depth * 0.5);
    Some(Contact::new(point, normal, depth))
}

/// Sphere `a` against oriented box `b`
pub fn sphere_box(center: Vec3, radius: f32, box_pose: &Pose, half_extents: Vec3) -> Option<Contact> {
    let local = box_pose.inverse_transform_point(center);
    let clamped = local.clamp(-half_extents, half_extents);

    let (local_normal, local_point, depth) = if local != clamped {
        let delta = local - clamped;
        let distance = delta.length();
        if distance > radius {
            return None;
        }
        (delta / distance, clamped, radius - distance)
    } else {
        // Centre inside the box: push out through the nearest face
        let gaps = half_extents - local.abs();
        let axis = min_axis(gaps);
        let sign = if local[axis] < 0.0 { -1.0 } else { 1.0 };
        let mut normal = Vec3::ZERO;
        normal[axis] = sign;
        let mut on_face = local;
        on_face[axis] = half_extents[axis] * sign;
        (normal, on_face, radius + gaps[axis])
    };

    Some(Contact::new(
        box_pose.transform_point(local_point),
        box_pose.orientation * local_normal,
        depth,
    ))
}

/// Oriented box `a` against oriented box `b` by separating axes.
///
/// The contact point is the depth-weighted centre of the penetrating
/// vertices of the incident box.
pub fn box_box(pose_a: &Pose, half_a: Vec3, pose_b: &Pose, half_b: Vec3) -> Option<Contact> {
    let axes_a = Mat3::from_quat(pose_a.orientation);
    let axes_b = Mat3::from_quat(pose_b.orientation);
    let offset = pose_a.position - pose_b.position;

    let project = |axes: &Mat3, half: Vec3, dir: Vec3| -> f32 {
        (0..3).map(|i| half[i] * axes.col(i).dot(dir).abs()).sum()
    };

    // Face axes are preferred over edge axes on near ties
    let mut best: Option<(Vec3, f32, Feature)> = None;
    let mut consider = |axis: Vec3, feature: Feature| -> bool {
        let length = axis.length();
        if length < PARALLEL_EPSILON {
            return true;
        }
        let axis = axis / length;
        let distance = offset.dot(axis);
        let overlap = project(&axes_a, half_a, axis) + project(&axes_b, half_b, axis) - distance.abs();
        if overlap < 0.0 {
            return false;
        }
        let biased = if feature == Feature::Edge { overlap * 1.05 + 1e-4 } else { overlap };
        let replace = match best {
            Some((_, current, _)) => biased < current,
            None => true,
        };
        if replace {
            let oriented = if distance < 0.0 { -axis } else { axis };
            best = Some((oriented, overlap, feature));
        }
        true
    };

    for i in 0..3 {
        if !consider(axes_b.col(i), Feature::FaceB) || !consider(axes_a.col(i), Feature::FaceA) {
            return None;
        }
    }
    for i in 0..3 {
        for j in 0..3 {
            if !consider(axes_a.col(i).cross(axes_b.col(j)), Feature::Edge) {
                return None;
            }
        }
    }

    let (normal, depth, feature) = best?;
    let corners = |pose: &Pose, half: Vec3| -> [Vec3; 8] {
        let mut out = [Vec3::ZERO; 8];
        for (k, slot) in out.iter_mut().enumerate() {
            let sign = Vec3::new(
                if k & 1 == 0 { -1.0 } else { 1.0 },
                if k & 2 == 0 { -1.0 } else { 1.0 },
                if k & 4 == 0 { -1.0 } else { 1.0 },
            );
            *slot = pose.transform_point(half * sign);
        }
        out
    };

    let point = match feature {
        Feature::FaceB => {
            let plane = pose_b.position.dot(normal) + project(&axes_b, half_b, normal);
            weighted_centre(corners(pose_a, half_a).iter().map(|&p| (p, plane - p.dot(normal))))
        }
        Feature::FaceA => {
            let plane = pose_a.position.dot(normal) - project(&axes_a, half_a, normal);
            weighted_centre(corners(pose_b, half_b).iter().map(|&p| (p, p.dot(normal) - plane)))
        }
        Feature::Edge => None,
    };
    let point = point.unwrap_or_else(|| {
        let on_a = pose_a.transform_point(support_box(&axes_a, half_a, -normal));
        let on_b = pose_b.transform_point(support_box(&axes_b, half_b, normal));
        (on_a + on_b) * 0.5
    });

    Some(Contact::new(point, normal, depth))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Feature {
    FaceA,
    FaceB,
    Edge,
}

fn min_axis(v: Vec3) -> usize {
    if v.x <= v.y && v.x <= v.z {
        0
    } else if v.y <= v.z {
        1
    } else {
        2
    }
}

/// Box-local support vertex along world direction `dir`
fn support_box(axes: &Mat3, half: Vec3, dir: Vec3) -> Vec3 {
    let local_dir = axes.transpose() * dir;
    half * local_dir.signum()
}

/// Depth-weighted centre of points with positive depth
pub(crate) fn weighted_centre(points: impl Iterator<Item = (Vec3, f32)>) -> Option<Vec3> {
    let mut sum = Vec3::ZERO;
    let mut weight = 0.0;
    for (p, depth) in points {
        if depth > 0.0 {
            sum += p * depth;
            weight += depth;
        }
    }
    (weight > 0.0).then(|| sum / weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_sphere_sphere() {
        let c = sphere_sphere(Vec3::new(1.5, 0.0, 0.0), 1.0, Vec3::ZERO, 1.0).unwrap();
        assert!((c.depth - 0.5).abs() < 1e-6);
        assert_eq!(c.normal, Vec3::X);
        assert!((c.point - Vec3::new(0.75, 0.0, 0.0)).length() < 1e-6);
        assert!(sphere_sphere(Vec3::new(2.5, 0.0, 0.0), 1.0, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_coincident_spheres() {
        let c = sphere_sphere(Vec3::ZERO, 1.0, Vec3::ZERO, 1.0).unwrap();
        assert_eq!(c.normal, Vec3::Y);
        assert!((c.depth - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_sphere_on_box_face() {
        let pose = Pose::IDENTITY;
        let c = sphere_box(Vec3::new(0.0, 1.8, 0.0), 1.0, &pose, Vec3::ONE).unwrap();
        assert!((c.normal - Vec3::Y).length() < 1e-6);
        assert!((c.depth - 0.2).abs() < 1e-5);
        assert!((c.point - Vec3::Y).length() < 1e-6);
        assert!(sphere_box(Vec3::new(0.0, 2.5, 0.0), 1.0, &pose, Vec3::ONE).is_none());
    }

    #[test]
    fn test_sphere_inside_box() {
        let pose = Pose::from_position(Vec3::new(10.0, 0.0, 0.0));
        let c = sphere_box(Vec3::new(10.0, 0.0, 0.8), 0.5, &pose, Vec3::ONE).unwrap();
        assert!((c.normal - Vec3::Z).length() < 1e-6);
        assert!((c.depth - 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_rotated_box() {
        let pose = Pose::new(Vec3::ZERO, Quat::from_rotation_z(std::f32::consts::FRAC_PI_4));
        // Box corner now points straight up at height sqrt(2)
        let c = sphere_box(Vec3::new(0.0, 1.414 + 0.9, 0.0), 1.0, &pose, Vec3::ONE).unwrap();
        assert!(c.normal.y > 0.99);
        assert!(c.depth > 0.05 && c.depth < 0.15);
    }

    #[test]
    fn test_stacked_boxes() {
        let bottom = Pose::IDENTITY;
        let top = Pose::from_position(Vec3::new(0.0, 1.9, 0.0));
        let c = box_box(&top, Vec3::ONE, &bottom, Vec3::ONE).unwrap();
        assert!((c.normal - Vec3::Y).length() < 1e-5);
        assert!((c.depth - 0.1).abs() < 1e-4);
        // Face contact centred between the boxes
        assert!(c.point.x.abs() < 1e-4 && c.point.z.abs() < 1e-4);
    }

    #[test]
    fn test_separated_boxes() {
        let a = Pose::from_position(Vec3::new(2.1, 0.0, 0.0));
        assert!(box_box(&a, Vec3::ONE, &Pose::IDENTITY, Vec3::ONE).is_none());
        // Rotated corner reaches x = 2.5 - sqrt(2), short of the face at x = 1
        let rotated = Pose::new(Vec3::new(2.5, 0.0, 0.0), Quat::from_rotation_y(0.78));
        assert!(box_box(&rotated, Vec3::ONE, &Pose::IDENTITY, Vec3::ONE).is_none());
        let touching = Pose::new(Vec3::new(2.3, 0.0, 0.0), Quat::from_rotation_y(0.78));
        assert!(box_box(&touching, Vec3::ONE, &Pose::IDENTITY, Vec3::ONE).is_some());
    }

    #[test]
    fn test_box_normal_points_towards_first() {
        let a = Pose::from_position(Vec3::new(-1.5, 0.0, 0.0));
        let c = box_box(&a, Vec3::ONE, &Pose::IDENTITY, Vec3::ONE).unwrap();
        assert!((c.normal + Vec3::X).length() < 1e-5);
        assert!((c.depth - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_weighted_centre() {
        let pts = [(Vec3::ZERO, 1.0), (Vec3::X * 2.0, 1.0), (Vec3::Y, -1.0)];
        assert_eq!(weighted_centre(pts.into_iter()), Some(Vec3::X));
        assert_eq!(weighted_centre([(Vec3::ONE, 0.0)].into_iter()), None);
    }
}
