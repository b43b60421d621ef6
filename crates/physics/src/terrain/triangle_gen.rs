//! Triangle generation from heightfield cells
//!
//! Each grid cell is a quad split into two triangles using the same
//! convention as the render mesh, so collision and visuals agree.

use glam::Vec3;

/// A terrain triangle in heightfield-local space (y is up)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Unit normal by right-hand rule over `(a, b, c)`; zero if degenerate
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a).normalize_or_zero()
    }

    /// Barycentric weights of `p` projected onto the horizontal (xz) plane.
    ///
    /// Returns `None` for triangles whose horizontal projection is degenerate.
    pub fn barycentric_xz(&self, p: Vec3) -> Option<Vec3> {
        let (ax, az) = (self.a.x, self.a.z);
        let (bx, bz) = (self.b.x, self.b.z);
        let (cx, cz) = (self.c.x, self.c.z);

        let det = (bz - cz) * (ax - cx) + (cx - bx) * (az - cz);
        if det.abs() <= f32::EPSILON {
            return None;
        }
        let wa = ((bz - cz) * (p.x - cx) + (cx - bx) * (p.z - cz)) / det;
        let wb = ((cz - az) * (p.x - cx) + (ax - cx) * (p.z - cz)) / det;
        Some(Vec3::new(wa, wb, 1.0 - wa - wb))
    }

    /// Whether the horizontal projection of `p` falls inside the triangle,
    /// allowing `tolerance` (in barycentric units) past each edge
    pub fn contains_xz(&self, p: Vec3, tolerance: f32) -> bool {
        self.barycentric_xz(p)
            .is_some_and(|w| w.min_element() >= -tolerance)
    }

    /// Closest point on the triangle to `p`
    ///
    /// Region-based search over vertices, edges and face.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let (a, b, c) = (self.a, self.b, self.c);
        let ab = b - a;
        let ac = c - a;
        let ap = p - a;

        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        let cp = p - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = va + vb + vc;
        if denom.abs() <= f32::EPSILON {
            return a;
        }
        let v = vb / denom;
        let w = vc / denom;
        a + ab * v + ac * w
    }
}
