//! Heightfield terrain collider
//!
//! Wraps a [`HeightSampleGrid`] as a static collision shape. The grid is
//! centred on the shape origin; cell spacing along the two planar axes is
//! `scale_x` and `scale_z`, and the sample value runs along the up axis.

use super::triangle_gen::Triangle;
use crate::collision::Aabb;
use crate::error::{PhysicsError, Result};
use coldet_terrain::{cell_triangles, HeightSampleGrid};
use glam::{Mat3, Quat, Vec3};

/// World axis the heightfield samples run along
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpAxis {
    X,
    #[default]
    Y,
    Z,
}

impl UpAxis {
    /// Rotation from heightfield-local space (height on local y) to the
    /// shape's frame with height on this axis.
    ///
    /// Only cyclic axis permutations are used so the frame stays a proper rotation.
    pub fn frame(self) -> Quat {
        match self {
            UpAxis::Y => Quat::IDENTITY,
            UpAxis::Z => Quat::from_mat3(&Mat3::from_cols(Vec3::Y, Vec3::Z, Vec3::X)),
            UpAxis::X => Quat::from_mat3(&Mat3::from_cols(Vec3::Z, Vec3::X, Vec3::Y)),
        }
    }
}

/// Inclusive range of grid cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRange {
    pub rows: (usize, usize),
    pub cols: (usize, usize),
}

impl CellRange {
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> {
        let (r0, r1) = self.rows;
        let (c0, c1) = self.cols;
        (r0..=r1).flat_map(move |row| (c0..=c1).map(move |col| (row, col)))
    }
}

/// Static heightfield collision shape
///
/// Heights are stored in local space where y is up; [`UpAxis::frame`] maps
/// that space into the shape frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightfieldShape {
    grid: HeightSampleGrid,
    scale_x: f32,
    scale_z: f32,
    up_axis: UpAxis,
}

impl HeightfieldShape {
    /// Create a heightfield shape
    ///
    /// # Arguments
    /// * `grid` - Height samples, owned by the shape from now on
    /// * `scale_x` - Distance between samples along local x (columns)
    /// * `scale_z` - Distance between samples along local z (rows)
    /// * `up_axis` - Axis the heights run along
    pub fn new(grid: HeightSampleGrid, scale_x: f32, scale_z: f32, up_axis: UpAxis) -> Result<Self> {
        for scale in [scale_x, scale_z] {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(PhysicsError::InvalidShape(format!(
                    "heightfield scale must be finite and > 0, got {scale}"
                )));
            }
        }
        Ok(Self {
            grid,
            scale_x,
            scale_z,
            up_axis,
        })
    }

    /// Shape matching the render mesh of `grid`: y up, sample spacing
    /// `grid_scale / (size - 1)` on both axes
    pub fn from_grid(grid: HeightSampleGrid) -> Self {
        let spacing = grid.spacing();
        Self {
            grid,
            scale_x: spacing,
            scale_z: spacing,
            up_axis: UpAxis::Y,
        }
    }

    pub fn grid(&self) -> &HeightSampleGrid {
        &self.grid
    }

    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    pub fn scale_z(&self) -> f32 {
        self.scale_z
    }

    pub fn up_axis(&self) -> UpAxis {
        self.up_axis
    }

    /// Bounding height range `[min_height, max_height]`
    pub fn height_range(&self) -> (f32, f32) {
        (self.grid.min_height(), self.grid.max_height())
    }

    /// Half the planar extent along local x and z
    pub fn half_extents_xz(&self) -> (f32, f32) {
        let cells = self.grid.cells() as f32;
        (cells * self.scale_x * 0.5, cells * self.scale_z * 0.5)
    }

    /// Local-space bounding box (height on y)
    pub fn local_aabb(&self) -> Aabb {
        let (hx, hz) = self.half_extents_xz();
        let (lo, hi) = self.height_range();
        Aabb::new(Vec3::new(-hx, lo, -hz), Vec3::new(hx, hi, hz))
    }

    /// Continuous grid coordinates `(col, row)` of a local position
    fn grid_coords(&self, x: f32, z: f32) -> (f32, f32) {
        let half = self.grid.cells() as f32 * 0.5;
        (x / self.scale_x + half, z / self.scale_z + half)
    }

    /// Local position of sample `(row, col)`
    pub fn vertex(&self, row: usize, col: usize) -> Vec3 {
        let half = self.grid.cells() as f32 * 0.5;
        Vec3::new(
            (col as f32 - half) * self.scale_x,
            self.grid.get_clamped(row, col),
            (row as f32 - half) * self.scale_z,
        )
    }

    /// Terrain height at local `(x, z)` by bilinear interpolation of the four
    /// surrounding samples, or `None` outside the grid
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let cells = self.grid.cells();
        let (gx, gz) = self.grid_coords(x, z);
        let limit = cells as f32;
        if !(0.0..=limit).contains(&gx) || !(0.0..=limit).contains(&gz) {
            return None;
        }

        let col = (gx.floor() as usize).min(cells - 1);
        let row = (gz.floor() as usize).min(cells - 1);
        let tx = gx - col as f32;
        let tz = gz - row as f32;

        let [h00, h01, h10, h11] = self.grid.cell_heights(row, col)?;
        let near = h00 + (h01 - h00) * tx;
        let far = h10 + (h11 - h10) * tx;
        Some(near + (far - near) * tz)
    }

    /// Cells whose planar footprint overlaps a local AABB, or `None` when the
    /// box misses the grid or lies entirely above/below the height range
    pub fn cells_in_aabb(&self, aabb: &Aabb) -> Option<CellRange> {
        let (lo, hi) = self.height_range();
        if aabb.min.y > hi || aabb.max.y < lo {
            return None;
        }

        let cells = self.grid.cells();
        let limit = cells as f32;
        let (min_col, min_row) = self.grid_coords(aabb.min.x, aabb.min.z);
        let (max_col, max_row) = self.grid_coords(aabb.max.x, aabb.max.z);
        if max_col < 0.0 || max_row < 0.0 || min_col > limit || min_row > limit {
            return None;
        }

        let clamp = |v: f32| (v.floor().max(0.0) as usize).min(cells - 1);
        Some(CellRange {
            rows: (clamp(min_row), clamp(max_row)),
            cols: (clamp(min_col), clamp(max_col)),
        })
    }

    /// The two local-space triangles covering cell `(row, col)`
    pub fn cell_triangles(&self, row: usize, col: usize) -> [Triangle; 2] {
        cell_triangles(row, col).map(|[a, b, c]| {
            Triangle::new(
                self.vertex(a.0, a.1),
                self.vertex(b.0, b.1),
                self.vertex(c.0, c.1),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sloped(size: usize, scale: f32) -> HeightfieldShape {
        // Height equals the column index: a ramp rising along +x
        let grid = HeightSampleGrid::from_fn(size, scale, |_, col| col as f32).unwrap();
        HeightfieldShape::from_grid(grid)
    }

    #[test]
    fn test_rejects_bad_scale() {
        let grid = HeightSampleGrid::flat(3, 10.0, 0.0).unwrap();
        assert!(matches!(
            HeightfieldShape::new(grid, 0.0, 1.0, UpAxis::Y),
            Err(PhysicsError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_vertices_match_render_layout() {
        let shape = sloped(5, 40.0);
        assert_eq!(shape.vertex(0, 0), Vec3::new(-20.0, 0.0, -20.0));
        assert_eq!(shape.vertex(4, 4), Vec3::new(20.0, 4.0, 20.0));
        assert_eq!(shape.vertex(2, 1), Vec3::new(-10.0, 1.0, 0.0));
    }

    #[test]
    fn test_height_at_bilinear() {
        let shape = sloped(5, 40.0);
        // Column 2 is at x = 0, halfway between columns 2 and 3 is x = 5
        assert!((shape.height_at(0.0, 3.0).unwrap() - 2.0).abs() < 1e-5);
        assert!((shape.height_at(5.0, -7.0).unwrap() - 2.5).abs() < 1e-5);
        assert!((shape.height_at(20.0, 20.0).unwrap() - 4.0).abs() < 1e-5);
        assert_eq!(shape.height_at(20.5, 0.0), None);
        assert_eq!(shape.height_at(0.0, -21.0), None);
    }

    #[test]
    fn test_local_aabb_uses_height_range() {
        let shape = sloped(5, 40.0);
        let aabb = shape.local_aabb();
        assert_eq!(aabb.min, Vec3::new(-20.0, 0.0, -20.0));
        assert_eq!(aabb.max, Vec3::new(20.0, 4.0, 20.0));
    }

    #[test]
    fn test_cells_in_aabb() {
        let shape = sloped(5, 40.0);
        let range = shape
            .cells_in_aabb(&Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 1.0, 1.0)))
            .unwrap();
        assert_eq!(range.rows, (1, 2));
        assert_eq!(range.cols, (1, 2));
        assert_eq!(range.iter().count(), 4);

        // Outside planar footprint
        assert!(shape
            .cells_in_aabb(&Aabb::new(Vec3::new(30.0, 0.0, 0.0), Vec3::new(31.0, 1.0, 1.0)))
            .is_none());
        // Above the height range
        assert!(shape
            .cells_in_aabb(&Aabb::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(1.0, 11.0, 1.0)))
            .is_none());
    }

    #[test]
    fn test_cell_triangles_face_up() {
        let shape = sloped(4, 9.0);
        for (row, col) in [(0, 0), (1, 2), (2, 2)] {
            for tri in shape.cell_triangles(row, col) {
                assert!(tri.normal().y > 0.0);
            }
        }
    }

    #[test]
    fn test_up_axis_frames_are_rotations() {
        assert_eq!(UpAxis::Y.frame(), Quat::IDENTITY);
        let z = UpAxis::Z.frame() * Vec3::Y;
        let x = UpAxis::X.frame() * Vec3::Y;
        assert!((z - Vec3::Z).length() < 1e-5);
        assert!((x - Vec3::X).length() < 1e-5);
    }
}
