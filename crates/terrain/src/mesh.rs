//! Render mesh built from a height sample grid
//!
//! Each grid cell becomes two triangles with counter-clockwise winding when
//! viewed from above. Vertex normals are the normalized sum of the unnormalized
//! (area-weighted) normals of every adjacent triangle.

use crate::grid::HeightSampleGrid;
use glam::{Vec2, Vec3};

/// Texture repeats across the whole terrain (sampler must use repeat wrapping)
pub const UV_REPEAT: f32 = 16.0;

/// Grid coordinates `(row, col)` of the two triangles covering cell `(row, col)`.
///
/// Shared by the mesh builder and terrain collision so both agree on the
/// surface between four samples.
pub fn cell_triangles(row: usize, col: usize) -> [[(usize, usize); 3]; 2] {
    [
        [(row, col), (row + 1, col), (row, col + 1)],
        [(row, col + 1), (row + 1, col), (row + 1, col + 1)],
    ]
}

/// A single mesh vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

/// Triangulated terrain surface
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// Triangle list, three indices per triangle
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Build the mesh covering every sample of `grid`.
    ///
    /// Vertex `row * size + col` sits at `(u * scale, height, v * scale)` so the
    /// terrain lies in the horizontal plane with y up.
    pub fn from_grid(grid: &HeightSampleGrid) -> Self {
        let size = grid.size();
        let cells = grid.cells();
        let scale = grid.grid_scale();

        let mut positions = Vec::with_capacity(size * size);
        for row in 0..size {
            let v = row as f32 / cells as f32 - 0.5;
            for col in 0..size {
                let u = col as f32 / cells as f32 - 0.5;
                positions.push(Vec3::new(u * scale, grid.get_clamped(row, col), v * scale));
            }
        }

        let mut normals = vec![Vec3::ZERO; positions.len()];
        let mut indices = Vec::with_capacity(cells * cells * 6);
        for row in 0..cells {
            for col in 0..cells {
                for triangle in cell_triangles(row, col) {
                    let [i0, i1, i2] = triangle.map(|(r, c)| r * size + c);
                    let (p0, p1, p2) = (positions[i0], positions[i1], positions[i2]);
                    let face = (p1 - p0).cross(p2 - p0);
                    normals[i0] += face;
                    normals[i1] += face;
                    normals[i2] += face;
                    indices.extend_from_slice(&[i0 as u32, i1 as u32, i2 as u32]);
                }
            }
        }

        let vertices = positions
            .into_iter()
            .zip(normals)
            .enumerate()
            .map(|(i, (position, normal))| {
                let col = i % size;
                let row = i / size;
                Vertex {
                    position,
                    // Degenerate neighbourhoods keep a zero normal rather than NaN
                    normal: normal.normalize_or_zero(),
                    uv: Vec2::new(
                        col as f32 * UV_REPEAT / size as f32,
                        row as f32 * UV_REPEAT / size as f32,
                    ),
                }
            })
            .collect();

        Self { vertices, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as vertex index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_mesh_counts_and_normals() {
        let grid = HeightSampleGrid::flat(3, 10.0, 0.0).unwrap();
        let mesh = Mesh::from_grid(&grid);

        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.triangle_count(), 8);
        for vertex in &mesh.vertices {
            assert_eq!(vertex.position.y, 0.0);
            assert!((vertex.normal - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn test_positions_span_grid_scale() {
        let grid = HeightSampleGrid::flat(5, 40.0, 1.5).unwrap();
        let mesh = Mesh::from_grid(&grid);

        let first = mesh.vertices[0].position;
        let last = mesh.vertices[mesh.vertex_count() - 1].position;
        assert_eq!(first, Vec3::new(-20.0, 1.5, -20.0));
        assert_eq!(last, Vec3::new(20.0, 1.5, 20.0));
    }

    #[test]
    fn test_winding_faces_up() {
        let grid =
            HeightSampleGrid::from_fn(4, 12.0, |row, col| (row * 3 + col) as f32 * 0.1).unwrap();
        let mesh = Mesh::from_grid(&grid);

        for [a, b, c] in mesh.triangles() {
            let p0 = mesh.vertices[a as usize].position;
            let p1 = mesh.vertices[b as usize].position;
            let p2 = mesh.vertices[c as usize].position;
            assert!((p1 - p0).cross(p2 - p0).y > 0.0);
        }
    }

    #[test]
    fn test_slope_normals_tilt_against_gradient() {
        // Height rises along +x, so normals lean towards -x
        let grid = HeightSampleGrid::from_fn(3, 2.0, |_, col| col as f32).unwrap();
        let mesh = Mesh::from_grid(&grid);

        for vertex in &mesh.vertices {
            assert!((vertex.normal.length() - 1.0).abs() < 1e-4);
            assert!(vertex.normal.x < 0.0);
            assert!(vertex.normal.y > 0.0);
        }
    }

    #[test]
    fn test_cell_triangles_cover_all_corners() {
        let [first, second] = cell_triangles(2, 5);
        assert_eq!(first, [(2, 5), (3, 5), (2, 6)]);
        assert_eq!(second, [(2, 6), (3, 5), (3, 6)]);
    }
}
