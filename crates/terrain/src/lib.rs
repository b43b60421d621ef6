//! Procedural terrain for heightfield collision
//!
//! Coherent noise sampled over a square grid produces a [`HeightSampleGrid`]
//! (consumed by terrain collision) and a [`Mesh`] (consumed by a renderer).

mod error;
mod field;
mod generator;
mod grid;
mod mesh;

pub use error::{Result, TerrainError};
pub use field::{smoothstep, GradientNoise, NoiseField, NoiseKind, PerlinNoise};
pub use generator::{HeightfieldGenerator, Terrain, TerrainParams};
pub use grid::HeightSampleGrid;
pub use mesh::{cell_triangles, Mesh, Vertex, UV_REPEAT};

// Re-export for convenience
pub use glam;
