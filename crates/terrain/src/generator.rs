//! Procedural heightfield generation
//!
//! Samples a [`NoiseField`] over a regular grid to produce the height table
//! used for collision and the mesh used for rendering.

use crate::error::{Result, TerrainError};
use crate::grid::{validate_dimensions, HeightSampleGrid};
use crate::mesh::Mesh;
use crate::field::{NoiseField, NoiseKind};
use serde::Deserialize;

/// Terrain generation parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Samples per side (cells per side is `grid_size - 1`)
    pub grid_size: usize,
    /// World extent of the whole grid along x and z
    pub grid_scale: f32,
    /// Height multiplier applied to noise in `[-1, 1]`
    pub amplitude: f32,
    /// Noise periods across the grid
    pub frequency: f32,
    /// Noise seed
    pub seed: u32,
    /// Noise backend
    pub noise: NoiseKind,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            grid_size: 64 + 1,
            grid_scale: 400.0,
            amplitude: 40.0,
            frequency: 5.0,
            seed: 0,
            noise: NoiseKind::Gradient,
        }
    }
}

impl TerrainParams {
    /// Check that these parameters can produce a non-degenerate terrain
    pub fn validate(&self) -> Result<()> {
        validate_dimensions(self.grid_size, self.grid_scale)?;
        if !self.amplitude.is_finite() {
            return Err(TerrainError::InvalidAmplitude(self.amplitude));
        }
        if !self.frequency.is_finite() {
            return Err(TerrainError::InvalidFrequency(self.frequency));
        }
        Ok(())
    }
}

/// Output of one generation pass
#[derive(Debug, Clone)]
pub struct Terrain {
    pub grid: HeightSampleGrid,
    pub mesh: Mesh,
}

/// Stateful heightfield generator.
///
/// Tracks the lowest and highest heights across every sample it has ever
/// produced; each generated grid carries those running bounds so the
/// collision shape can be sized from them.
pub struct HeightfieldGenerator {
    noise: Box<dyn NoiseField>,
    kind: NoiseKind,
    min_height: f32,
    max_height: f32,
}

impl HeightfieldGenerator {
    /// Create a generator with a noise field of `kind` seeded with `seed`
    pub fn new(kind: NoiseKind, seed: u32) -> Self {
        Self {
            noise: kind.build(seed),
            kind,
            min_height: f32::INFINITY,
            max_height: f32::NEG_INFINITY,
        }
    }

    /// Seed of the current noise field
    pub fn seed(&self) -> u32 {
        self.noise.seed()
    }

    /// Lowest height generated so far (`+inf` before the first sample)
    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    /// Highest height generated so far (`-inf` before the first sample)
    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    /// Height at parametric position `(u, v)` in `[-0.5, 0.5]²`.
    ///
    /// Updates the running bounds.
    pub fn height(&mut self, u: f32, v: f32, amplitude: f32, frequency: f32) -> f32 {
        let mut h = amplitude * self.noise.sample(u * frequency, v * frequency);
        if !h.is_finite() {
            h = 0.0;
        }
        self.min_height = self.min_height.min(h);
        self.max_height = self.max_height.max(h);
        h
    }

    /// Generate a height grid and its render mesh.
    ///
    /// Reseeds the noise field first when `params` asks for a different seed
    /// or backend. Running bounds are never reset.
    pub fn generate(&mut self, params: &TerrainParams) -> Result<Terrain> {
        params.validate()?;

        if params.seed != self.noise.seed() || params.noise != self.kind {
            tracing::debug!(
                "[HeightfieldGenerator] reseeding {:?} noise: {} -> {}",
                params.noise,
                self.noise.seed(),
                params.seed
            );
            self.noise = params.noise.build(params.seed);
            self.kind = params.noise;
        }

        let size = params.grid_size;
        let cells = (size - 1) as f32;
        let mut heights = Vec::with_capacity(size * size);
        for row in 0..size {
            let v = row as f32 / cells - 0.5;
            for col in 0..size {
                let u = col as f32 / cells - 0.5;
                heights.push(self.height(u, v, params.amplitude, params.frequency));
            }
        }

        let grid = HeightSampleGrid::from_samples(
            size,
            params.grid_scale,
            heights,
            self.min_height,
            self.max_height,
        );
        let mesh = Mesh::from_grid(&grid);

        tracing::info!(
            "[HeightfieldGenerator] generated {}x{} grid (seed {}), heights [{:.2}, {:.2}], {} triangles",
            size,
            size,
            params.seed,
            grid.min_height(),
            grid.max_height(),
            mesh.triangle_count()
        );

        Ok(Terrain { grid, mesh })
    }
}

impl Default for HeightfieldGenerator {
    fn default() -> Self {
        Self::new(NoiseKind::Gradient, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(grid_size: usize, amplitude: f32) -> TerrainParams {
        TerrainParams {
            grid_size,
            grid_scale: 100.0,
            amplitude,
            ..TerrainParams::default()
        }
    }

    #[test]
    fn test_rejects_degenerate_grid() {
        let mut generator = HeightfieldGenerator::default();
        for size in [0, 1] {
            assert_eq!(
                generator.generate(&params(size, 1.0)).err(),
                Some(TerrainError::InvalidGridSize(size))
            );
        }
        // A rejected call does not touch the bounds
        assert_eq!(generator.min_height(), f32::INFINITY);
    }

    #[test]
    fn test_rejects_bad_scale_and_amplitude() {
        let mut generator = HeightfieldGenerator::default();
        let mut bad = params(3, 1.0);
        bad.grid_scale = -1.0;
        assert!(matches!(
            generator.generate(&bad),
            Err(TerrainError::InvalidGridScale(_))
        ));

        let mut bad = params(3, f32::NAN);
        bad.grid_scale = 10.0;
        assert!(matches!(
            generator.generate(&bad),
            Err(TerrainError::InvalidAmplitude(_))
        ));
    }

    #[test]
    fn test_zero_amplitude_is_flat() {
        let mut generator = HeightfieldGenerator::default();
        let terrain = generator.generate(&params(3, 0.0)).unwrap();

        assert_eq!(terrain.grid.heights().len(), 9);
        assert!(terrain.grid.heights().iter().all(|&h| h == 0.0));
        assert_eq!(terrain.mesh.vertex_count(), 9);
        assert_eq!(terrain.mesh.triangle_count(), 8);
    }

    #[test]
    fn test_mesh_matches_grid() {
        let mut generator = HeightfieldGenerator::default();
        for size in [2, 3, 8, 17] {
            let terrain = generator.generate(&params(size, 25.0)).unwrap();
            assert_eq!(terrain.mesh.vertex_count(), size * size);
            assert_eq!(terrain.mesh.triangle_count(), 2 * (size - 1) * (size - 1));

            for row in 0..size {
                for col in 0..size {
                    let h = terrain.grid.get(row, col).unwrap();
                    let y = terrain.mesh.vertices[row * size + col].position.y;
                    assert!((h - y).abs() < 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_normals_are_unit_length() {
        let mut generator = HeightfieldGenerator::default();
        let terrain = generator.generate(&params(33, 40.0)).unwrap();
        for vertex in &terrain.mesh.vertices {
            assert!((vertex.normal.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_bounds_cover_all_generations() {
        let mut generator = HeightfieldGenerator::default();
        let mut all = Vec::new();
        for (seed, amplitude) in [(0, 10.0), (5, 60.0), (9, 3.0)] {
            let mut p = params(17, amplitude);
            p.seed = seed;
            let terrain = generator.generate(&p).unwrap();
            all.extend_from_slice(terrain.grid.heights());
        }

        for h in all {
            assert!(generator.min_height() <= h && h <= generator.max_height());
        }
    }

    #[test]
    fn test_grid_carries_running_bounds() {
        let mut generator = HeightfieldGenerator::default();
        generator.generate(&params(17, 50.0)).unwrap();
        let (lo, hi) = (generator.min_height(), generator.max_height());

        let flat = generator.generate(&params(3, 0.0)).unwrap();
        assert_eq!(flat.grid.min_height(), lo.min(0.0));
        assert_eq!(flat.grid.max_height(), hi.max(0.0));
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let p = params(9, 30.0);
        let a = HeightfieldGenerator::default().generate(&p).unwrap();
        let b = HeightfieldGenerator::default().generate(&p).unwrap();
        assert_eq!(a.grid.heights(), b.grid.heights());
    }

    #[test]
    fn test_reseed_changes_terrain() {
        let mut generator = HeightfieldGenerator::default();
        let mut p = params(9, 30.0);
        let first = generator.generate(&p).unwrap();
        p.seed = 42;
        let second = generator.generate(&p).unwrap();
        assert_eq!(generator.seed(), 42);
        assert_ne!(first.grid.heights(), second.grid.heights());
    }

    #[test]
    fn test_backend_follows_params() {
        let mut generator = HeightfieldGenerator::new(NoiseKind::Gradient, 3);
        let mut p = params(9, 30.0);
        p.seed = 3;
        let gradient = generator.generate(&p).unwrap();

        p.noise = NoiseKind::Perlin;
        let perlin = generator.generate(&p).unwrap();
        let fresh = HeightfieldGenerator::new(NoiseKind::Perlin, 3).generate(&p).unwrap();
        assert_eq!(generator.seed(), 3);
        assert_eq!(perlin.grid.heights(), fresh.grid.heights());
        assert_ne!(gradient.grid.heights(), perlin.grid.heights());
    }
}
