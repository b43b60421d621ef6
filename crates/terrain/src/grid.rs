//! Height sample table shared by the collision shape and the mesh builder

use crate::error::{Result, TerrainError};

/// Reject grids that cannot form a single cell
pub(crate) fn validate_dimensions(size: usize, grid_scale: f32) -> Result<()> {
    if size < 2 {
        return Err(TerrainError::InvalidGridSize(size));
    }
    if !grid_scale.is_finite() || grid_scale <= 0.0 {
        return Err(TerrainError::InvalidGridScale(grid_scale));
    }
    Ok(())
}

/// Square grid of terrain heights indexed `[row][col]`.
///
/// Row `r` and column `c` sit at parametric position
/// `(c / (size - 1) - 0.5, r / (size - 1) - 0.5)`, so the grid covers a
/// `grid_scale × grid_scale` square centred on the origin. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightSampleGrid {
    size: usize,
    grid_scale: f32,
    heights: Vec<f32>,
    min_height: f32,
    max_height: f32,
}

impl HeightSampleGrid {
    /// Build a grid from row-major samples.
    ///
    /// `min_height`/`max_height` are the bounds observed by the generator and
    /// may be wider than the samples in this grid. They are widened if needed
    /// so they always enclose every sample.
    pub(crate) fn from_samples(
        size: usize,
        grid_scale: f32,
        heights: Vec<f32>,
        min_height: f32,
        max_height: f32,
    ) -> Self {
        debug_assert_eq!(heights.len(), size * size);
        let (lo, hi) = heights
            .iter()
            .fold((min_height, max_height), |(lo, hi), &h| (lo.min(h), hi.max(h)));
        Self {
            size,
            grid_scale,
            heights,
            min_height: lo,
            max_height: hi,
        }
    }

    /// Build a grid by evaluating `f(row, col)` for every sample
    pub fn from_fn<F>(size: usize, grid_scale: f32, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> f32,
    {
        validate_dimensions(size, grid_scale)?;
        let mut heights = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                let h = f(row, col);
                heights.push(if h.is_finite() { h } else { 0.0 });
            }
        }
        Ok(Self::from_samples(size, grid_scale, heights, f32::MAX, f32::MIN))
    }

    /// A flat grid at constant `height`
    pub fn flat(size: usize, grid_scale: f32, height: f32) -> Result<Self> {
        Self::from_fn(size, grid_scale, |_, _| height)
    }

    /// Samples per side
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of cells per side (`size - 1`)
    pub fn cells(&self) -> usize {
        self.size - 1
    }

    /// World extent of the whole grid along each planar axis
    pub fn grid_scale(&self) -> f32 {
        self.grid_scale
    }

    /// World distance between adjacent samples
    pub fn spacing(&self) -> f32 {
        self.grid_scale / self.cells() as f32
    }

    /// Lowest height seen by the generator that produced this grid
    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    /// Highest height seen by the generator that produced this grid
    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    /// Height at `(row, col)`, or `None` when out of range
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.size && col < self.size {
            Some(self.heights[row * self.size + col])
        } else {
            None
        }
    }

    /// Height at `(row, col)` with indices clamped into the grid
    pub fn get_clamped(&self, row: usize, col: usize) -> f32 {
        let last = self.size - 1;
        self.heights[row.min(last) * self.size + col.min(last)]
    }

    /// Row-major sample slice (row = planar `v` axis, col = planar `u` axis)
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// The four corner heights of cell `(row, col)` as
    /// `[(r, c), (r, c + 1), (r + 1, c), (r + 1, c + 1)]`
    pub fn cell_heights(&self, row: usize, col: usize) -> Option<[f32; 4]> {
        if row >= self.cells() || col >= self.cells() {
            return None;
        }
        Some([
            self.get_clamped(row, col),
            self.get_clamped(row, col + 1),
            self.get_clamped(row + 1, col),
            self.get_clamped(row + 1, col + 1),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(size: usize) -> HeightSampleGrid {
        let heights = (0..size * size).map(|i| i as f32).collect();
        HeightSampleGrid::from_samples(size, 10.0, heights, f32::MAX, f32::MIN)
    }

    #[test]
    fn test_indexing_is_row_major() {
        let grid = ramp(3);
        assert_eq!(grid.get(0, 0), Some(0.0));
        assert_eq!(grid.get(0, 2), Some(2.0));
        assert_eq!(grid.get(1, 0), Some(3.0));
        assert_eq!(grid.get(2, 2), Some(8.0));
        assert_eq!(grid.get(3, 0), None);
    }

    #[test]
    fn test_bounds_enclose_samples() {
        let grid = ramp(3);
        assert_eq!(grid.min_height(), 0.0);
        assert_eq!(grid.max_height(), 8.0);

        let wide = HeightSampleGrid::from_samples(2, 1.0, vec![0.0; 4], -5.0, 5.0);
        assert_eq!(wide.min_height(), -5.0);
        assert_eq!(wide.max_height(), 5.0);
    }

    #[test]
    fn test_spacing() {
        let grid = ramp(5);
        assert_eq!(grid.cells(), 4);
        assert!((grid.spacing() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_from_fn_rejects_degenerate_grid() {
        assert_eq!(
            HeightSampleGrid::flat(1, 10.0, 0.0),
            Err(TerrainError::InvalidGridSize(1))
        );
        assert!(matches!(
            HeightSampleGrid::flat(4, 0.0, 0.0),
            Err(TerrainError::InvalidGridScale(_))
        ));
    }

    #[test]
    fn test_from_fn_replaces_non_finite_samples() {
        let grid = HeightSampleGrid::from_fn(2, 1.0, |row, _| {
            if row == 0 {
                f32::NAN
            } else {
                2.0
            }
        })
        .unwrap();
        assert_eq!(grid.heights(), &[0.0, 0.0, 2.0, 2.0]);
    }

    #[test]
    fn test_cell_heights() {
        let grid = ramp(3);
        assert_eq!(grid.cell_heights(1, 0), Some([3.0, 4.0, 6.0, 7.0]));
        assert_eq!(grid.cell_heights(2, 0), None);
    }
}
