//! Error types for terrain generation

use thiserror::Error;

/// Result type for terrain operations
pub type Result<T> = std::result::Result<T, TerrainError>;

/// Errors that can occur while configuring terrain generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    /// Grid must have at least two samples per side to form a cell
    #[error("Invalid grid size: {0} (must be >= 2)")]
    InvalidGridSize(usize),

    /// World extent must be finite and positive
    #[error("Invalid grid scale: {0} (must be finite and > 0)")]
    InvalidGridScale(f32),

    /// Height multiplier must be finite
    #[error("Invalid amplitude: {0} (must be finite)")]
    InvalidAmplitude(f32),

    /// Noise frequency must be finite
    #[error("Invalid frequency: {0} (must be finite)")]
    InvalidFrequency(f32),
}
