//! Error types for the physics world

use coldet_terrain::TerrainError;
use thiserror::Error;

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;

/// Errors raised when building bodies or worlds.
///
/// Stepping never fails; only construction is validated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Dynamic bodies need a finite, positive mass
    #[error("Invalid mass for dynamic body: {0}")]
    InvalidMass(f32),

    /// Shape dimensions or shape/body combination not allowed
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// World configuration rejected
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Terrain generation failed
    #[error("Terrain error: {0}")]
    Terrain(#[from] TerrainError),
}
