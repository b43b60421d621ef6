//! Terrain collision against a static heightfield
//!
//! The terrain is a single static shape. Contact queries only visit the grid
//! cells under a body's footprint and test the two triangles of each cell.
//!
//! # Architecture
//!
//! - [`HeightfieldShape`]: grid of samples with cell spacing and up axis
//! - [`Triangle`]: one half of a grid cell, used by the narrow phase
//! - [`CellRange`]: cells overlapped by a local bounding box

mod collider;
mod triangle_gen;

pub use collider::{CellRange, HeightfieldShape, UpAxis};
pub use triangle_gen::Triangle;
