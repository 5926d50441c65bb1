//! Core types for the voxmap sparse voxel map.
//!
//! This crate provides the foundational types shared by the map and the
//! chunk layer built on top of it:
//! - Block values
//! - Coordinate systems (world, chunk, local)
//! - Common error types

pub mod coords;
pub mod error;
pub mod types;

pub use coords::{ChunkPos, LocalPos, WorldPos};
pub use error::{Error, Result};
pub use types::BlockId;

/// Offset translating local map coordinates into world coordinates.
pub type Offset = glam::IVec3;

/// Workspace-wide constants
pub mod constants {
    /// Default chunk edge length in voxels
    pub const CHUNK_SIZE: i32 = 32;
    /// Extra voxels a chunk window covers on each side of its chunk
    pub const CHUNK_BORDER: i32 = 1;
}
