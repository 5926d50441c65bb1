//! Error types for the voxel map.

use thiserror::Error;

use crate::coords::WorldPos;
use crate::Offset;

/// Workspace-wide error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The slot array could not be allocated
    #[error("Allocation failure: could not allocate {capacity} map slots")]
    AllocationFailure { capacity: usize },

    /// A world position falls outside the map's addressable window
    #[error("Coordinate out of range: {pos:?} is outside the window at offset {offset}")]
    CoordinateOutOfRange { pos: WorldPos, offset: Offset },

    /// A capacity mask that is not one less than a power of two
    #[error("Invalid mask: {0} + 1 is not a power of two")]
    InvalidMask(usize),

    /// Invalid configuration value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
