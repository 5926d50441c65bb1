//! World configuration.

use voxmap_core::constants::{CHUNK_BORDER, CHUNK_SIZE};
use voxmap_core::{Error, Result};

/// Configuration shared by every chunk of a world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    /// Chunk edge length in voxels.
    pub chunk_size: i32,
    /// Mask of a freshly created chunk map (`capacity - 1`).
    pub initial_mask: usize,
    /// Maximum number of chunks kept loaded.
    pub max_chunks: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            initial_mask: 0x3FF,
            max_chunks: 1024,
        }
    }
}

impl WorldConfig {
    /// Set the chunk edge length.
    pub fn with_chunk_size(mut self, chunk_size: i32) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the initial map mask.
    pub fn with_initial_mask(mut self, initial_mask: usize) -> Self {
        self.initial_mask = initial_mask;
        self
    }

    /// Set the loaded chunk limit.
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Edge length of the window a chunk map addresses.
    pub const fn window_size(&self) -> i64 {
        self.chunk_size as i64 + 2 * CHUNK_BORDER as i64
    }

    /// Check that a chunk window fits the 16-bit local range.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size <= 0 {
            return Err(Error::InvalidConfig(format!(
                "chunk_size must be positive, got {}",
                self.chunk_size
            )));
        }
        if self.window_size() > i64::from(u16::MAX) + 1 {
            return Err(Error::InvalidConfig(format!(
                "chunk window of {} voxels exceeds the local coordinate range",
                self.window_size()
            )));
        }
        if !self.initial_mask.wrapping_add(1).is_power_of_two() {
            return Err(Error::InvalidMask(self.initial_mask));
        }
        Ok(())
    }
}
