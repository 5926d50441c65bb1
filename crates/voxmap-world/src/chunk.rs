//! Chunk data structure owning one voxel map.

use glam::IVec3;
use voxmap_core::constants::CHUNK_BORDER;
use voxmap_core::coords::origin_axis;
use voxmap_core::{BlockId, ChunkPos, Result, WorldPos};
use voxmap_map::{Change, Entry, Iter, VoxelMap};

use crate::config::WorldConfig;

/// A cubic chunk of blocks.
///
/// The chunk's map window starts one voxel below the chunk origin on every
/// axis, so the shell of neighbouring voxels can be recorded alongside the
/// chunk's own blocks.
pub struct Chunk {
    /// Position in chunk coordinates.
    pub pos: ChunkPos,
    /// Frame number when last accessed (for LRU eviction).
    pub last_access_frame: u64,
    /// Whether the chunk changed since it was last consumed.
    pub dirty: bool,
    chunk_size: i32,
    blocks: VoxelMap,
}

impl Chunk {
    /// Create an empty chunk at the given position.
    pub fn new(pos: ChunkPos, config: &WorldConfig) -> Result<Self> {
        let offset = window_offset(pos, config.chunk_size);
        Ok(Self {
            pos,
            last_access_frame: 0,
            dirty: false,
            chunk_size: config.chunk_size,
            blocks: VoxelMap::new(offset, config.initial_mask)?,
        })
    }

    /// Block at a world position, air outside the chunk window.
    #[inline]
    pub fn get_block(&self, pos: WorldPos) -> BlockId {
        self.blocks.get(pos)
    }

    /// Store a block at a world position inside the chunk window.
    pub fn set_block(&mut self, pos: WorldPos, block: BlockId) -> Result<Change> {
        let change = self.blocks.set(pos, block)?;
        self.dirty |= change.is_changed();
        Ok(change)
    }

    /// Whether `pos` belongs to this chunk proper (border excluded).
    pub fn owns(&self, pos: WorldPos) -> bool {
        pos.chunk_pos(self.chunk_size) == self.pos
    }

    /// Number of stored non-air blocks.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if this chunk is empty (all air).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate stored blocks.
    pub fn blocks(&self) -> Iter<'_> {
        self.blocks.iter()
    }

    /// Read access to the underlying map.
    pub fn map(&self) -> &VoxelMap {
        &self.blocks
    }

    /// Independent copy of the block map, e.g. for a mesher on another thread.
    pub fn snapshot(&self) -> VoxelMap {
        self.blocks.clone()
    }

    /// Mark chunk changes as consumed.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Update the last access frame for LRU tracking.
    pub fn touch(&mut self, frame: u64) {
        self.last_access_frame = frame;
    }

    /// Get memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.blocks.capacity() * std::mem::size_of::<Entry>()
    }
}

/// Map offset for the window of the chunk at `pos`.
///
/// Saturates at `i32::MIN`, where the border below the chunk does not exist.
/// The window still covers the chunk because its size stays below 65536.
pub fn window_offset(pos: ChunkPos, chunk_size: i32) -> IVec3 {
    let axis = |chunk: i32| {
        let start = origin_axis(chunk, chunk_size) - i64::from(CHUNK_BORDER);
        i32::try_from(start).unwrap_or(i32::MIN)
    };
    IVec3::new(axis(pos.x), axis(pos.y), axis(pos.z))
}
