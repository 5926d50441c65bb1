//! Chunk manager routing world-space edits to their chunk.

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use parking_lot::RwLock;
use rayon::prelude::*;
use tracing::{debug, warn};
use voxmap_core::{BlockId, ChunkPos, Result, WorldPos};
use voxmap_map::{Change, VoxelMap};

use crate::chunk::Chunk;
use crate::config::WorldConfig;

/// Manages all loaded chunks.
///
/// Provides thread-safe access to chunks via `RwLock`. Every map mutation
/// happens under the write lock; maps themselves are unsynchronized.
pub struct ChunkManager {
    /// All loaded chunks indexed by position.
    chunks: RwLock<HashMap<ChunkPos, Chunk>>,
    config: WorldConfig,
    /// Current frame number for LRU tracking.
    current_frame: u64,
}

impl ChunkManager {
    /// Create a new chunk manager.
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            chunks: RwLock::new(HashMap::with_capacity(config.max_chunks)),
            config,
            current_frame: 0,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Get the current frame number.
    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    /// Advance the frame counter and return the new frame number.
    pub fn advance_frame(&mut self) -> u64 {
        self.current_frame += 1;
        self.current_frame
    }

    /// Check if a chunk exists at the given position.
    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.chunks.read().contains_key(&pos)
    }

    /// Get the number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    /// Check if no chunks are loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.read().is_empty()
    }

    /// Insert or replace a chunk at the given position.
    pub fn insert(&self, chunk: Chunk) {
        let mut chunks = self.chunks.write();
        chunks.insert(chunk.pos, chunk);
    }

    /// Remove a chunk at the given position.
    pub fn remove(&self, pos: ChunkPos) -> Option<Chunk> {
        let mut chunks = self.chunks.write();
        chunks.remove(&pos)
    }

    /// Get all loaded chunk positions.
    pub fn positions(&self) -> Vec<ChunkPos> {
        self.chunks.read().keys().copied().collect()
    }

    /// Execute a function with read access to a chunk.
    ///
    /// Returns `None` if the chunk doesn't exist.
    pub fn with_chunk<F, R>(&self, pos: ChunkPos, f: F) -> Option<R>
    where
        F: FnOnce(&Chunk) -> R,
    {
        let chunks = self.chunks.read();
        chunks.get(&pos).map(f)
    }

    /// Execute a function with write access to a chunk.
    ///
    /// Returns `None` if the chunk doesn't exist.
    pub fn with_chunk_mut<F, R>(&self, pos: ChunkPos, f: F) -> Option<R>
    where
        F: FnOnce(&mut Chunk) -> R,
    {
        let mut chunks = self.chunks.write();
        chunks.get_mut(&pos).map(f)
    }

    /// Block at a world position, air when its chunk is not loaded.
    pub fn get_block(&self, pos: WorldPos) -> BlockId {
        let chunk_pos = pos.chunk_pos(self.config.chunk_size);
        self.with_chunk(chunk_pos, |chunk| chunk.get_block(pos))
            .unwrap_or(BlockId::AIR)
    }

    /// Store a block at a world position in its owning chunk.
    ///
    /// The chunk is created on the first non-air write.
    pub fn set_block(&self, pos: WorldPos, block: BlockId) -> Result<Change> {
        let chunk_pos = pos.chunk_pos(self.config.chunk_size);
        let mut chunks = self.chunks.write();

        let chunk = match chunks.entry(chunk_pos) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(_) if block.is_air() => return Ok(Change::Unchanged),
            Entry::Vacant(entry) => {
                debug!(?chunk_pos, "creating chunk");
                entry.insert(Chunk::new(chunk_pos, &self.config)?)
            }
        };
        chunk.touch(self.current_frame);
        chunk.set_block(pos, block).inspect_err(|err| {
            warn!(?pos, ?chunk_pos, %err, "block write outside chunk window");
        })
    }

    /// Independent copy of a chunk's block map.
    pub fn snapshot(&self, pos: ChunkPos) -> Option<VoxelMap> {
        self.with_chunk(pos, Chunk::snapshot)
    }

    /// Generate chunks in parallel and insert them.
    ///
    /// `fill` runs on the rayon pool, once per position, each call owning
    /// its fresh chunk. Existing chunks at the same positions are replaced.
    /// Returns the number of chunks inserted; nothing is inserted on error.
    pub fn populate<F>(&self, positions: &[ChunkPos], fill: F) -> Result<usize>
    where
        F: Fn(ChunkPos, &mut Chunk) -> Result<()> + Sync,
    {
        let built = positions
            .par_iter()
            .map(|&pos| {
                let mut chunk = Chunk::new(pos, &self.config)?;
                fill(pos, &mut chunk)?;
                chunk.touch(self.current_frame);
                Ok(chunk)
            })
            .collect::<Result<Vec<_>>>()?;

        let count = built.len();
        let blocks: usize = built.iter().map(Chunk::block_count).sum();
        let mut chunks = self.chunks.write();
        for chunk in built {
            chunks.insert(chunk.pos, chunk);
        }
        debug!(chunks = count, blocks, "populated chunks");
        Ok(count)
    }

    /// Get dirty chunks that need to be consumed.
    pub fn dirty_chunks(&self) -> Vec<ChunkPos> {
        let chunks = self.chunks.read();
        chunks
            .iter()
            .filter(|(_, chunk)| chunk.dirty)
            .map(|(pos, _)| *pos)
            .collect()
    }

    /// Total stored blocks over all chunks.
    pub fn block_count(&self) -> usize {
        self.chunks.read().values().map(Chunk::block_count).sum()
    }

    /// Get total memory usage of all chunks.
    pub fn memory_usage(&self) -> usize {
        self.chunks.read().values().map(Chunk::memory_usage).sum()
    }

    /// Evict least recently used chunks while over capacity.
    ///
    /// Returns the positions of evicted chunks.
    pub fn evict_if_needed(&self) -> Vec<ChunkPos> {
        let mut evicted = Vec::new();
        let mut chunks = self.chunks.write();

        while chunks.len() > self.config.max_chunks {
            let oldest = chunks
                .iter()
                .min_by_key(|(_, c)| c.last_access_frame)
                .map(|(pos, _)| *pos);

            let Some(pos) = oldest else { break };
            chunks.remove(&pos);
            evicted.push(pos);
        }

        if !evicted.is_empty() {
            debug!(count = evicted.len(), "evicted chunks");
        }
        evicted
    }

    /// Touch all chunks at the given positions to update their access time.
    pub fn touch_chunks(&self, positions: &[ChunkPos], frame: u64) {
        let mut chunks = self.chunks.write();
        for pos in positions {
            if let Some(chunk) = chunks.get_mut(pos) {
                chunk.touch(frame);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxmap_core::Error;

    fn manager(max_chunks: usize) -> ChunkManager {
        ChunkManager::new(
            WorldConfig::default()
                .with_chunk_size(16)
                .with_initial_mask(15)
                .with_max_chunks(max_chunks),
        )
        .unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = WorldConfig::default().with_initial_mask(6);
        assert_eq!(ChunkManager::new(config).err(), Some(Error::InvalidMask(6)));
    }

    #[test]
    fn set_block_creates_owning_chunk() {
        let manager = manager(100);
        assert_eq!(
            manager.set_block(WorldPos::new(-1, 0, 17), BlockId::AIR).unwrap(),
            Change::Unchanged
        );
        assert!(manager.is_empty());

        manager
            .set_block(WorldPos::new(-1, 0, 17), BlockId::STONE)
            .unwrap();
        assert!(manager.contains(ChunkPos::new(-1, 0, 1)));
        assert_eq!(manager.get_block(WorldPos::new(-1, 0, 17)), BlockId::STONE);
        assert_eq!(manager.get_block(WorldPos::new(-1, 1, 17)), BlockId::AIR);
        assert_eq!(manager.get_block(WorldPos::new(500, 0, 0)), BlockId::AIR);
    }

    #[test]
    fn edits_across_chunk_boundaries() {
        let manager = manager(100);
        for x in -20..20 {
            manager
                .set_block(WorldPos::new(x, 3, x), BlockId(x as i16 + 100))
                .unwrap();
        }
        assert_eq!(manager.len(), 4);
        assert_eq!(manager.block_count(), 40);
        for x in -20..20 {
            assert_eq!(
                manager.get_block(WorldPos::new(x, 3, x)),
                BlockId(x as i16 + 100)
            );
        }

        manager.set_block(WorldPos::new(-20, 3, -20), BlockId::AIR).unwrap();
        assert_eq!(manager.block_count(), 39);
    }

    #[test]
    fn edits_at_coordinate_limits() {
        let manager = manager(100);
        let low = WorldPos::new(i32::MIN, 0, 0);
        let high = WorldPos::new(i32::MAX, i32::MAX, i32::MIN);
        assert_eq!(manager.set_block(low, BlockId::STONE).unwrap(), Change::Inserted);
        assert_eq!(manager.set_block(high, BlockId::DIRT).unwrap(), Change::Inserted);

        assert_eq!(manager.len(), 2);
        assert_eq!(manager.get_block(low), BlockId::STONE);
        assert_eq!(manager.get_block(high), BlockId::DIRT);
        assert_eq!(manager.set_block(low, BlockId::AIR).unwrap(), Change::Removed);
        assert_eq!(manager.block_count(), 1);
    }

    #[test]
    fn populate_builds_chunks_in_parallel() {
        let manager = manager(100);
        let positions: Vec<_> = (0..4)
            .flat_map(|x| (0..4).map(move |z| ChunkPos::new(x, 0, z)))
            .collect();

        let count = manager
            .populate(&positions, |pos, chunk| {
                let origin = pos.origin(16);
                for x in 0..16 {
                    for z in 0..16 {
                        let height = (x + z) % 4 + 1;
                        for y in 0..height {
                            chunk.set_block(
                                WorldPos::new(origin.x + x, y, origin.z + z),
                                BlockId::GRASS,
                            )?;
                        }
                    }
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(count, 16);
        assert_eq!(manager.len(), 16);
        // Heights cycle 1..=4 along each diagonal: 2.5 blocks per column.
        assert_eq!(manager.block_count(), 16 * 16 * 16 * 5 / 2);
        assert_eq!(manager.get_block(WorldPos::new(63, 3, 63)), BlockId::AIR);
        assert_eq!(manager.get_block(WorldPos::new(63, 3, 48)), BlockId::GRASS);
        assert_eq!(manager.dirty_chunks().len(), 16);
    }

    #[test]
    fn populate_inserts_nothing_on_error() {
        let manager = manager(100);
        let positions = [ChunkPos::new(0, 0, 0), ChunkPos::new(1, 0, 0)];
        let result = manager.populate(&positions, |_, chunk| {
            chunk.set_block(WorldPos::new(-5, 0, 0), BlockId::STONE)?;
            Ok(())
        });
        assert!(matches!(result, Err(Error::CoordinateOutOfRange { .. })));
        assert!(manager.is_empty());
    }

    #[test]
    fn snapshot_is_detached_from_chunk() {
        let manager = manager(100);
        manager.set_block(WorldPos::new(1, 2, 3), BlockId::BRICK).unwrap();

        let mut snapshot = manager.snapshot(ChunkPos::new(0, 0, 0)).unwrap();
        snapshot.set(WorldPos::new(1, 2, 3), BlockId::GLASS).unwrap();
        assert_eq!(manager.get_block(WorldPos::new(1, 2, 3)), BlockId::BRICK);
        assert!(manager.snapshot(ChunkPos::new(9, 9, 9)).is_none());
    }

    #[test]
    fn with_chunk_access() {
        let manager = manager(100);
        manager.set_block(WorldPos::new(0, 0, 0), BlockId::DIRT).unwrap();
        let pos = ChunkPos::new(0, 0, 0);

        assert_eq!(manager.with_chunk(pos, |c| c.dirty), Some(true));
        manager.with_chunk_mut(pos, Chunk::mark_clean);
        assert_eq!(manager.with_chunk(pos, |c| c.dirty), Some(false));
        assert!(manager.dirty_chunks().is_empty());
    }

    #[test]
    fn eviction_order() {
        let mut manager = manager(2);
        for x in 0..3 {
            manager.advance_frame();
            manager
                .set_block(WorldPos::new(x * 16, 0, 0), BlockId::STONE)
                .unwrap();
        }
        manager.touch_chunks(&[ChunkPos::new(0, 0, 0)], 10);

        let evicted = manager.evict_if_needed();
        assert_eq!(evicted, vec![ChunkPos::new(1, 0, 0)]);
        assert_eq!(manager.len(), 2);
        assert!(manager.contains(ChunkPos::new(0, 0, 0)));
    }

    #[test]
    fn remove_chunk() {
        let manager = manager(100);
        manager.set_block(WorldPos::new(0, 0, 0), BlockId::DIRT).unwrap();
        let removed = manager.remove(ChunkPos::new(0, 0, 0));
        assert!(removed.is_some_and(|chunk| chunk.block_count() == 1));
        assert!(manager.is_empty());
        assert!(manager.positions().is_empty());
    }
}
