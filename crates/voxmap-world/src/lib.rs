//! Chunk ownership for the voxmap sparse voxel map.
//!
//! Each [`Chunk`] owns one [`voxmap_map::VoxelMap`] addressed through a
//! window around the chunk. [`ChunkManager`] holds all chunks behind one
//! lock and routes world-space block edits to their owner.

pub mod chunk;
pub mod chunk_manager;
pub mod config;

pub use chunk::Chunk;
pub use chunk_manager::ChunkManager;
pub use config::WorldConfig;
