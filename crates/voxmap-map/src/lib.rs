//! Sparse voxel map for the voxmap workspace.
//!
//! [`VoxelMap`] is an open-addressing hash table from voxel coordinates to
//! block values. Each slot packs a 16-bit local coordinate triple and a
//! 16-bit value into one `u64`, so the table allocates nothing per entry.

pub mod entry;
pub mod hash;
pub mod iter;
pub mod map;

pub use entry::Entry;
pub use iter::Iter;
pub use map::{Change, ProbeStats, VoxelMap, MAX_LOAD_DEN, MAX_LOAD_NUM};
