//! Coordinate systems for the voxel map.
//!
//! A map stores [`LocalPos`] keys. World positions are translated into the
//! local window by subtracting the map's [`Offset`], and back by adding it.

use crate::Offset;
use bytemuck::{Pod, Zeroable};

/// Position inside a map's local window (0 to 65535 per axis).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct LocalPos {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

impl LocalPos {
    /// Create a new local position
    #[inline]
    pub const fn new(x: u16, y: u16, z: u16) -> Self {
        Self { x, y, z }
    }

    /// Translate back into world space.
    ///
    /// Exact for every local position produced by [`WorldPos::to_local`]
    /// with the same offset.
    #[inline]
    pub const fn to_world(self, offset: Offset) -> WorldPos {
        WorldPos::new(
            (self.x as i32).wrapping_add(offset.x),
            (self.y as i32).wrapping_add(offset.y),
            (self.z as i32).wrapping_add(offset.z),
        )
    }
}

/// Chunk position in chunk coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkPos {
    /// Create a new chunk position
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// World position of the chunk's minimum corner, clamped to the `i32`
    /// range.
    ///
    /// Only the lowest chunk of a size that does not divide `2^31` reaches
    /// below `i32::MIN`; its reachable voxels still start at `i32::MIN`.
    #[inline]
    pub fn origin(self, chunk_size: i32) -> WorldPos {
        WorldPos::new(
            clamp_axis(origin_axis(self.x, chunk_size)),
            clamp_axis(origin_axis(self.y, chunk_size)),
            clamp_axis(origin_axis(self.z, chunk_size)),
        )
    }
}

/// World position in voxel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WorldPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl WorldPos {
    /// Create a new world position
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Translate into a map's local window.
    ///
    /// Returns `None` when any axis lands outside `0..=65535`.
    #[inline]
    pub fn to_local(self, offset: Offset) -> Option<LocalPos> {
        Some(LocalPos::new(
            local_axis(self.x, offset.x)?,
            local_axis(self.y, offset.y)?,
            local_axis(self.z, offset.z)?,
        ))
    }

    /// Get the chunk containing this position (floor division)
    #[inline]
    pub const fn chunk_pos(self, chunk_size: i32) -> ChunkPos {
        ChunkPos::new(
            self.x.div_euclid(chunk_size),
            self.y.div_euclid(chunk_size),
            self.z.div_euclid(chunk_size),
        )
    }
}

/// Minimum corner of chunk `axis` along one axis, without clamping.
#[inline]
pub const fn origin_axis(axis: i32, chunk_size: i32) -> i64 {
    axis as i64 * chunk_size as i64
}

#[inline]
fn clamp_axis(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

#[inline]
fn local_axis(world: i32, offset: i32) -> Option<u16> {
    u16::try_from(i64::from(world) - i64::from(offset)).ok()
}
