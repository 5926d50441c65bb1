//! Block value types.

use bytemuck::{Pod, Zeroable};

/// Value stored per voxel, usually a block type.
///
/// Block ID 0 is reserved for air and means "no value": a map never stores
/// an air entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct BlockId(pub i16);

impl BlockId {
    /// Air block (empty space)
    pub const AIR: Self = Self(0);
    /// Grass block
    pub const GRASS: Self = Self(1);
    /// Stone block
    pub const STONE: Self = Self(3);
    /// Brick block
    pub const BRICK: Self = Self(4);
    /// Wood block
    pub const WOOD: Self = Self(5);
    /// Dirt block
    pub const DIRT: Self = Self(7);
    /// Glass block
    pub const GLASS: Self = Self(10);

    /// Returns true if this block is air (empty)
    #[inline]
    pub const fn is_air(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this block carries a value
    #[inline]
    pub const fn is_solid(self) -> bool {
        self.0 != 0
    }
}

impl From<i16> for BlockId {
    fn from(value: i16) -> Self {
        Self(value)
    }
}

impl From<BlockId> for i16 {
    fn from(block: BlockId) -> Self {
        block.0
    }
}
