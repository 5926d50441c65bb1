//! Packed map slots.
//!
//! One slot is a single `u64`:
//!
//! | bits  | field                      |
//! |-------|----------------------------|
//! | 0-15  | local `x`                  |
//! | 16-31 | local `y`                  |
//! | 32-47 | local `z`                  |
//! | 48-63 | value (`i16` bit pattern)  |
//!
//! A slot is empty iff the whole word is zero. Air is never written, so an
//! occupied slot always has non-zero value bits.

use bytemuck::{Pod, Zeroable};
use voxmap_core::{BlockId, LocalPos};

const FIELD_BITS: u32 = 16;
const FIELD_MASK: u64 = 0xFFFF;
const VALUE_SHIFT: u32 = 3 * FIELD_BITS;

/// Bits of a slot holding the key.
pub const KEY_MASK: u64 = (1 << VALUE_SHIFT) - 1;

/// A packed `(x, y, z, value)` slot.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Entry(u64);

impl Entry {
    /// The empty slot pattern.
    pub const EMPTY: Self = Self(0);

    /// Pack a key and value.
    #[inline]
    pub const fn pack(pos: LocalPos, value: BlockId) -> Self {
        Self(pack_key(pos) | ((value.0 as u16 as u64) << VALUE_SHIFT))
    }

    /// Split back into key and value.
    #[inline]
    pub const fn unpack(self) -> (LocalPos, BlockId) {
        (self.pos(), self.value())
    }

    /// Raw 64-bit word.
    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Rebuild from a raw word.
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Key bits only.
    #[inline]
    pub const fn key(self) -> u64 {
        self.0 & KEY_MASK
    }

    #[inline]
    pub const fn pos(self) -> LocalPos {
        LocalPos::new(
            (self.0 & FIELD_MASK) as u16,
            ((self.0 >> FIELD_BITS) & FIELD_MASK) as u16,
            ((self.0 >> (2 * FIELD_BITS)) & FIELD_MASK) as u16,
        )
    }

    #[inline]
    pub const fn value(self) -> BlockId {
        BlockId((self.0 >> VALUE_SHIFT) as u16 as i16)
    }

    /// Replace the value, keeping the key.
    #[inline]
    pub fn set_value(&mut self, value: BlockId) {
        self.0 = self.key() | ((value.0 as u16 as u64) << VALUE_SHIFT);
    }
}

/// Key bits for a local position.
#[inline]
pub const fn pack_key(pos: LocalPos) -> u64 {
    (pos.x as u64) | ((pos.y as u64) << FIELD_BITS) | ((pos.z as u64) << (2 * FIELD_BITS))
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("Entry(empty)");
        }
        let (pos, value) = self.unpack();
        f.debug_struct("Entry")
            .field("x", &pos.x)
            .field("y", &pos.y)
            .field("z", &pos.z)
            .field("w", &value.0)
            .finish()
    }
}
