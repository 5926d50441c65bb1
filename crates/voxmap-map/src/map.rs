//! Open-addressing voxel map.
//!
//! Keys are local coordinates packed with their value into one [`Entry`].
//! Collisions are resolved by linear probing, removals use backward-shift
//! deletion so the table never carries tombstones.

use tracing::trace;
use voxmap_core::{BlockId, Error, LocalPos, Offset, Result, WorldPos};

use crate::entry::{pack_key, Entry};
use crate::hash::{home_slot, next_slot, probe_distance};
use crate::iter::Iter;

/// Numerator of the maximum load factor.
pub const MAX_LOAD_NUM: usize = 2;
/// Denominator of the maximum load factor.
pub const MAX_LOAD_DEN: usize = 3;

/// Outcome of [`VoxelMap::set`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Change {
    /// A new key was stored.
    Inserted,
    /// An existing key got a different value.
    Updated,
    /// An existing key was set to air and removed.
    Removed,
    /// The stored state already matched.
    Unchanged,
}

impl Change {
    /// Whether the map content changed.
    #[inline]
    pub const fn is_changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// Whether a new key was stored.
    #[inline]
    pub const fn is_inserted(self) -> bool {
        matches!(self, Self::Inserted)
    }
}

/// Probe length statistics for a map.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProbeStats {
    /// Occupied slots.
    pub len: usize,
    /// Total slots.
    pub capacity: usize,
    /// Longest distance of an entry from its home slot.
    pub max_distance: usize,
    /// Mean distance of an entry from its home slot.
    pub mean_distance: f64,
}

/// Sparse map from voxel coordinates to block values.
///
/// The map stores coordinates relative to `offset`, so one table can address
/// any `65536^3` window of world space. It performs no locking: the owner
/// serializes mutation against reads.
pub struct VoxelMap {
    offset: Offset,
    mask: usize,
    len: usize,
    data: Vec<Entry>,
}

impl VoxelMap {
    /// Create an empty map with `mask + 1` slots.
    ///
    /// `mask + 1` must be a power of two.
    pub fn new(offset: Offset, mask: usize) -> Result<Self> {
        let capacity = mask
            .checked_add(1)
            .filter(|capacity| capacity.is_power_of_two())
            .ok_or(Error::InvalidMask(mask))?;

        Ok(Self {
            offset,
            mask,
            len: 0,
            data: alloc_slots(capacity)?,
        })
    }

    /// Create an empty map with at least `capacity` slots.
    pub fn with_capacity(offset: Offset, capacity: usize) -> Result<Self> {
        let capacity = capacity
            .max(1)
            .checked_next_power_of_two()
            .ok_or(Error::AllocationFailure { capacity })?;
        Self::new(offset, capacity - 1)
    }

    /// Offset added to local coordinates to obtain world coordinates.
    #[inline]
    pub const fn offset(&self) -> Offset {
        self.offset
    }

    #[inline]
    pub const fn mask(&self) -> usize {
        self.mask
    }

    /// Number of slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Number of stored keys.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Translate a world position into this map's window.
    #[inline]
    pub fn to_local(&self, pos: WorldPos) -> Option<LocalPos> {
        pos.to_local(self.offset)
    }

    /// Value at a world position, air when absent.
    ///
    /// Positions outside the window are never stored and read as air.
    #[inline]
    pub fn get(&self, pos: WorldPos) -> BlockId {
        self.to_local(pos)
            .map_or(BlockId::AIR, |local| self.get_local(local))
    }

    /// Value at a local position, air when absent.
    pub fn get_local(&self, pos: LocalPos) -> BlockId {
        match self.find(pack_key(pos)) {
            Ok(index) => self.data[index].value(),
            Err(_) => BlockId::AIR,
        }
    }

    #[inline]
    pub fn contains(&self, pos: WorldPos) -> bool {
        self.get(pos).is_solid()
    }

    #[inline]
    pub fn contains_local(&self, pos: LocalPos) -> bool {
        self.get_local(pos).is_solid()
    }

    /// Store `value` at a world position. Air removes the key.
    ///
    /// Fails with [`Error::CoordinateOutOfRange`] when the position lies
    /// outside the window, and with [`Error::AllocationFailure`] when a
    /// required growth cannot allocate. The map is unchanged on error.
    pub fn set(&mut self, pos: WorldPos, value: BlockId) -> Result<Change> {
        let local = self.to_local(pos).ok_or(Error::CoordinateOutOfRange {
            pos,
            offset: self.offset,
        })?;
        self.set_local(local, value)
    }

    /// Store `value` at a local position. Air removes the key.
    pub fn set_local(&mut self, pos: LocalPos, value: BlockId) -> Result<Change> {
        let key = pack_key(pos);
        match self.find(key) {
            Ok(index) if value.is_air() => {
                self.remove_at(index);
                Ok(Change::Removed)
            }
            Ok(index) if self.data[index].value() == value => Ok(Change::Unchanged),
            Ok(index) => {
                self.data[index].set_value(value);
                Ok(Change::Updated)
            }
            Err(_) if value.is_air() => Ok(Change::Unchanged),
            Err(mut index) => {
                if exceeds_load(self.len + 1, self.capacity()) {
                    self.grow()?;
                    index = self.vacant_slot(key);
                }
                self.data[index] = Entry::pack(pos, value);
                self.len += 1;
                Ok(Change::Inserted)
            }
        }
    }

    /// Double the capacity and rehash every entry.
    ///
    /// Content, offset and length are unchanged. Invalidates slot order.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn grow(&mut self) -> Result<()> {
        let capacity = self
            .capacity()
            .checked_mul(2)
            .ok_or(Error::AllocationFailure {
                capacity: usize::MAX,
            })?;

        let old = std::mem::replace(&mut self.data, alloc_slots(capacity)?);
        self.mask = capacity - 1;
        for entry in old.into_iter().filter(|entry| !entry.is_empty()) {
            let index = self.vacant_slot(entry.key());
            self.data[index] = entry;
        }

        trace!(
            old_capacity = capacity / 2,
            new_capacity = capacity,
            len = self.len,
            "voxel map grown"
        );
        Ok(())
    }

    /// Remove every entry, keeping capacity and offset.
    pub fn clear(&mut self) {
        self.data.fill(Entry::EMPTY);
        self.len = 0;
    }

    /// Copy of this map, reporting allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(self.data.len())
            .map_err(|_| Error::AllocationFailure {
                capacity: self.data.len(),
            })?;
        data.extend_from_slice(&self.data);

        Ok(Self {
            offset: self.offset,
            mask: self.mask,
            len: self.len,
            data,
        })
    }

    /// Iterate `(world position, value)` pairs in slot order.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.data, self.offset, self.len)
    }

    /// Occupied raw slots in slot order.
    pub fn entries(&self) -> impl Iterator<Item = Entry> + '_ {
        self.data.iter().copied().filter(|entry| !entry.is_empty())
    }

    /// Rewrite every stored value in one pass.
    ///
    /// Entries mapped to air are removed once the scan is done. Returns the
    /// number of removed entries.
    pub fn update_each<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(WorldPos, BlockId) -> BlockId,
    {
        let offset = self.offset;
        let mut removed = Vec::new();
        for entry in self.data.iter_mut().filter(|entry| !entry.is_empty()) {
            let (local, value) = entry.unpack();
            let new_value = f(local.to_world(offset), value);
            if new_value.is_air() {
                removed.push(entry.key());
            } else {
                entry.set_value(new_value);
            }
        }

        for &key in &removed {
            if let Ok(index) = self.find(key) {
                self.remove_at(index);
            }
        }
        removed.len()
    }

    /// Distance statistics over the current slot layout.
    pub fn probe_stats(&self) -> ProbeStats {
        let mut max_distance = 0;
        let mut total = 0usize;
        for (index, entry) in self.data.iter().enumerate() {
            if entry.is_empty() {
                continue;
            }
            let distance = probe_distance(home_slot(entry.key(), self.mask), index, self.mask);
            max_distance = max_distance.max(distance);
            total += distance;
        }

        #[allow(clippy::cast_precision_loss)]
        let mean_distance = if self.len == 0 {
            0.0
        } else {
            total as f64 / self.len as f64
        };

        ProbeStats {
            len: self.len,
            capacity: self.capacity(),
            max_distance,
            mean_distance,
        }
    }

    /// Probe for `key`: `Ok(slot)` holding it or `Err(slot)` of the first
    /// empty slot on its probe sequence.
    fn find(&self, key: u64) -> std::result::Result<usize, usize> {
        let mut index = home_slot(key, self.mask);
        for _ in 0..self.data.len() {
            let entry = self.data[index];
            if entry.is_empty() {
                return Err(index);
            }
            if entry.key() == key {
                return Ok(index);
            }
            index = next_slot(index, self.mask);
        }
        unreachable!(
            "voxel map probe exhausted: len {} capacity {}",
            self.len,
            self.capacity()
        )
    }

    /// First empty slot on the probe sequence of a key known to be absent.
    fn vacant_slot(&self, key: u64) -> usize {
        match self.find(key) {
            Err(index) => index,
            Ok(index) => unreachable!("voxel map key {key:#x} stored twice at slot {index}"),
        }
    }

    /// Empty `index` and shift the rest of its cluster back into place.
    fn remove_at(&mut self, index: usize) {
        let mask = self.mask;
        let mut hole = index;
        let mut next = next_slot(index, mask);
        loop {
            let entry = self.data[next];
            if entry.is_empty() {
                break;
            }
            let home = home_slot(entry.key(), mask);
            if probe_distance(home, next, mask) >= probe_distance(hole, next, mask) {
                self.data[hole] = entry;
                hole = next;
            }
            next = next_slot(next, mask);
        }
        self.data[hole] = Entry::EMPTY;
        self.len -= 1;
    }
}

impl Clone for VoxelMap {
    fn clone(&self) -> Self {
        Self {
            offset: self.offset,
            mask: self.mask,
            len: self.len,
            data: self.data.clone(),
        }
    }

    /// Copy `source` into `self`, reusing the slot buffer when it is large
    /// enough.
    fn clone_from(&mut self, source: &Self) {
        self.offset = source.offset;
        self.mask = source.mask;
        self.len = source.len;
        self.data.clone_from(&source.data);
    }
}

impl std::fmt::Debug for VoxelMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelMap")
            .field("offset", &self.offset)
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl<'a> IntoIterator for &'a VoxelMap {
    type Item = (WorldPos, BlockId);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[inline]
const fn exceeds_load(len: usize, capacity: usize) -> bool {
    len * MAX_LOAD_DEN > capacity * MAX_LOAD_NUM
}

fn alloc_slots(capacity: usize) -> Result<Vec<Entry>> {
    let mut data = Vec::new();
    data.try_reserve_exact(capacity)
        .map_err(|_| Error::AllocationFailure { capacity })?;
    data.resize(capacity, Entry::EMPTY);
    Ok(data)
}
