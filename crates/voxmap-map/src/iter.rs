//! Enumeration over occupied slots.

use std::iter::FusedIterator;

use voxmap_core::{BlockId, Offset, WorldPos};

use crate::entry::Entry;

/// Iterator over `(world position, value)` pairs of a [`crate::VoxelMap`].
///
/// Yields in slot order, which carries no meaning and changes on growth.
/// A fresh iterator over an unmodified map yields the same pairs.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    slots: std::slice::Iter<'a, Entry>,
    offset: Offset,
    remaining: usize,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(slots: &'a [Entry], offset: Offset, len: usize) -> Self {
        Self {
            slots: slots.iter(),
            offset,
            remaining: len,
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = (WorldPos, BlockId);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.slots.find(|entry| !entry.is_empty())?;
        self.remaining -= 1;
        let (local, value) = entry.unpack();
        Some((local.to_world(self.offset), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use crate::VoxelMap;
    use glam::IVec3;
    use voxmap_core::{BlockId, WorldPos};

    #[test]
    fn yields_world_positions() {
        let mut map = VoxelMap::new(IVec3::new(-100, 20, 7), 15).unwrap();
        map.set(WorldPos::new(-100, 20, 7), BlockId(1)).unwrap();
        map.set(WorldPos::new(-90, 25, 8), BlockId(-2)).unwrap();

        let mut items: Vec<_> = map.iter().collect();
        items.sort_by_key(|(pos, _)| (pos.x, pos.y, pos.z));
        assert_eq!(
            items,
            vec![
                (WorldPos::new(-100, 20, 7), BlockId(1)),
                (WorldPos::new(-90, 25, 8), BlockId(-2)),
            ]
        );
    }

    #[test]
    fn restartable_and_exact_size() {
        let mut map = VoxelMap::new(IVec3::ZERO, 63).unwrap();
        for i in 0..20 {
            map.set(WorldPos::new(i, i * 2, 3), BlockId(i as i16 + 1)).unwrap();
        }
        let first: Vec<_> = map.iter().collect();
        let second: Vec<_> = (&map).into_iter().collect();
        assert_eq!(first, second);

        let mut iter = map.iter();
        assert_eq!(iter.len(), 20);
        iter.next();
        assert_eq!(iter.len(), 19);
        assert_eq!(iter.by_ref().count(), 19);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn skips_removed_keys() {
        let mut map = VoxelMap::new(IVec3::ZERO, 15).unwrap();
        map.set(WorldPos::new(1, 0, 0), BlockId(1)).unwrap();
        map.set(WorldPos::new(2, 0, 0), BlockId(2)).unwrap();
        map.set(WorldPos::new(1, 0, 0), BlockId::AIR).unwrap();
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            vec![(WorldPos::new(2, 0, 0), BlockId(2))]
        );
    }
}
