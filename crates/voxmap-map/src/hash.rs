//! Slot hashing and the linear probe sequence.
//!
//! Lookup, insertion, removal and growth all go through [`home_slot`] and
//! [`next_slot`]; a map is only consistent while every path agrees on them.

use voxmap_core::LocalPos;

use crate::entry::pack_key;

const FMIX_C1: u64 = 0xff51_afd7_ed55_8ccd;
const FMIX_C2: u64 = 0xc4ce_b9fe_1a85_ec53;

/// MurmurHash3 64-bit finalizer over the packed key bits.
#[inline]
pub const fn mix(key: u64) -> u64 {
    let mut h = key;
    h ^= h >> 33;
    h = h.wrapping_mul(FMIX_C1);
    h ^= h >> 33;
    h = h.wrapping_mul(FMIX_C2);
    h ^= h >> 33;
    h
}

/// First slot probed for a key.
#[inline]
pub const fn home_slot(key: u64, mask: usize) -> usize {
    (mix(key) as usize) & mask
}

/// Slot probed after `index`.
#[inline]
pub const fn next_slot(index: usize, mask: usize) -> usize {
    (index + 1) & mask
}

/// Distance travelled from `home` to reach `index`.
#[inline]
pub const fn probe_distance(home: usize, index: usize, mask: usize) -> usize {
    index.wrapping_sub(home) & mask
}

/// Hash a local position directly.
#[inline]
pub const fn hash_pos(pos: LocalPos) -> u64 {
    mix(pack_key(pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let pos = LocalPos::new(3, 4, 5);
        assert_eq!(hash_pos(pos), hash_pos(pos));
        assert_eq!(home_slot(pack_key(pos), 63), home_slot(pack_key(pos), 63));
    }

    #[test]
    fn axis_permutations_differ() {
        let a = hash_pos(LocalPos::new(1, 2, 3));
        let b = hash_pos(LocalPos::new(3, 2, 1));
        let c = hash_pos(LocalPos::new(2, 1, 3));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn probe_wraps_at_capacity() {
        assert_eq!(next_slot(15, 15), 0);
        assert_eq!(next_slot(3, 15), 4);
        assert_eq!(probe_distance(14, 1, 15), 3);
        assert_eq!(probe_distance(5, 5, 15), 0);
    }

    #[test]
    fn a_chunk_spreads_over_buckets() {
        let mask = 1023;
        let mut buckets = vec![0u32; mask + 1];
        for x in 0..16 {
            for y in 0..16 {
                for z in 0..16 {
                    buckets[home_slot(pack_key(LocalPos::new(x, y, z)), mask)] += 1;
                }
            }
        }
        // 4096 keys over 1024 buckets: 4 on average.
        let used = buckets.iter().filter(|&&n| n > 0).count();
        let worst = buckets.iter().copied().max().unwrap_or(0);
        assert!(used > 900, "only {used} buckets used");
        assert!(worst < 20, "bucket with {worst} keys");
    }
}
