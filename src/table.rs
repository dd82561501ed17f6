//! Placement arithmetic shared by both strategies: hashing, home index,
//! and the growth rule.

use core::hash::{BuildHasher, BuildHasherDefault, Hash};
use std::collections::hash_map::DefaultHasher;

/// Number of buckets (chaining) or slots (open addressing) in a new map.
pub const INITIAL_CAPACITY: usize = 10;

// Growth threshold is 3/4, kept as a ratio so the check stays in integers.
const LOAD_NUMERATOR: usize = 3;
const LOAD_DENOMINATOR: usize = 4;

/// Hasher used by every map: SipHash with fixed keys, so placement is the
/// same from run to run within one toolchain.
pub type FixedState = BuildHasherDefault<DefaultHasher>;

#[inline]
pub(crate) fn make_hash<S, Q>(hasher: &S, q: &Q) -> u64
where
    S: BuildHasher,
    Q: ?Sized + Hash,
{
    hasher.hash_one(q)
}

/// Home position of `hash` in a table of `capacity` positions, in `[0, capacity)`.
#[inline]
pub(crate) fn home_index(hash: u64, capacity: usize) -> usize {
    debug_assert!(capacity > 0);
    (hash % capacity as u64) as usize
}

/// True when placing one more entry on top of `occupied` would push the
/// load past the threshold.
#[inline]
pub(crate) fn needs_growth(occupied: usize, capacity: usize) -> bool {
    (occupied + 1) * LOAD_DENOMINATOR > capacity * LOAD_NUMERATOR
}

#[inline]
pub(crate) fn grown(capacity: usize) -> usize {
    capacity * 2
}

pub(crate) fn load_factor(occupied: usize, capacity: usize) -> f64 {
    occupied as f64 / capacity as f64
}

#[cfg(test)]
pub(crate) mod testing {
    use core::hash::{BuildHasher, Hasher};

    /// Hashes a `u64` key to itself so tests choose home indexes directly.
    #[derive(Clone, Copy, Default)]
    pub(crate) struct IdentityBuildHasher;

    #[derive(Default)]
    pub(crate) struct IdentityHasher(u64);

    impl BuildHasher for IdentityBuildHasher {
        type Hasher = IdentityHasher;
        fn build_hasher(&self) -> Self::Hasher {
            IdentityHasher(0)
        }
    }

    impl Hasher for IdentityHasher {
        fn write(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.0 = (self.0 << 8) | u64::from(b);
            }
        }
        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }
        fn finish(&self) -> u64 {
            self.0
        }
    }
}
