//! The `Map` contract both strategies implement, and the fail-fast key
//! iterator they hand out.

use crate::error::{InvalidArgument, IterError};
use crate::version::Stamp;
use core::borrow::Borrow;
use core::hash::Hash;

/// Key→value map with unique keys.
///
/// Keys are passed as `Option` so an absent key is an explicit `None`
/// rather than a sentinel; every operation except [`has`](Map::has) rejects
/// it with [`InvalidArgument::AbsentKey`]. Lookups take any borrowed form
/// `Q` of the key type.
///
/// Failed calls leave the map untouched. Only `insert` and `remove` count
/// as structural changes for iteration purposes.
pub trait Map<K, V> {
    /// Add a new entry. Fails on `None` or on a key that is already present.
    fn insert(&mut self, key: Option<K>, value: V) -> Result<(), InvalidArgument>;

    /// Remove the entry for `key` and return its value.
    fn remove<Q>(&mut self, key: Option<&Q>) -> Result<V, InvalidArgument>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq;

    /// Replace the value of an existing entry. Not an upsert: a missing key
    /// fails with [`InvalidArgument::MissingKey`].
    fn put<Q>(&mut self, key: Option<&Q>, value: V) -> Result<(), InvalidArgument>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq;

    /// Borrow the value stored for `key`.
    fn get<Q>(&self, key: Option<&Q>) -> Result<&V, InvalidArgument>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq;

    /// Whether `key` has a live entry. `None` is never present.
    fn has<Q>(&self, key: Option<&Q>) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq;

    /// Number of live entries.
    fn size(&self) -> usize;

    /// Snapshot of the live keys in table order.
    ///
    /// The returned iterator does not borrow the map. Advancing it after the
    /// map has been inserted into or removed from fails with
    /// [`IterError::ConcurrentModification`].
    fn iter(&self) -> Keys<K>
    where
        K: Clone;

    /// Current number of buckets or slots.
    fn capacity(&self) -> usize;

    /// Occupancy ratio used for the growth decision.
    fn load_factor(&self) -> f64;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// Fail-fast iterator over a snapshot of a map's keys.
///
/// [`try_next`](Keys::try_next) reports every failure as an [`IterError`].
/// The `Iterator` impl yields `Some(Err(ConcurrentModification))` once after
/// a structural change and then ends.
#[derive(Debug)]
pub struct Keys<K> {
    keys: std::vec::IntoIter<K>,
    stamp: Stamp,
    failed: bool,
}

impl<K> Keys<K> {
    pub(crate) fn new(keys: Vec<K>, stamp: Stamp) -> Self {
        Self {
            keys: keys.into_iter(),
            stamp,
            failed: false,
        }
    }

    /// Whether the snapshot still holds keys to yield.
    pub fn has_next(&self) -> bool {
        self.keys.len() > 0
    }

    /// Keys left in the snapshot.
    pub fn remaining(&self) -> usize {
        self.keys.len()
    }

    /// Advance by one key.
    ///
    /// The mutation counter is checked first, so a structural change fails
    /// the advance with `ConcurrentModification` even when the snapshot is
    /// already drained.
    pub fn try_next(&mut self) -> Result<K, IterError> {
        self.stamp.check()?;
        self.keys.next().ok_or(IterError::NoSuchElement)
    }
}

impl<K> Iterator for Keys<K> {
    type Item = Result<K, IterError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.try_next() {
            Ok(k) => Some(Ok(k)),
            Err(IterError::NoSuchElement) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.keys.len()))
        }
    }
}
