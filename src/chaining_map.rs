//! ChainingMap: separate chaining over a bucket array.
//!
//! Entries live in a `SlotMap` and buckets chain the generational keys of
//! their entries in append order. Lookup resolves to a `Located` handle
//! (bucket, position, slot key), so `put` writes through the slot key and
//! `remove` unlinks by position without comparing keys a second time.
//! Rehashing relinks keys into a larger bucket array; entries themselves
//! never move and the cached hash avoids calling `K: Hash` again.

use crate::cfg::trace;
use crate::error::InvalidArgument;
use crate::map::{Keys, Map};
use crate::table::{self, FixedState, INITIAL_CAPACITY};
use crate::version::ModCount;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

#[derive(Copy, Clone, Debug)]
struct Located {
    bucket: usize,
    position: usize,
    slot: DefaultKey,
}

pub struct ChainingMap<K, V, S = FixedState> {
    hasher: S,
    buckets: Vec<Vec<DefaultKey>>,
    entries: SlotMap<DefaultKey, Entry<K, V>>,
    mods: ModCount,
}

impl<K, V> ChainingMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(FixedState::default())
    }
}

impl<K, V> Default for ChainingMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub(crate) fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            buckets: empty_buckets(INITIAL_CAPACITY),
            entries: SlotMap::with_key(),
            mods: ModCount::new(),
        }
    }

    fn locate<Q>(&self, q: &Q) -> Option<Located>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = table::make_hash(&self.hasher, q);
        let bucket = table::home_index(hash, self.buckets.len());
        self.buckets[bucket]
            .iter()
            .position(|&slot| {
                self.entries
                    .get(slot)
                    .map(|e| e.hash == hash && e.key.borrow() == q)
                    .unwrap_or(false)
            })
            .map(|position| Located {
                bucket,
                position,
                slot: self.buckets[bucket][position],
            })
    }

    fn rehash(&mut self) {
        let old_capacity = self.buckets.len();
        let new_capacity = table::grown(old_capacity);
        let old = std::mem::replace(&mut self.buckets, empty_buckets(new_capacity));
        for slot in old.into_iter().flatten() {
            if let Some(e) = self.entries.get(slot) {
                self.buckets[table::home_index(e.hash, new_capacity)].push(slot);
            }
        }
        trace!(
            old_capacity,
            new_capacity,
            live = self.entries.len(),
            "rehashed chaining table"
        );
    }

    /// Entries in bucket order, then append order within each bucket.
    fn entries_in_order(&self) -> impl Iterator<Item = &Entry<K, V>> + '_ {
        self.buckets
            .iter()
            .flatten()
            .filter_map(move |&slot| self.entries.get(slot))
    }

    #[cfg(test)]
    fn bucket_of(&self, key: &K) -> Option<(usize, usize)> {
        self.locate(key).map(|l| (l.bucket, l.position))
    }

    /// Number of slot keys linked from buckets; equals `size()` when consistent.
    #[cfg(test)]
    pub(crate) fn chained(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

impl<K, V, S> Map<K, V> for ChainingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn insert(&mut self, key: Option<K>, value: V) -> Result<(), InvalidArgument> {
        let key = key.ok_or(InvalidArgument::AbsentKey)?;
        if self.locate(&key).is_some() {
            return Err(InvalidArgument::DuplicateKey);
        }
        if table::needs_growth(self.entries.len(), self.buckets.len()) {
            self.rehash();
        }
        let hash = table::make_hash(&self.hasher, &key);
        let bucket = table::home_index(hash, self.buckets.len());
        let slot = self.entries.insert(Entry { key, value, hash });
        self.buckets[bucket].push(slot);
        self.mods.bump();
        Ok(())
    }

    fn remove<Q>(&mut self, key: Option<&Q>) -> Result<V, InvalidArgument>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let key = key.ok_or(InvalidArgument::AbsentKey)?;
        let found = self.locate(key).ok_or(InvalidArgument::MissingKey)?;
        let entry = self
            .entries
            .remove(found.slot)
            .ok_or(InvalidArgument::MissingKey)?;
        self.buckets[found.bucket].remove(found.position);
        self.mods.bump();
        Ok(entry.value)
    }

    fn put<Q>(&mut self, key: Option<&Q>, value: V) -> Result<(), InvalidArgument>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let key = key.ok_or(InvalidArgument::AbsentKey)?;
        let found = self.locate(key).ok_or(InvalidArgument::MissingKey)?;
        let entry = self
            .entries
            .get_mut(found.slot)
            .ok_or(InvalidArgument::MissingKey)?;
        entry.value = value;
        Ok(())
    }

    fn get<Q>(&self, key: Option<&Q>) -> Result<&V, InvalidArgument>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let key = key.ok_or(InvalidArgument::AbsentKey)?;
        let found = self.locate(key).ok_or(InvalidArgument::MissingKey)?;
        self.entries
            .get(found.slot)
            .map(|e| &e.value)
            .ok_or(InvalidArgument::MissingKey)
    }

    fn has<Q>(&self, key: Option<&Q>) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        key.map_or(false, |k| self.locate(k).is_some())
    }

    fn size(&self) -> usize {
        self.entries.len()
    }

    fn iter(&self) -> Keys<K>
    where
        K: Clone,
    {
        let keys = self.entries_in_order().map(|e| e.key.clone()).collect();
        Keys::new(keys, self.mods.stamp())
    }

    fn capacity(&self) -> usize {
        self.buckets.len()
    }

    fn load_factor(&self) -> f64 {
        table::load_factor(self.entries.len(), self.buckets.len())
    }
}

impl<K, V, S> fmt::Debug for ChainingMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries_in_order().map(|e| (&e.key, &e.value)))
            .finish()
    }
}

fn empty_buckets(capacity: usize) -> Vec<Vec<DefaultKey>> {
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, Vec::new);
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IterError;
    use crate::table::testing::IdentityBuildHasher;

    fn identity_map() -> ChainingMap<u64, &'static str, IdentityBuildHasher> {
        ChainingMap::with_hasher(IdentityBuildHasher)
    }

    /// Invariant: duplicate and absent keys are rejected and the map is unchanged.
    #[test]
    fn duplicate_and_absent_insert_rejected() {
        let mut m: ChainingMap<String, i32> = ChainingMap::new();
        m.insert(Some("dup".to_string()), 1).unwrap();
        assert_eq!(
            m.insert(Some("dup".to_string()), 2),
            Err(InvalidArgument::DuplicateKey)
        );
        assert_eq!(m.insert(None, 3), Err(InvalidArgument::AbsentKey));
        assert_eq!(m.size(), 1);
        assert_eq!(m.get(Some("dup")), Ok(&1));
        assert_eq!(m.mods.get(), 1, "failed inserts must not bump the counter");
    }

    /// Invariant: colliding keys share a bucket in append order and each
    /// resolves to its own value.
    #[test]
    fn collisions_append_to_bucket() {
        let mut m = identity_map();
        m.insert(Some(3), "a").unwrap();
        m.insert(Some(13), "b").unwrap();
        m.insert(Some(23), "c").unwrap();
        assert_eq!(m.bucket_of(&3), Some((3, 0)));
        assert_eq!(m.bucket_of(&13), Some((3, 1)));
        assert_eq!(m.bucket_of(&23), Some((3, 2)));
        assert_eq!(m.get(Some(&13)), Ok(&"b"));
        assert_eq!(m.buckets[3].len(), 3);
    }

    /// Invariant: removal unlinks exactly one entry from the middle of a chain
    /// and keeps the remaining order.
    #[test]
    fn remove_from_middle_of_chain() {
        let mut m = identity_map();
        for k in [3, 13, 23] {
            m.insert(Some(k), "v").unwrap();
        }
        assert_eq!(m.remove(Some(&13)), Ok("v"));
        assert_eq!(m.bucket_of(&3), Some((3, 0)));
        assert_eq!(m.bucket_of(&23), Some((3, 1)));
        assert!(!m.has(Some(&13)));
        assert_eq!(m.remove(Some(&13)), Err(InvalidArgument::MissingKey));
        assert_eq!(m.size(), 2);
    }

    /// Invariant: the eighth insert into a fresh map doubles capacity and
    /// every earlier entry survives the move.
    #[test]
    fn rehash_on_eighth_insert() {
        let mut m = identity_map();
        let values = ["a", "b", "c", "d", "e", "f", "g", "h"];
        for (k, v) in values.iter().take(7).enumerate() {
            m.insert(Some(k as u64 * 5), *v).unwrap();
        }
        assert_eq!(m.capacity(), 10);
        m.insert(Some(35), values[7]).unwrap();
        assert_eq!(m.capacity(), 20);
        assert_eq!(m.size(), 8);
        for (k, v) in values.iter().enumerate() {
            assert_eq!(m.get(Some(&(k as u64 * 5))), Ok(v));
        }
        // 5 and 15 shared bucket 5 before; now they split.
        assert_eq!(m.bucket_of(&5), Some((5, 0)));
        assert_eq!(m.bucket_of(&15), Some((15, 0)));
        assert_eq!(m.bucket_of(&25), Some((5, 1)));
    }

    /// Invariant: `put` updates in place without a structural change, so a
    /// live iterator keeps working.
    #[test]
    fn put_is_not_structural() {
        let mut m = identity_map();
        m.insert(Some(1), "one").unwrap();
        let mut it = m.iter();
        m.put(Some(&1), "uno").unwrap();
        assert_eq!(it.try_next(), Ok(1));
        assert_eq!(m.get(Some(&1)), Ok(&"uno"));
        assert_eq!(m.put(Some(&2), "dos"), Err(InvalidArgument::MissingKey));
        assert_eq!(m.put(None, "nada"), Err(InvalidArgument::AbsentKey));
    }

    /// Invariant: iteration walks buckets in index order, then chain order.
    #[test]
    fn iteration_follows_bucket_then_chain_order() {
        let mut m = identity_map();
        for k in [21, 4, 1, 11, 9] {
            m.insert(Some(k), "v").unwrap();
        }
        let keys: Result<Vec<u64>, IterError> = m.iter().collect();
        assert_eq!(keys, Ok(vec![21, 1, 11, 4, 9]));
    }

    #[test]
    fn insert_after_iter_fails_fast() {
        let mut m = identity_map();
        m.insert(Some(1), "a").unwrap();
        m.insert(Some(2), "b").unwrap();
        let mut it = m.iter();
        assert_eq!(it.try_next(), Ok(1));
        m.insert(Some(3), "c").unwrap();
        assert_eq!(it.try_next(), Err(IterError::ConcurrentModification));

        let mut fresh = m.iter();
        assert_eq!(fresh.remaining(), 3);
        assert_eq!(fresh.try_next(), Ok(1));
    }

    #[test]
    fn borrowed_lookup_with_str() {
        let mut m: ChainingMap<String, i32> = ChainingMap::new();
        m.insert(Some("hello".to_string()), 1).unwrap();
        assert!(m.has(Some("hello")));
        assert!(!m.has(Some("world")));
        assert!(!m.has(None::<&str>));
        assert_eq!(m.get(None::<&str>), Err(InvalidArgument::AbsentKey));
        assert_eq!(m.remove(None::<&str>), Err(InvalidArgument::AbsentKey));
    }

    #[test]
    fn debug_lists_entries_in_table_order() {
        let mut m = identity_map();
        m.insert(Some(12), "b").unwrap();
        m.insert(Some(1), "a").unwrap();
        assert_eq!(format!("{:?}", m), r#"{1: "a", 12: "b"}"#);
    }
}
