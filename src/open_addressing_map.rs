//! OpenAddressingMap: linear probing over a flat slot array with tombstones.
//!
//! Slots are `Empty`, `Occupied` or `Tombstone`. Lookups probe forward from
//! the home index, skip tombstones, and stop at the first `Empty` slot.
//! Inserts always land in the first `Empty` slot of the probe sequence;
//! tombstones are never reused, so they accumulate until the next rehash
//! purges them. Growth is driven by the generation count (live entries plus
//! tombstones), since tombstones still take up probe-chain space.

use crate::cfg::trace;
use crate::error::InvalidArgument;
use crate::map::{Keys, Map};
use crate::table::{self, FixedState, INITIAL_CAPACITY};
use crate::version::ModCount;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

#[derive(Debug)]
enum Slot<K, V> {
    Empty,
    Occupied(Entry<K, V>),
    Tombstone,
}

pub struct OpenAddressingMap<K, V, S = FixedState> {
    hasher: S,
    slots: Vec<Slot<K, V>>,
    live: usize,
    // live + tombstones
    generation: usize,
    mods: ModCount,
}

impl<K, V> OpenAddressingMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(FixedState::default())
    }
}

impl<K, V> Default for OpenAddressingMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> OpenAddressingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub(crate) fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            slots: empty_slots(INITIAL_CAPACITY),
            live: 0,
            generation: 0,
            mods: ModCount::new(),
        }
    }

    /// Slots that are tombstones awaiting the next rehash.
    #[cfg(any(test, feature = "bench_internal"))]
    pub fn tombstones(&self) -> usize {
        self.generation - self.live
    }

    /// (occupied, tombstone) slot counts, recomputed from the table.
    #[cfg(test)]
    pub(crate) fn slot_census(&self) -> (usize, usize) {
        self.slots
            .iter()
            .fold((0, 0), |(occupied, tombs), slot| match slot {
                Slot::Occupied(_) => (occupied + 1, tombs),
                Slot::Tombstone => (occupied, tombs + 1),
                Slot::Empty => (occupied, tombs),
            })
    }

    /// Index of the occupied slot holding `q`, if any.
    fn find<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = table::make_hash(&self.hasher, q);
        let capacity = self.slots.len();
        let start = table::home_index(hash, capacity);
        for i in 0..capacity {
            let idx = (start + i) % capacity;
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Tombstone => {}
                Slot::Occupied(e) => {
                    if e.hash == hash && e.key.borrow() == q {
                        return Some(idx);
                    }
                }
            }
        }
        None
    }

    fn rehash(&mut self) {
        let old_capacity = self.slots.len();
        let new_capacity = table::grown(old_capacity);
        let old = std::mem::replace(&mut self.slots, empty_slots(new_capacity));
        for slot in old {
            if let Slot::Occupied(e) = slot {
                let idx = first_empty(&self.slots, e.hash);
                self.slots[idx] = Slot::Occupied(e);
            }
        }
        trace!(
            old_capacity,
            new_capacity,
            live = self.live,
            purged = self.generation - self.live,
            "rehashed open-addressing table"
        );
        self.generation = self.live;
    }

    fn entries_in_order(&self) -> impl Iterator<Item = &Entry<K, V>> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(e) => Some(e),
            Slot::Empty | Slot::Tombstone => None,
        })
    }
}

impl<K, V, S> Map<K, V> for OpenAddressingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn insert(&mut self, key: Option<K>, value: V) -> Result<(), InvalidArgument> {
        let key = key.ok_or(InvalidArgument::AbsentKey)?;
        if self.find(&key).is_some() {
            return Err(InvalidArgument::DuplicateKey);
        }
        if table::needs_growth(self.generation, self.slots.len()) {
            self.rehash();
        }
        let hash = table::make_hash(&self.hasher, &key);
        let idx = first_empty(&self.slots, hash);
        self.slots[idx] = Slot::Occupied(Entry { key, value, hash });
        self.live += 1;
        self.generation += 1;
        self.mods.bump();
        Ok(())
    }

    fn remove<Q>(&mut self, key: Option<&Q>) -> Result<V, InvalidArgument>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let key = key.ok_or(InvalidArgument::AbsentKey)?;
        let idx = self.find(key).ok_or(InvalidArgument::MissingKey)?;
        match std::mem::replace(&mut self.slots[idx], Slot::Tombstone) {
            Slot::Occupied(e) => {
                self.live -= 1;
                self.mods.bump();
                Ok(e.value)
            }
            _ => unreachable!("find only returns occupied slots"),
        }
    }

    fn put<Q>(&mut self, key: Option<&Q>, value: V) -> Result<(), InvalidArgument>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let key = key.ok_or(InvalidArgument::AbsentKey)?;
        let idx = self.find(key).ok_or(InvalidArgument::MissingKey)?;
        match &mut self.slots[idx] {
            Slot::Occupied(e) => {
                e.value = value;
                Ok(())
            }
            _ => Err(InvalidArgument::MissingKey),
        }
    }

    fn get<Q>(&self, key: Option<&Q>) -> Result<&V, InvalidArgument>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let key = key.ok_or(InvalidArgument::AbsentKey)?;
        let idx = self.find(key).ok_or(InvalidArgument::MissingKey)?;
        match &self.slots[idx] {
            Slot::Occupied(e) => Ok(&e.value),
            _ => Err(InvalidArgument::MissingKey),
        }
    }

    fn has<Q>(&self, key: Option<&Q>) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        key.map_or(false, |k| self.find(k).is_some())
    }

    fn size(&self) -> usize {
        self.live
    }

    fn iter(&self) -> Keys<K>
    where
        K: Clone,
    {
        let keys = self.entries_in_order().map(|e| e.key.clone()).collect();
        Keys::new(keys, self.mods.stamp())
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn load_factor(&self) -> f64 {
        table::load_factor(self.generation, self.slots.len())
    }
}

impl<K, V, S> fmt::Debug for OpenAddressingMap<K, V, S>
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

fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || Slot::Empty);
    slots
}

/// First `Empty` slot on the probe sequence of `hash`.
fn first_empty<K, V>(slots: &[Slot<K, V>], hash: u64) -> usize {
    let capacity = slots.len();
    let start = table::home_index(hash, capacity);
    (0..capacity)
        .map(|i| (start + i) % capacity)
        .find(|&idx| matches!(slots[idx], Slot::Empty))
        .unwrap_or_else(|| unreachable!("growth threshold keeps an empty slot in every table"))
}
