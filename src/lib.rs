//! probe-hashmap: two single-threaded hash maps, one by separate chaining
//! and one by open addressing with linear probing, behind a shared `Map`
//! trait.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the two collision strategies independent while sharing the
//!   pieces that must behave identically: placement arithmetic, the growth
//!   rule, the error types, and fail-fast iteration.
//! - Layers:
//!   - `table`: fixed deterministic hasher, home index, 3/4 growth rule.
//!   - `version`: structural mutation counter and the stamps iterators
//!     hold.
//!   - `map`: the `Map<K, V>` trait and the `Keys` iterator.
//!   - `ChainingMap` / `OpenAddressingMap`: the two strategies.
//!
//! Constraints
//! - Single-threaded: maps and iterators are `!Send`/`!Sync` (the mutation
//!   counter is shared through `Rc<Cell<_>>`).
//! - Unique keys; duplicate inserts fail and leave the map unchanged.
//! - Absent keys are `None` at the API boundary and never stored.
//! - Capacity starts at 10, only doubles, never shrinks.
//!
//! Hasher and rehashing invariants
//! - Each entry stores the `u64` hash computed at insertion; rehashing
//!   places entries by the stored hash and never calls `K: Hash` again.
//! - The hasher is SipHash with fixed keys, so the table order observed by
//!   iteration is reproducible from run to run within one toolchain.
//!
//! Growth
//! - Before each insert the map checks whether the table would be more than
//!   3/4 full after placing the new entry, and doubles first if so. For
//!   chaining "full" counts live entries; for open addressing it counts live
//!   entries plus tombstones.
//!
//! Tombstones
//! - Open-addressing removal leaves a tombstone so later keys on the same
//!   probe chain stay reachable. Inserts never reuse tombstones; the next
//!   rehash purges them.
//!
//! Iteration
//! - `Map::iter` snapshots the live keys (cloned) in table order and records
//!   the mutation counter. The iterator does not borrow the map. Only
//!   `insert` and `remove` bump the counter; `put` does not.
//!
//! Notes and non-goals
//! - No shrink on delete, no ordering guarantees beyond table order, no
//!   pluggable hasher in the public API.
//! - Rehash events are traced when the `tracing` feature is enabled.

mod cfg;
mod chaining_map;
mod error;
mod map;
mod map_proptest;
mod open_addressing_map;
mod table;
mod version;

// Public surface
pub use chaining_map::ChainingMap;
pub use error::{InvalidArgument, IterError};
pub use map::{Keys, Map};
pub use open_addressing_map::OpenAddressingMap;
pub use table::{FixedState, INITIAL_CAPACITY};
