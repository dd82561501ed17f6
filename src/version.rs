//! Structural mutation counter for fail-fast iteration.
//!
//! Each map owns a `ModCount` and bumps it on every successful insert and
//! remove. Iterators capture a `Stamp` (the counter's value at creation plus
//! a shared view of the live counter) and compare the two before yielding.
//! The counter is shared through `Rc<Cell<_>>`, which keeps maps and their
//! iterators `!Send`/`!Sync` in line with the single-threaded design.

use crate::error::IterError;
use core::cell::Cell;
use std::rc::Rc;

/// Per-map mutation counter.
#[derive(Debug, Default)]
pub(crate) struct ModCount {
    count: Rc<Cell<u64>>,
}

impl ModCount {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record one structural change.
    #[inline]
    pub(crate) fn bump(&mut self) {
        self.count.set(self.count.get().wrapping_add(1));
    }

    #[cfg(test)]
    pub(crate) fn get(&self) -> u64 {
        self.count.get()
    }

    /// Capture the current value for an iterator.
    pub(crate) fn stamp(&self) -> Stamp {
        Stamp {
            seen: self.count.get(),
            live: Rc::clone(&self.count),
        }
    }
}

/// Counter value observed when an iterator was created.
#[derive(Debug)]
pub(crate) struct Stamp {
    seen: u64,
    live: Rc<Cell<u64>>,
}

impl Stamp {
    /// Fails if the owning map changed shape since the stamp was taken.
    #[inline]
    pub(crate) fn check(&self) -> Result<(), IterError> {
        if self.live.get() == self.seen {
            Ok(())
        } else {
            Err(IterError::ConcurrentModification)
        }
    }
}
