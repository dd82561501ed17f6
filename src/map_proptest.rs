#![cfg(test)]

// Property tests for both map strategies kept inside the crate so they can
// plug in test hashers and check internal bookkeeping.

use crate::chaining_map::ChainingMap;
use crate::error::{InvalidArgument, IterError};
use crate::map::{Keys, Map};
use crate::open_addressing_map::OpenAddressingMap;
use hashbrown::HashMap;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::BTreeSet;
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    InsertAbsent(i32),
    Remove(usize),
    Put(usize, i32),
    Get(usize),
    Has(String),
    Snapshot,
    Advance,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let has_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            1 => any::<i32>().prop_map(Op::InsertAbsent),
            2 => idx.clone().prop_map(Op::Remove),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            1 => idx.clone().prop_map(Op::Get),
            1 => prop_oneof![has_pool, "[a-z]{0,5}"].prop_map(Op::Has),
            1 => Just(Op::Snapshot),
            2 => Just(Op::Advance),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// An iterator taken mid-scenario; `stale` flips on the next structural change.
struct Held {
    keys: Keys<String>,
    stale: bool,
}

// State-machine equivalence against hashbrown::HashMap. `check` runs after
// every op for strategy-specific bookkeeping.
fn run_scenario<M, F>(
    mut sut: M,
    pool: &[String],
    ops: Vec<Op>,
    check: F,
) -> Result<(), TestCaseError>
where
    M: Map<String, i32>,
    F: Fn(&M) -> Result<(), TestCaseError>,
{
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut held: Option<Held> = None;

    for op in ops {
        let mut structural = false;
        match op {
            Op::Insert(i, v) => {
                let k = pool[i].clone();
                let already = model.contains_key(&k);
                match sut.insert(Some(k.clone()), v) {
                    Ok(()) => {
                        prop_assert!(!already, "insert must fail on duplicate");
                        model.insert(k, v);
                        structural = true;
                    }
                    Err(e) => {
                        prop_assert!(already, "duplicate error only when key exists");
                        prop_assert_eq!(e, InvalidArgument::DuplicateKey);
                    }
                }
            }
            Op::InsertAbsent(v) => {
                prop_assert_eq!(sut.insert(None, v), Err(InvalidArgument::AbsentKey));
            }
            Op::Remove(i) => {
                let k = &pool[i];
                match model.remove(k) {
                    Some(mv) => {
                        prop_assert_eq!(sut.remove(Some(k.as_str())), Ok(mv));
                        structural = true;
                    }
                    None => {
                        prop_assert_eq!(
                            sut.remove(Some(k.as_str())),
                            Err(InvalidArgument::MissingKey)
                        );
                    }
                }
            }
            Op::Put(i, v) => {
                let k = &pool[i];
                match model.get_mut(k) {
                    Some(mv) => {
                        prop_assert_eq!(sut.put(Some(k.as_str()), v), Ok(()));
                        *mv = v;
                    }
                    None => {
                        prop_assert_eq!(
                            sut.put(Some(k.as_str()), v),
                            Err(InvalidArgument::MissingKey)
                        );
                    }
                }
            }
            Op::Get(i) => {
                let k = &pool[i];
                match model.get(k) {
                    Some(mv) => {
                        prop_assert_eq!(sut.get(Some(k.as_str())), Ok(mv));
                    }
                    None => {
                        prop_assert_eq!(
                            sut.get(Some(k.as_str())),
                            Err(InvalidArgument::MissingKey)
                        );
                    }
                }
            }
            Op::Has(s) => {
                prop_assert_eq!(sut.has(Some(s.as_str())), model.contains_key(&s));
            }
            Op::Snapshot => {
                held = Some(Held {
                    keys: sut.iter(),
                    stale: false,
                });
            }
            Op::Advance => {
                if let Some(h) = held.as_mut() {
                    let exhausted = !h.keys.has_next();
                    let res = h.keys.try_next();
                    if h.stale {
                        prop_assert_eq!(res, Err(IterError::ConcurrentModification));
                    } else if exhausted {
                        prop_assert_eq!(res, Err(IterError::NoSuchElement));
                    } else {
                        let k = res.map_err(|e| TestCaseError::fail(e.to_string()))?;
                        prop_assert!(model.contains_key(&k), "yielded key must be live");
                    }
                }
            }
            Op::Iterate => {
                let keys: Vec<String> = sut
                    .iter()
                    .collect::<Result<_, _>>()
                    .map_err(|e| TestCaseError::fail(e.to_string()))?;
                let unique: BTreeSet<_> = keys.iter().cloned().collect();
                prop_assert_eq!(unique.len(), keys.len(), "no key yielded twice");
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(unique, m_keys);
            }
        }

        if structural {
            if let Some(h) = held.as_mut() {
                h.stale = true;
            }
        }
        prop_assert!(!sut.has(None::<&str>));
        prop_assert_eq!(sut.size(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.load_factor() <= 0.75);
        check(&sut)?;
    }
    Ok(())
}

fn chaining_invariants<S: BuildHasher>(
    m: &ChainingMap<String, i32, S>,
) -> Result<(), TestCaseError> {
    prop_assert_eq!(m.chained(), m.size());
    prop_assert!(m.capacity() % 10 == 0 && (m.capacity() / 10).is_power_of_two());
    Ok(())
}

fn open_addressing_invariants<S: BuildHasher>(
    m: &OpenAddressingMap<String, i32, S>,
) -> Result<(), TestCaseError> {
    let (occupied, tombstones) = m.slot_census();
    prop_assert_eq!(occupied, m.size());
    prop_assert_eq!(tombstones, m.tombstones());
    prop_assert!(occupied + tombstones < m.capacity(), "an empty slot must remain");
    prop_assert!(m.capacity() % 10 == 0 && (m.capacity() / 10).is_power_of_two());
    Ok(())
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: both strategies agree with the model for any op sequence.
// Invariants exercised:
// - Duplicate/absent/missing keys fail with the matching InvalidArgument.
// - get/put/remove observe the model's values.
// - Iteration yields every live key exactly once; a held iterator fails with
//   ConcurrentModification after insert/remove and NoSuchElement once drained.
// - size/is_empty parity and the load bound after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_chaining_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(ChainingMap::new(), &pool, ops, chaining_invariants)?;
    }

    #[test]
    fn prop_open_addressing_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(OpenAddressingMap::new(), &pool, ops, open_addressing_invariants)?;
    }

    #[test]
    fn prop_chaining_with_collisions((pool, ops) in arb_scenario()) {
        let sut: ChainingMap<String, i32, ConstBuildHasher> = ChainingMap::with_hasher(ConstBuildHasher);
        run_scenario(sut, &pool, ops, chaining_invariants)?;
    }

    #[test]
    fn prop_open_addressing_with_collisions((pool, ops) in arb_scenario()) {
        let sut: OpenAddressingMap<String, i32, ConstBuildHasher> = OpenAddressingMap::with_hasher(ConstBuildHasher);
        run_scenario(sut, &pool, ops, open_addressing_invariants)?;
    }
}

// Property: both strategies iterate the same key set after the same inserts,
// and repeated snapshots of an unchanged map yield the same order.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_snapshots_are_stable(keys in proptest::collection::btree_set("[a-z]{1,6}", 0..40)) {
        let mut chaining: ChainingMap<String, i32> = ChainingMap::new();
        let mut open: OpenAddressingMap<String, i32> = OpenAddressingMap::new();
        for (i, k) in keys.iter().enumerate() {
            chaining.insert(Some(k.clone()), i as i32).unwrap();
            open.insert(Some(k.clone()), i as i32).unwrap();
        }
        let first: Vec<String> = chaining.iter().collect::<Result<_, _>>().unwrap();
        let second: Vec<String> = chaining.iter().collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(&first, &second);

        let a: BTreeSet<String> = first.into_iter().collect();
        let b: BTreeSet<String> = open.iter().collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(&a, &keys);
        prop_assert_eq!(&b, &keys);
        prop_assert_eq!(chaining.capacity(), open.capacity());
    }
}
