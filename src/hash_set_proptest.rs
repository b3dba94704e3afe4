#![cfg(test)]

// Property tests for HashSet kept inside the crate so they can reach the
// bucket layout and crate-private entry points.

use crate::capability::TableKey;
use crate::hash_set::{index_between, HashSet};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::BTreeSet;
use std::fmt;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Add(usize),
    Remove(usize),
    RemoveAt(usize),
    Contains(usize),
    Resize(u8),
    Clear,
    Iterate,
}

fn arb_ops() -> impl Strategy<Value = (Vec<u32>, Vec<OpI>)> {
    proptest::collection::btree_set(1u32..500, 1..=24).prop_flat_map(|pool| {
        let pool: Vec<u32> = pool.into_iter().collect();
        let idx = 0..pool.len();
        let op = prop_oneof![
            6 => idx.clone().prop_map(OpI::Add),
            4 => idx.clone().prop_map(OpI::Remove),
            1 => (0usize..64).prop_map(OpI::RemoveAt),
            2 => idx.clone().prop_map(OpI::Contains),
            1 => (0u8..4).prop_map(OpI::Resize),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// Every occupied bucket is reachable from its home without crossing an
/// empty bucket, and `len` matches the occupied count.
fn check_layout<K: TableKey>(set: &HashSet<K>) -> Result<(), TestCaseError> {
    let slots = set.slots();
    let capacity = slots.len();
    let mut occupied = 0;
    for (p, key) in slots.iter().enumerate() {
        if key.is_empty() {
            continue;
        }
        occupied += 1;
        let home = (key.hash() % capacity as u64) as usize;
        let mut i = home;
        while i != p {
            prop_assert!(!slots[i].is_empty(), "gap at {} between home {} and {}", i, home, p);
            i = (i + 1) % capacity;
        }
        // the same statement phrased with the cyclic interval helper
        if home != p {
            for (q, other) in slots.iter().enumerate() {
                if q != p && index_between(q, home, p) {
                    prop_assert!(!other.is_empty());
                }
            }
        }
    }
    prop_assert_eq!(occupied, set.len());
    prop_assert!(set.is_empty() || set.len() < capacity / 2);
    Ok(())
}

fn run_state_machine<K, F>(pool: &[u32], ops: &[OpI], make: F) -> Result<(), TestCaseError>
where
    K: TableKey + Clone + Ord + fmt::Debug,
    F: Fn(u32) -> K,
{
    let mut sut: HashSet<K> = HashSet::new(4);
    let mut model: BTreeSet<K> = BTreeSet::new();

    for op in ops {
        match *op {
            OpI::Add(i) => {
                let k = make(pool[i]);
                let fresh = sut.add(k.clone()).unwrap();
                prop_assert_eq!(fresh, model.insert(k));
            }
            OpI::Remove(i) => {
                let k = make(pool[i]);
                let removed = sut.remove(&k);
                prop_assert_eq!(removed.is_some(), model.remove(&k));
                if let Some(r) = removed {
                    prop_assert!(r == k);
                }
            }
            OpI::RemoveAt(raw) => {
                let index = raw % sut.capacity();
                let before = sut.slots()[index].clone();
                match sut.remove_at(index) {
                    Some(k) => {
                        prop_assert!(k == before);
                        prop_assert!(model.remove(&k));
                    }
                    None => prop_assert!(before.is_empty()),
                }
            }
            OpI::Contains(i) => {
                let k = make(pool[i]);
                prop_assert_eq!(sut.contains(&k), model.contains(&k));
            }
            OpI::Resize(extra) => {
                // Any capacity that keeps the load factor is a valid target.
                let mut target = 4;
                while sut.len() >= target / 2 {
                    target *= 2;
                }
                sut.resize(target << extra).unwrap();
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
            }
            OpI::Iterate => {
                let seen: BTreeSet<K> = sut.iter().cloned().collect();
                prop_assert_eq!(seen.len(), sut.len());
                prop_assert_eq!(&seen, &model);
            }
        }
        check_layout(&sut)?;
        prop_assert_eq!(sut.len(), model.len());
    }
    for k in &model {
        prop_assert!(sut.contains(k));
    }
    Ok(())
}

// Every key hashes to the same bucket: the table degenerates into one long
// run that wraps around.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ConstKey(u32);

impl TableKey for ConstKey {
    fn empty() -> Self {
        ConstKey(0)
    }
    fn is_empty(&self) -> bool {
        self.0 == 0
    }
    fn hash(&self) -> u64 {
        7
    }
}

// Three distinct hashes: short interleaved clusters.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct LowEntropyKey(u32);

impl TableKey for LowEntropyKey {
    fn empty() -> Self {
        LowEntropyKey(0)
    }
    fn is_empty(&self) -> bool {
        self.0 == 0
    }
    fn hash(&self) -> u64 {
        u64::from(self.0 % 3) * 5 + 3
    }
}

// Property: state-machine equivalence against BTreeSet.
// Invariants exercised across random operation sequences:
// - `add` reports freshness exactly when the model gains the key.
// - `remove`/`remove_at` return the stored key and nothing else disappears.
// - After every op each key is reachable from its home bucket with no empty
//   bucket in between (no tombstones, backward shift keeps runs intact).
// - `len` matches the occupied bucket count and the load stays below half.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_ops()) {
        run_state_machine(&pool, &ops, |x| x)?;
    }

    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_ops()) {
        run_state_machine(&pool, &ops, ConstKey)?;
    }

    #[test]
    fn prop_state_machine_low_entropy((pool, ops) in arb_ops()) {
        run_state_machine(&pool, &ops, LowEntropyKey)?;
    }
}

/// Invariant: deleting any single key from any small fully-colliding table
/// leaves the rest reachable.
#[test]
fn exhaustive_small_collision_deletes() {
    for n in 1u32..=6 {
        for victim in 1..=n {
            let mut s: HashSet<ConstKey> = HashSet::new(16);
            for k in 1..=n {
                s.add(ConstKey(k)).unwrap();
            }
            assert_eq!(s.remove(&ConstKey(victim)), Some(ConstKey(victim)));
            for k in 1..=n {
                assert_eq!(s.contains(&ConstKey(k)), k != victim, "n={} victim={}", n, victim);
            }
            check_layout(&s).unwrap();
        }
    }
}
