//! Property-based checks for invariants that must hold after any legal sequence of
//! public operations, regardless of which specific keys/values were involved.

use proptest::prelude::*;

use avila_store::policy::{FifoPolicy, LruPolicy};
use avila_store::{AttributeMap, MemoryStore};

#[derive(Debug, Clone)]
enum Op {
    Put(u8, u8),
    Remove(u8),
    Get(u8),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<u8>(), any::<u8>()).prop_map(|(k, v)| Op::Put(k, v)),
        any::<u8>().prop_map(Op::Remove),
        any::<u8>().prop_map(Op::Get),
        Just(Op::Clear),
    ]
}

proptest! {
    #[test]
    fn size_never_exceeds_budget_and_tracks_map_len(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut store: MemoryStore<u8, u8, FifoPolicy<u8>> = MemoryStore::builder()
            .max_size(16)
            .policy(FifoPolicy::new())
            .build()
            .unwrap();

        for op in ops {
            match op {
                Op::Put(k, v) => { store.put(k, v, AttributeMap::new(), false).unwrap(); }
                Op::Remove(k) => { store.remove(&k).unwrap(); }
                Op::Get(k) => { store.get(&k); }
                Op::Clear => { store.clear().unwrap(); }
            }
            prop_assert!(store.len() <= 16);
        }
    }

    #[test]
    fn put_twice_with_no_policy_matches_a_single_put(k in any::<u8>(), v1 in any::<u8>(), v2 in any::<u8>()) {
        let mut with_overwrite: MemoryStore<u8, u8, FifoPolicy<u8>> = MemoryStore::unbounded();
        with_overwrite.put(k, v1, AttributeMap::new(), false).unwrap();
        let second = with_overwrite.put(k, v2, AttributeMap::new(), false).unwrap();

        let mut direct: MemoryStore<u8, u8, FifoPolicy<u8>> = MemoryStore::unbounded();
        direct.put(k, v1, AttributeMap::new(), false).unwrap();
        let first_entry = direct.peek(&k).unwrap();

        prop_assert_eq!(second.previous.unwrap().value(), first_entry.value());
        prop_assert_eq!(with_overwrite.len(), 1);
        prop_assert_eq!(with_overwrite.peek(&k).unwrap().value(), &v2);
    }

    #[test]
    fn remove_then_get_is_always_none(k in any::<u8>(), v in any::<u8>()) {
        let mut store: MemoryStore<u8, u8, FifoPolicy<u8>> = MemoryStore::unbounded();
        store.put(k, v, AttributeMap::new(), false).unwrap();
        store.remove(&k).unwrap();
        prop_assert_eq!(store.get(&k), None);
    }

    #[test]
    fn clearing_empties_every_known_key(keys in prop::collection::vec(any::<u8>(), 0..32)) {
        let mut store: MemoryStore<u8, u8, FifoPolicy<u8>> = MemoryStore::unbounded();
        for k in &keys {
            store.put(*k, 0, AttributeMap::new(), false).unwrap();
        }
        store.clear().unwrap();

        prop_assert_eq!(store.len(), 0);
        prop_assert_eq!(store.volume(), 0);
        for k in &keys {
            prop_assert_eq!(store.peek(k), None);
        }
    }

    #[test]
    fn lru_keeps_exactly_the_last_touched_keys(touches in prop::collection::vec(0u8..8, 1..200)) {
        let mut store: MemoryStore<u8, u8, LruPolicy<u8>> = MemoryStore::builder()
            .max_size(4)
            .policy(LruPolicy::new())
            .build()
            .unwrap();

        let mut order: Vec<u8> = Vec::new();
        for k in touches {
            store.put(k, 0, AttributeMap::new(), false).unwrap();
            store.get(&k);
            order.retain(|&x| x != k);
            order.push(k);
        }

        let mut expected: Vec<u8> = order.into_iter().rev().take(4).collect();
        expected.sort_unstable();
        let mut actual: Vec<u8> = (0u8..8).filter(|k| store.contains_key(k)).collect();
        actual.sort_unstable();

        prop_assert_eq!(actual, expected);
    }
}
