//! Random eviction: picks a uniformly random tracked key. Cheapest policy to maintain
//! (no bookkeeping on touch) at the cost of no recency/frequency guarantees at all.

use std::collections::HashMap;
use std::hash::Hash;

use rand::Rng;

use super::{Admission, ReplacementPolicy};

#[derive(Default)]
pub struct RandomPolicy<K> {
    keys: Vec<K>,
    index: HashMap<K, usize>,
}

impl<K: Hash + Eq + Clone> RandomPolicy<K> {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn swap_remove(&mut self, slot: usize) {
        self.keys.swap_remove(slot);
        if let Some(moved) = self.keys.get(slot) {
            self.index.insert(moved.clone(), slot);
        }
    }
}

impl<K: Hash + Eq + Clone + Send> ReplacementPolicy<K> for RandomPolicy<K> {
    fn add(&mut self, key: &K) {
        if self.index.contains_key(key) {
            return;
        }
        self.index.insert(key.clone(), self.keys.len());
        self.keys.push(key.clone());
    }

    fn replace(&mut self, _key: &K) -> Admission {
        Admission::RetainNew
    }

    fn remove(&mut self, key: &K) {
        if let Some(slot) = self.index.remove(key) {
            self.swap_remove(slot);
        }
    }

    fn touch(&mut self, _key: &K) {
        // Random eviction ignores access patterns entirely.
    }

    fn evict_next(&self) -> Option<K> {
        if self.keys.is_empty() {
            return None;
        }
        let idx = rand::thread_rng().gen_range(0..self.keys.len());
        self.keys.get(idx).cloned()
    }

    fn clear(&mut self) {
        self.keys.clear();
        self.index.clear();
    }

    fn len(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_one_of_the_tracked_keys() {
        let mut policy = RandomPolicy::new();
        policy.add(&1);
        policy.add(&2);
        policy.add(&3);

        let victim = policy.evict_next().unwrap();
        assert!([1, 2, 3].contains(&victim));
    }

    #[test]
    fn empty_policy_evicts_nothing() {
        let policy: RandomPolicy<i32> = RandomPolicy::new();
        assert_eq!(policy.evict_next(), None);
    }

    #[test]
    fn swap_remove_keeps_index_consistent() {
        let mut policy = RandomPolicy::new();
        policy.add(&1);
        policy.add(&2);
        policy.add(&3);
        policy.remove(&1);

        assert_eq!(policy.len(), 2);
        for _ in 0..20 {
            let victim = policy.evict_next().unwrap();
            assert_ne!(victim, 1);
        }
    }
}
