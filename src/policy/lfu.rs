//! Least-frequently-used eviction, ties broken by insertion order (the entry that has
//! been around longest among equally-popular entries goes first).

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use super::{Admission, ReplacementPolicy};

#[derive(Default)]
pub struct LfuPolicy<K> {
    // (frequency, sequence, key) so BTreeSet orders by frequency then arrival.
    ranked: BTreeSet<(u64, u64, K)>,
    stats: HashMap<K, (u64, u64)>,
    next_seq: u64,
}

impl<K: Ord + Hash + Eq + Clone> LfuPolicy<K> {
    pub fn new() -> Self {
        Self {
            ranked: BTreeSet::new(),
            stats: HashMap::new(),
            next_seq: 0,
        }
    }

    fn bump(&mut self, key: &K) {
        let (freq, seq) = self
            .stats
            .get(key)
            .copied()
            .unwrap_or((0, self.next_seq));
        self.ranked.remove(&(freq, seq, key.clone()));
        let new_freq = freq + 1;
        self.ranked.insert((new_freq, seq, key.clone()));
        self.stats.insert(key.clone(), (new_freq, seq));
    }
}

impl<K: Ord + Hash + Eq + Clone + Send> ReplacementPolicy<K> for LfuPolicy<K> {
    fn add(&mut self, key: &K) {
        if self.stats.contains_key(key) {
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.stats.insert(key.clone(), (0, seq));
        self.ranked.insert((0, seq, key.clone()));
    }

    fn replace(&mut self, key: &K) -> Admission {
        self.bump(key);
        Admission::RetainNew
    }

    fn remove(&mut self, key: &K) {
        if let Some((freq, seq)) = self.stats.remove(key) {
            self.ranked.remove(&(freq, seq, key.clone()));
        }
    }

    fn touch(&mut self, key: &K) {
        self.bump(key);
    }

    fn evict_next(&self) -> Option<K> {
        self.ranked.iter().next().map(|(_, _, k)| k.clone())
    }

    fn clear(&mut self) {
        self.ranked.clear();
        self.stats.clear();
        self.next_seq = 0;
    }

    fn len(&self) -> usize {
        self.stats.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_frequently_touched() {
        let mut policy = LfuPolicy::new();
        policy.add(&1);
        policy.add(&2);
        policy.touch(&1);
        policy.touch(&1);
        policy.touch(&2);

        assert_eq!(policy.evict_next(), Some(2));
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut policy = LfuPolicy::new();
        policy.add(&1);
        policy.add(&2);

        assert_eq!(policy.evict_next(), Some(1));
    }
}
