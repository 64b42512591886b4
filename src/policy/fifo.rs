//! First-in-first-out eviction: the oldest still-tracked key goes first, regardless of
//! how often or recently it was accessed.

use super::list::IntrusiveList;
use super::{Admission, ReplacementPolicy};

#[derive(Default)]
pub struct FifoPolicy<K> {
    order: IntrusiveList<K>,
}

impl<K: std::hash::Hash + Eq + Clone> FifoPolicy<K> {
    pub fn new() -> Self {
        Self {
            order: IntrusiveList::new(),
        }
    }
}

impl<K: std::hash::Hash + Eq + Clone + Send> ReplacementPolicy<K> for FifoPolicy<K> {
    fn add(&mut self, key: &K) {
        if !self.order.contains(key) {
            self.order.push_back(key.clone());
        }
    }

    fn replace(&mut self, _key: &K) -> Admission {
        // Overwriting an existing key does not reset its place in arrival order.
        Admission::RetainNew
    }

    fn remove(&mut self, key: &K) {
        self.order.remove(key);
    }

    fn touch(&mut self, _key: &K) {
        // Accesses never affect arrival order.
    }

    fn evict_next(&self) -> Option<K> {
        self.order.front().cloned()
    }

    fn clear(&mut self) {
        self.order.clear();
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_arrival_first() {
        let mut policy = FifoPolicy::new();
        policy.add(&1);
        policy.add(&2);
        policy.add(&3);
        policy.touch(&1); // touching must not change FIFO order

        assert_eq!(policy.evict_next(), Some(1));
    }

    #[test]
    fn removed_keys_are_not_evicted() {
        let mut policy = FifoPolicy::new();
        policy.add(&1);
        policy.add(&2);
        policy.remove(&1);

        assert_eq!(policy.evict_next(), Some(2));
        assert_eq!(policy.len(), 1);
    }
}
