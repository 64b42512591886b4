//! Most-recently-used eviction: the inverse of LRU. Useful for access patterns that scan
//! a dataset once, where the just-touched entry is the least likely to be needed again.

use super::list::IntrusiveList;
use super::{Admission, ReplacementPolicy};

#[derive(Default)]
pub struct MruPolicy<K> {
    order: IntrusiveList<K>,
}

impl<K: std::hash::Hash + Eq + Clone> MruPolicy<K> {
    pub fn new() -> Self {
        Self {
            order: IntrusiveList::new(),
        }
    }
}

impl<K: std::hash::Hash + Eq + Clone + Send> ReplacementPolicy<K> for MruPolicy<K> {
    fn add(&mut self, key: &K) {
        if self.order.contains(key) {
            self.order.move_to_front(key);
        } else {
            self.order.push_front(key.clone());
        }
    }

    fn replace(&mut self, key: &K) -> Admission {
        self.order.move_to_front(key);
        Admission::RetainNew
    }

    fn remove(&mut self, key: &K) {
        self.order.remove(key);
    }

    fn touch(&mut self, key: &K) {
        self.order.move_to_front(key);
    }

    fn evict_next(&self) -> Option<K> {
        // The most recently touched key is evicted first.
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
    fn evicts_most_recently_touched() {
        let mut policy = MruPolicy::new();
        policy.add(&1);
        policy.add(&2);
        policy.add(&3);
        policy.touch(&1);

        assert_eq!(policy.evict_next(), Some(1));
    }
}
