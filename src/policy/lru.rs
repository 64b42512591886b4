//! Least-recently-used eviction: every access moves a key to the most-recent end, so
//! eviction picks the key that has gone longest untouched.

use super::list::IntrusiveList;
use super::{Admission, ReplacementPolicy};

#[derive(Default)]
pub struct LruPolicy<K> {
    order: IntrusiveList<K>,
}

impl<K: std::hash::Hash + Eq + Clone> LruPolicy<K> {
    pub fn new() -> Self {
        Self {
            order: IntrusiveList::new(),
        }
    }
}

impl<K: std::hash::Hash + Eq + Clone + Send> ReplacementPolicy<K> for LruPolicy<K> {
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
        self.order.back().cloned()
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
    fn evicts_least_recently_touched() {
        let mut policy = LruPolicy::new();
        policy.add(&1);
        policy.add(&2);
        policy.add(&3);
        policy.touch(&1);

        assert_eq!(policy.evict_next(), Some(2));
    }

    #[test]
    fn touching_the_only_entry_is_stable() {
        let mut policy = LruPolicy::new();
        policy.add(&1);
        policy.touch(&1);
        assert_eq!(policy.evict_next(), Some(1));
    }
}
