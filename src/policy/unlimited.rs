//! The no-op policy: tracks nothing and never selects an eviction victim. Pairs with an
//! unbounded store (no count or volume budget) where capacity enforcement is meaningless.

use std::collections::HashSet;
use std::hash::Hash;

use super::{Admission, ReplacementPolicy};

#[derive(Default)]
pub struct UnlimitedPolicy<K> {
    // Only kept so `len`/`is_empty` are meaningful for diagnostics; eviction never
    // consults this.
    tracked: HashSet<K>,
}

impl<K: Hash + Eq> UnlimitedPolicy<K> {
    pub fn new() -> Self {
        Self {
            tracked: HashSet::new(),
        }
    }
}

impl<K: Hash + Eq + Clone + Send> ReplacementPolicy<K> for UnlimitedPolicy<K> {
    fn add(&mut self, key: &K) {
        self.tracked.insert(key.clone());
    }

    fn replace(&mut self, _key: &K) -> Admission {
        Admission::RetainNew
    }

    fn remove(&mut self, key: &K) {
        self.tracked.remove(key);
    }

    fn touch(&mut self, _key: &K) {}

    fn evict_next(&self) -> Option<K> {
        None
    }

    fn clear(&mut self) {
        self.tracked.clear();
    }

    fn len(&self) -> usize {
        self.tracked.len()
    }
}
