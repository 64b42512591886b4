//! Clock (second-chance) eviction: an approximation of LRU that avoids moving entries on
//! every touch. Keys sit in a fixed ring with a reference bit each; a sweeping hand clears
//! bits as it passes and evicts the first key it finds already clear.
//!
//! `evict_next` only *selects* a victim, but the sweep that finds one clears reference
//! bits and advances the hand along the way, so the ring lives behind a `RefCell` to
//! satisfy the shared-reference signature [`super::ReplacementPolicy::evict_next`]
//! requires.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;

use super::{Admission, ReplacementPolicy};

struct Slot<K> {
    key: K,
    referenced: bool,
}

struct Ring<K> {
    slots: Vec<Option<Slot<K>>>,
    index: HashMap<K, usize>,
    hand: usize,
}

pub struct ClockPolicy<K> {
    ring: RefCell<Ring<K>>,
}

impl<K: Hash + Eq + Clone> Default for ClockPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone> ClockPolicy<K> {
    pub fn new() -> Self {
        Self {
            ring: RefCell::new(Ring {
                slots: Vec::new(),
                index: HashMap::new(),
                hand: 0,
            }),
        }
    }
}

impl<K: Hash + Eq + Clone + Send> ReplacementPolicy<K> for ClockPolicy<K> {
    fn add(&mut self, key: &K) {
        let ring = self.ring.get_mut();
        if ring.index.contains_key(key) {
            return;
        }
        let slot = Slot {
            key: key.clone(),
            referenced: true,
        };
        if let Some(free) = ring.slots.iter().position(|s| s.is_none()) {
            ring.slots[free] = Some(slot);
            ring.index.insert(key.clone(), free);
        } else {
            ring.slots.push(Some(slot));
            ring.index.insert(key.clone(), ring.slots.len() - 1);
        }
    }

    fn replace(&mut self, key: &K) -> Admission {
        self.touch(key);
        Admission::RetainNew
    }

    fn remove(&mut self, key: &K) {
        let ring = self.ring.get_mut();
        if let Some(slot) = ring.index.remove(key) {
            ring.slots[slot] = None;
        }
    }

    fn touch(&mut self, key: &K) {
        let ring = self.ring.get_mut();
        if let Some(&slot) = ring.index.get(key) {
            if let Some(s) = ring.slots[slot].as_mut() {
                s.referenced = true;
            }
        }
    }

    fn evict_next(&self) -> Option<K> {
        let mut ring = self.ring.borrow_mut();
        let len = ring.slots.len();
        if len == 0 {
            return None;
        }
        // Two full sweeps bound the search: a slot visited twice with its bit still clear
        // after the first pass is guaranteed to still be clear on the second.
        for _ in 0..2 * len {
            let slot = ring.hand;
            ring.hand = (ring.hand + 1) % len;
            let evict = match ring.slots[slot].as_mut() {
                Some(s) if s.referenced => {
                    s.referenced = false;
                    false
                }
                Some(_) => true,
                None => false,
            };
            if evict {
                return ring.slots[slot].as_ref().map(|s| s.key.clone());
            }
        }
        None
    }

    fn clear(&mut self) {
        let ring = self.ring.get_mut();
        ring.slots.clear();
        ring.index.clear();
        ring.hand = 0;
    }

    fn len(&self) -> usize {
        self.ring.borrow().index.len()
    }
}
