//! The collaborator responsible for turning caller-supplied attributes into the
//! attribute map actually stored on an [`crate::entry::Entry`].

use crate::attribute::{AttributeMap, HITS, SIZE, TIMESTAMP};

/// Computes the attribute map an entry carries, at creation, update, and read-hit time.
///
/// A store is always constructed with one (see [`crate::builder::StoreBuilder`]);
/// [`DefaultAttributeService`] is the default and maintains `SIZE`/`TIMESTAMP`/`HITS`.
pub trait AttributeService<K, V>: Send + Sync {
    fn create(&self, key: &K, value: &V, supplied: AttributeMap) -> AttributeMap;

    fn update(&self, key: &K, value: &V, supplied: AttributeMap, previous: &AttributeMap) -> AttributeMap;

    /// Called on a read hit; mutates the entry's own map in place (e.g. bumping `HITS`).
    fn access(&self, attrs: &mut AttributeMap);
}

/// Sets `SIZE` from the supplied attributes (or the descriptor default of 1), bumps
/// `TIMESTAMP` on create/update, and bumps `HITS` on access.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAttributeService {
    clock: LogicalClock,
}

/// A monotonically increasing counter standing in for wall-clock time, so `TIMESTAMP`
/// ordering is deterministic in tests without depending on system clock resolution.
#[derive(Debug, Default, Clone, Copy)]
struct LogicalClock;

impl LogicalClock {
    fn tick(&self) -> i64 {
        use std::sync::atomic::{AtomicI64, Ordering};
        static TICKS: AtomicI64 = AtomicI64::new(0);
        TICKS.fetch_add(1, Ordering::Relaxed)
    }
}

impl<K, V> AttributeService<K, V> for DefaultAttributeService {
    fn create(&self, _key: &K, _value: &V, mut supplied: AttributeMap) -> AttributeMap {
        if !supplied.contains(&*SIZE) {
            supplied.put(&*SIZE, SIZE.default()).expect("default size is always valid");
        }
        supplied
            .put(&*TIMESTAMP, self.clock.tick())
            .expect("timestamp attribute accepts any value");
        supplied
    }

    fn update(&self, key: &K, value: &V, supplied: AttributeMap, previous: &AttributeMap) -> AttributeMap {
        let mut attrs = self.create(key, value, supplied);
        // Preserve accumulated hits across an overwrite unless the caller explicitly
        // supplied a new value for HITS.
        if !attrs.contains(&*HITS) {
            let carried = previous.get(&*HITS);
            attrs.put(&*HITS, carried).expect("hits attribute accepts any non-negative value");
        }
        attrs
    }

    fn access(&self, attrs: &mut AttributeMap) {
        let hits = attrs.get(&*HITS) + 1;
        attrs.put(&*HITS, hits).expect("hits attribute accepts any non-negative value");
        attrs
            .put(&*TIMESTAMP, self.clock.tick())
            .expect("timestamp attribute accepts any value");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_sets_default_size_and_a_timestamp() {
        let svc = DefaultAttributeService::default();
        let attrs = AttributeService::<&str, i32>::create(&svc, &"k", &1, AttributeMap::new());
        assert_eq!(attrs.get(&*SIZE), 1);
        assert!(attrs.contains(&*TIMESTAMP));
    }

    #[test]
    fn update_carries_hits_forward() {
        let svc = DefaultAttributeService::default();
        let mut previous = AttributeMap::new();
        previous.put(&*HITS, 5).unwrap();

        let attrs = AttributeService::<&str, i32>::update(&svc, &"k", &1, AttributeMap::new(), &previous);
        assert_eq!(attrs.get(&*HITS), 5);
    }

    #[test]
    fn access_bumps_hits() {
        let svc = DefaultAttributeService::default();
        let mut attrs = AttributeMap::new();
        AttributeService::<&str, i32>::access(&svc, &mut attrs);
        AttributeService::<&str, i32>::access(&svc, &mut attrs);
        assert_eq!(attrs.get(&*HITS), 2);
    }
}
