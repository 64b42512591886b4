//! The keyed associative store: a `HashMap<K, Entry<K, V>>` wrapped in capacity
//! enforcement, a pluggable replacement policy, and the collaborator hooks (attribute
//! service, exception service, listener, evictor) that decide *how* each mutation plays
//! out.

use std::collections::HashMap;
use std::hash::Hash;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::attribute::{AttributeMap, SIZE};
use crate::attribute_service::{AttributeService, DefaultAttributeService};
use crate::entry::Entry;
use crate::error::{ExceptionService, StoreError, StoreResult, TracingExceptionService};
use crate::listener::{AfterEvent, BeforeEvent, Listener, OperationKind};
use crate::policy::{Admission, Dependency, PolicyDependencies, ReplacementPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    NotStarted,
    Started,
    Shutdown,
    Poisoned,
}

/// The result of a `put`: what was there before, what's there now, and anything the
/// resulting trim evicted.
#[derive(Debug)]
pub struct PutOutcome<K, V> {
    pub previous: Option<Entry<K, V>>,
    pub new_entry: Option<Entry<K, V>>,
    pub evicted: Vec<Entry<K, V>>,
}

/// A custom eviction strategy consulted by `trim()` in place of the default
/// policy-driven (or hash-map-order) loop.
pub trait Evictor<K, V>: Send + Sync {
    fn evict(&self, view: &mut EvictorView<'_, K, V>);
}

/// The narrow surface `trim()` exposes to a custom [`Evictor`]: current budgets plus
/// exactly two write operations. Everything else about the store is inaccessible through
/// this type, by construction rather than by convention.
trait EvictorOps<K, V> {
    fn size(&self) -> usize;
    fn max_size(&self) -> Option<usize>;
    fn volume(&self) -> u64;
    fn max_volume(&self) -> Option<u64>;
    fn evict_one(&mut self) -> Option<Entry<K, V>>;
    fn snapshot(&self) -> Vec<Entry<K, V>>;
    fn evict_keys(&mut self, keys: &[K]) -> Vec<Entry<K, V>>;
}

pub struct EvictorView<'a, K, V> {
    ops: &'a mut dyn EvictorOps<K, V>,
}

impl<'a, K, V> EvictorView<'a, K, V> {
    pub fn size(&self) -> usize {
        self.ops.size()
    }

    pub fn max_size(&self) -> Option<usize> {
        self.ops.max_size()
    }

    pub fn volume(&self) -> u64 {
        self.ops.volume()
    }

    pub fn max_volume(&self) -> Option<u64> {
        self.ops.max_volume()
    }

    /// Shrinks the store to (or by, for a negative target) an entry count, evicting via
    /// the policy/fallback order when no comparator is given, or by ascending comparator
    /// order otherwise.
    pub fn trim_to_size(
        &mut self,
        target: i64,
        comparator: Option<&dyn Fn(&Entry<K, V>, &Entry<K, V>) -> std::cmp::Ordering>,
    ) -> Vec<Entry<K, V>> {
        let current = self.ops.size() as i64;
        let count = if target >= 0 {
            (current - target).max(0) as usize
        } else if target == i64::MIN {
            current as usize
        } else {
            (-target).min(current) as usize
        };
        self.evict_count(count, comparator)
    }

    /// Shrinks the store to (or by, for a negative target) a volume, evicting via the
    /// policy/fallback order when no comparator is given, or by ascending comparator
    /// order otherwise.
    pub fn trim_to_volume(
        &mut self,
        target: i64,
        comparator: Option<&dyn Fn(&Entry<K, V>, &Entry<K, V>) -> std::cmp::Ordering>,
    ) -> Vec<Entry<K, V>> {
        let current = self.ops.volume() as i64;
        let floor = if target >= 0 {
            target
        } else if target == i64::MIN {
            0
        } else {
            current + target
        }
        .max(0) as u64;

        match comparator {
            None => {
                let mut evicted = Vec::new();
                while self.ops.volume() > floor {
                    match self.ops.evict_one() {
                        Some(entry) => evicted.push(entry),
                        None => break,
                    }
                }
                evicted
            }
            Some(cmp) => {
                let mut snapshot = self.ops.snapshot();
                snapshot.sort_by(|a, b| cmp(a, b));
                let mut evicted = Vec::new();
                for entry in snapshot {
                    if self.ops.volume() <= floor {
                        break;
                    }
                    evicted.extend(self.ops.evict_keys(std::slice::from_ref(entry.key())));
                }
                evicted
            }
        }
    }

    fn evict_count(
        &mut self,
        count: usize,
        comparator: Option<&dyn Fn(&Entry<K, V>, &Entry<K, V>) -> std::cmp::Ordering>,
    ) -> Vec<Entry<K, V>> {
        match comparator {
            None => {
                let mut evicted = Vec::with_capacity(count);
                for _ in 0..count {
                    match self.ops.evict_one() {
                        Some(entry) => evicted.push(entry),
                        None => break,
                    }
                }
                evicted
            }
            Some(cmp) => {
                let mut snapshot = self.ops.snapshot();
                snapshot.sort_by(|a, b| cmp(a, b));
                let keys: Vec<K> = snapshot
                    .into_iter()
                    .take(count)
                    .map(|entry| entry.into_key_value().0)
                    .collect();
                self.ops.evict_keys(&keys)
            }
        }
    }
}

/// A keyed, in-process cache enforcing optional count and byte-volume budgets,
/// cooperating with a pluggable [`ReplacementPolicy`] to decide what survives.
///
/// Construct one via [`crate::builder::StoreBuilder`], or [`MemoryStore::unbounded`] for
/// a capacity-free store with default collaborators.
pub struct MemoryStore<K, V, P> {
    map: HashMap<K, Entry<K, V>>,
    size: usize,
    max_size: Option<usize>,
    volume: u64,
    max_volume: Option<u64>,
    policy: Option<P>,
    is_cacheable: Option<Box<dyn Fn(&Entry<K, V>) -> bool + Send + Sync>>,
    evictor: Option<Box<dyn Evictor<K, V>>>,
    disabled: bool,
    lifecycle: Lifecycle,
    attribute_service: Box<dyn AttributeService<K, V>>,
    exception_service: Box<dyn ExceptionService<K, V>>,
    listener: Option<Box<dyn Listener<K, V>>>,
    scratch_evicted: Vec<Entry<K, V>>,
}

impl<K, V, P> EvictorOps<K, V> for MemoryStore<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Clone,
    P: ReplacementPolicy<K>,
{
    fn size(&self) -> usize {
        self.size
    }

    fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    fn volume(&self) -> u64 {
        self.volume
    }

    fn max_volume(&self) -> Option<u64> {
        self.max_volume
    }

    fn evict_one(&mut self) -> Option<Entry<K, V>> {
        match self.evict_one_checked() {
            Ok(entry) => {
                if let Some(entry) = &entry {
                    self.scratch_evicted.push(entry.clone());
                }
                entry
            }
            Err(_) => None,
        }
    }

    fn snapshot(&self) -> Vec<Entry<K, V>> {
        self.map.values().cloned().collect()
    }

    fn evict_keys(&mut self, keys: &[K]) -> Vec<Entry<K, V>> {
        let mut out = Vec::new();
        for key in keys {
            if let Some(removed) = self.remove_keyed(key) {
                if let Some(policy) = self.policy.as_mut() {
                    policy.remove(key);
                }
                self.scratch_evicted.push(removed.clone());
                out.push(removed);
            }
        }
        out
    }
}

impl<K, V, P> MemoryStore<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Clone,
    P: ReplacementPolicy<K>,
{
    pub(crate) fn from_parts(
        max_size: Option<usize>,
        max_volume: Option<u64>,
        policy: Option<P>,
        is_cacheable: Option<Box<dyn Fn(&Entry<K, V>) -> bool + Send + Sync>>,
        evictor: Option<Box<dyn Evictor<K, V>>>,
        disabled: bool,
        attribute_service: Box<dyn AttributeService<K, V>>,
        exception_service: Box<dyn ExceptionService<K, V>>,
        listener: Option<Box<dyn Listener<K, V>>>,
    ) -> Self {
        Self {
            map: HashMap::new(),
            size: 0,
            max_size,
            volume: 0,
            max_volume,
            policy,
            is_cacheable,
            evictor,
            disabled,
            lifecycle: Lifecycle::NotStarted,
            attribute_service,
            exception_service,
            listener,
            scratch_evicted: Vec::new(),
        }
    }

    /// A store with no capacity budget and default collaborators, convenient for tests
    /// and for callers that never need eviction.
    pub fn unbounded() -> Self
    where
        P: Default,
    {
        Self::from_parts(
            None,
            None,
            Some(P::default()),
            None,
            None,
            false,
            Box::new(DefaultAttributeService::default()),
            Box::new(TracingExceptionService),
            None,
        )
    }

    /// Starts an explicit-construction builder for this store, used in place of a
    /// dependency-injection container.
    pub fn builder() -> crate::builder::StoreBuilder<K, V, P> {
        crate::builder::StoreBuilder::new()
    }

    /// Freezes policy attribute-dependency declarations and marks the store started.
    /// A policy declaring the same attribute twice (hard or soft) poisons the store.
    pub fn start(&mut self) -> StoreResult<()> {
        if self.lifecycle != Lifecycle::NotStarted {
            return Ok(());
        }

        if let Some(policy) = self.policy.as_ref() {
            let mut registry = PolicyDependencies::new();
            for dependency in policy.dependencies() {
                let result = match dependency {
                    Dependency::Hard(id) => registry.hard(id),
                    Dependency::Soft(id) => registry.soft(id),
                };
                if let Err(err) = result {
                    self.lifecycle = Lifecycle::Poisoned;
                    tracing::error!(target: "avila_store", "policy declared the same attribute dependency twice");
                    return Err(err);
                }
            }
        }

        self.lifecycle = Lifecycle::Started;
        tracing::debug!(target: "avila_store", "store started");
        Ok(())
    }

    pub fn shutdown(&mut self) {
        self.lifecycle = Lifecycle::Shutdown;
        tracing::debug!(target: "avila_store", "store shut down");
    }

    pub fn is_started(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Started)
    }

    pub fn is_shutdown(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Shutdown)
    }

    pub fn is_poisoned(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Poisoned)
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }

    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    pub fn max_volume(&self) -> Option<u64> {
        self.max_volume
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub fn exception_service(&self) -> &dyn ExceptionService<K, V> {
        self.exception_service.as_ref()
    }

    /// A point-in-time copy of every live key/value pair, for callers that want to
    /// serialize the store's current contents. Not a durability format: attributes,
    /// the policy's internal ordering, and the lifecycle state are not captured.
    #[cfg(feature = "serde")]
    pub fn snapshot(&self) -> Vec<(K, V)>
    where
        K: serde::Serialize,
        V: serde::Serialize,
    {
        self.map
            .values()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Looks up an entry without touching its attributes or the policy's bookkeeping.
    pub fn peek(&self, key: &K) -> Option<Entry<K, V>> {
        self.map.get(key).cloned()
    }

    /// Looks up an entry, bumping its access attributes (`HITS`/`TIMESTAMP`) and the
    /// policy's recency/frequency tracking on a hit.
    pub fn get(&mut self, key: &K) -> Option<Entry<K, V>> {
        if self.lifecycle == Lifecycle::Poisoned {
            return None;
        }
        let entry = self.map.get_mut(key)?;
        self.attribute_service.access(entry.attributes_mut());
        let result = entry.clone();
        if let Some(policy) = self.policy.as_mut() {
            policy.touch(key);
        }
        Some(result)
    }

    pub fn put(&mut self, key: K, value: V, attrs: AttributeMap, absent_only: bool) -> StoreResult<PutOutcome<K, V>> {
        self.put_as(key, value, attrs, absent_only, OperationKind::Put)
    }

    /// Shared implementation behind `put` and `replace`; only the listener event token
    /// differs between the two public entry points.
    fn put_as(
        &mut self,
        key: K,
        value: V,
        attrs: AttributeMap,
        absent_only: bool,
        operation: OperationKind,
    ) -> StoreResult<PutOutcome<K, V>> {
        self.ensure_mutable()?;
        self.auto_start()?;

        let previous = self.map.get(&key).cloned();

        if self.disabled || (absent_only && previous.is_some()) {
            return Ok(PutOutcome {
                previous,
                new_entry: None,
                evicted: Vec::new(),
            });
        }

        self.notify_before(operation, Some(&key), previous.as_ref());

        let computed_attrs = match &previous {
            None => self.attribute_service.create(&key, &value, attrs),
            Some(prev) => self.attribute_service.update(&key, &value, attrs, prev.attributes()),
        };
        let new_entry = Entry::new(key.clone(), value, computed_attrs);

        let cacheable = self.evaluate_cacheable(&new_entry);

        let mut evicted = Vec::new();
        let mut stored_new = None;

        if !cacheable {
            tracing::debug!(target: "avila_store", "entry rejected by is_cacheable predicate");
        } else if let Some(mut policy) = self.policy.take() {
            let admission = if previous.is_some() {
                policy.replace(&key)
            } else {
                policy.add(&key);
                Admission::RetainNew
            };

            match admission {
                Admission::RetainNew => {
                    self.insert_entry(key.clone(), new_entry.clone());
                    stored_new = Some(new_entry.clone());
                }
                Admission::RetainPrevious => {
                    // The incoming entry is discarded; the previous one is left as-is.
                }
                Admission::RetainNeither => {
                    if let Some(removed) = self.remove_keyed(&key) {
                        evicted.push(removed);
                    }
                    policy.remove(&key);
                }
            }
            self.policy = Some(policy);
        } else {
            self.insert_entry(key.clone(), new_entry.clone());
            stored_new = Some(new_entry.clone());
        }

        let trimmed = self.trim()?;
        evicted.extend(trimmed);

        let outcome = PutOutcome {
            previous: previous.clone(),
            new_entry: stored_new.clone(),
            evicted: evicted.clone(),
        };

        self.notify_after(operation, previous, stored_new, evicted);

        Ok(outcome)
    }

    /// Applies `put` to each entry in iteration order, firing before/after listener
    /// events individually per entry (not once for the whole batch).
    pub fn put_all(
        &mut self,
        entries: impl IntoIterator<Item = (K, V, AttributeMap)>,
    ) -> StoreResult<Vec<PutOutcome<K, V>>> {
        self.ensure_mutable()?;
        let mut outcomes = Vec::new();
        for (key, value, attrs) in entries {
            outcomes.push(self.put(key, value, attrs, false)?);
        }
        Ok(outcomes)
    }

    pub fn remove(&mut self, key: &K) -> StoreResult<Option<Entry<K, V>>> {
        self.ensure_mutable()?;
        self.notify_before(OperationKind::Remove, Some(key), self.map.get(key));
        let removed = self.remove_keyed(key);
        if removed.is_some() {
            if let Some(policy) = self.policy.as_mut() {
                policy.remove(key);
            }
        }
        self.notify_after(OperationKind::Remove, removed.clone(), None, Vec::new());
        Ok(removed)
    }

    pub fn remove_if(&mut self, key: &K, predicate: impl FnOnce(&V) -> bool) -> StoreResult<Option<Entry<K, V>>> {
        self.ensure_mutable()?;
        let matches = self.map.get(key).map(|entry| predicate(entry.value())).unwrap_or(false);
        if matches {
            self.remove(key)
        } else {
            Ok(None)
        }
    }

    pub fn remove_all(&mut self, keys: impl IntoIterator<Item = K>) -> StoreResult<Vec<Entry<K, V>>> {
        self.ensure_mutable()?;
        let mut removed = Vec::new();
        for key in keys {
            if let Some(entry) = self.remove(&key)? {
                removed.push(entry);
            }
        }
        Ok(removed)
    }

    pub fn clear(&mut self) -> StoreResult<Vec<Entry<K, V>>> {
        self.ensure_mutable()?;
        self.notify_before(OperationKind::Clear, None, None);
        let drained: Vec<Entry<K, V>> = self.map.drain().map(|(_, entry)| entry).collect();
        self.size = 0;
        self.volume = 0;
        if let Some(policy) = self.policy.as_mut() {
            policy.clear();
        }
        self.notify_after(OperationKind::Clear, None, None, drained.clone());
        Ok(drained)
    }

    /// Compare-and-swap on value: succeeds (and performs the swap) iff `expected` is
    /// `None`, or is `Some` and equals the entry currently stored for `key`.
    pub fn replace(&mut self, key: K, expected: Option<V>, new_value: V, attrs: AttributeMap) -> StoreResult<bool>
    where
        V: PartialEq,
    {
        self.ensure_mutable()?;
        let current = self.map.get(&key).map(|entry| entry.value().clone());
        let matches = match (&expected, &current) {
            (Some(exp), Some(cur)) => exp == cur,
            (None, Some(_)) => true,
            (_, None) => false,
        };
        if !matches {
            return Ok(false);
        }
        self.put_as(key, new_value, attrs, false, OperationKind::Replace)?;
        Ok(true)
    }

    /// Evicts entries until both budgets are satisfied, returning whatever was evicted.
    pub fn trim(&mut self) -> StoreResult<Vec<Entry<K, V>>> {
        if !self.over_budget() {
            return Ok(Vec::new());
        }

        if self.evictor.is_none() {
            let mut evicted = Vec::new();
            while self.over_budget() {
                match self.evict_one_checked()? {
                    Some(entry) => evicted.push(entry),
                    None => break,
                }
            }
            return Ok(evicted);
        }

        let shrank_from = (self.size, self.volume);
        self.scratch_evicted.clear();

        let evictor = self.evictor.take().expect("checked is_none above");
        {
            let mut view = EvictorView { ops: self };
            evictor.evict(&mut view);
        }
        self.evictor = Some(evictor);

        let mut evicted = std::mem::take(&mut self.scratch_evicted);

        if (self.size, self.volume) == shrank_from {
            tracing::warn!(
                target: "avila_store",
                "custom evictor made no progress, falling back to a single default eviction"
            );
            if let Some(entry) = self.evict_one_checked()? {
                evicted.push(entry);
            }
        }

        Ok(evicted)
    }

    fn over_budget(&self) -> bool {
        self.max_size.map_or(false, |m| self.size > m) || self.max_volume.map_or(false, |m| self.volume > m)
    }

    fn ensure_mutable(&self) -> StoreResult<()> {
        match self.lifecycle {
            Lifecycle::Shutdown => Err(StoreError::AlreadyShutdown),
            Lifecycle::Poisoned => Err(StoreError::PolicyViolation("store is poisoned".to_string())),
            Lifecycle::NotStarted | Lifecycle::Started => Ok(()),
        }
    }

    fn auto_start(&mut self) -> StoreResult<()> {
        if self.lifecycle == Lifecycle::NotStarted {
            return self.start();
        }
        Ok(())
    }

    fn evaluate_cacheable(&self, entry: &Entry<K, V>) -> bool {
        match &self.is_cacheable {
            None => true,
            Some(predicate) => match catch_unwind(AssertUnwindSafe(|| predicate(entry))) {
                Ok(result) => result,
                Err(_) => {
                    self.exception_service
                        .fatal("is_cacheable predicate panicked; treating entry as not cacheable");
                    false
                }
            },
        }
    }

    /// Physically removes `key` from the map and updates size/volume. Does not touch the
    /// policy; callers decide whether and how to inform it.
    fn remove_keyed(&mut self, key: &K) -> Option<Entry<K, V>> {
        let removed = self.map.remove(key)?;
        let contribution = removed.attribute(&*SIZE).max(0) as u64;
        self.volume = self.volume.saturating_sub(contribution);
        self.size = self.map.len();
        Some(removed)
    }

    fn insert_entry(&mut self, key: K, entry: Entry<K, V>) {
        let contribution = entry.attribute(&*SIZE).max(0) as u64;
        if let Some(old) = self.map.insert(key, entry) {
            let old_contribution = old.attribute(&*SIZE).max(0) as u64;
            self.volume = self.volume.saturating_sub(old_contribution);
        }
        self.volume += contribution;
        self.size = self.map.len();
    }

    /// Picks a victim (policy-driven, or hash-map order with no policy installed) and
    /// removes it. A policy handing back a key the store doesn't hold poisons the store.
    fn evict_one_checked(&mut self) -> StoreResult<Option<Entry<K, V>>> {
        let key = match self.policy.as_ref() {
            Some(policy) => policy.evict_next(),
            None => self.map.keys().next().cloned(),
        };
        let Some(key) = key else {
            return Ok(None);
        };
        match self.remove_keyed(&key) {
            Some(removed) => {
                if let Some(policy) = self.policy.as_mut() {
                    policy.remove(&key);
                }
                tracing::debug!(target: "avila_store", "evicted an entry to satisfy capacity budget");
                Ok(Some(removed))
            }
            None => {
                self.lifecycle = Lifecycle::Poisoned;
                tracing::error!(target: "avila_store", "evict_next returned a key the store does not hold");
                Err(StoreError::PolicyViolation(
                    "evict_next returned a key the store does not hold".to_string(),
                ))
            }
        }
    }

    fn notify_before(&self, operation: OperationKind, key: Option<&K>, previous: Option<&Entry<K, V>>) {
        if let Some(listener) = &self.listener {
            let event = BeforeEvent { operation, key, previous };
            crate::listener::notify_before(listener.as_ref(), &event);
        }
    }

    fn notify_after(
        &self,
        operation: OperationKind,
        previous: Option<Entry<K, V>>,
        new_entry: Option<Entry<K, V>>,
        evicted: Vec<Entry<K, V>>,
    ) {
        if let Some(listener) = &self.listener {
            let event = AfterEvent {
                operation,
                previous,
                new_entry,
                evicted,
            };
            crate::listener::notify_after(listener.as_ref(), &event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{FifoPolicy, LruPolicy, UnlimitedPolicy};

    fn put_ok<K: Eq + Hash + Clone, V: Clone, P: ReplacementPolicy<K>>(
        store: &mut MemoryStore<K, V, P>,
        key: K,
        value: V,
    ) -> PutOutcome<K, V> {
        store.put(key, value, AttributeMap::new(), false).unwrap()
    }

    #[test]
    fn capacity_by_count_evicts_oldest_under_fifo() {
        let mut store: MemoryStore<i32, &str, FifoPolicy<i32>> = MemoryStore::from_parts(
            Some(3),
            None,
            Some(FifoPolicy::new()),
            None,
            None,
            false,
            Box::new(DefaultAttributeService::default()),
            Box::new(TracingExceptionService),
            None,
        );

        put_ok(&mut store, 1, "a");
        put_ok(&mut store, 2, "b");
        put_ok(&mut store, 3, "c");
        let outcome = put_ok(&mut store, 4, "d");

        assert_eq!(store.len(), 3);
        assert!(store.contains_key(&2));
        assert!(store.contains_key(&3));
        assert!(store.contains_key(&4));
        assert!(!store.contains_key(&1));
        assert_eq!(outcome.evicted.len(), 1);
        assert_eq!(*outcome.evicted[0].value(), "a");
    }

    #[test]
    fn lru_touch_protects_an_entry_from_eviction() {
        let mut store: MemoryStore<i32, &str, LruPolicy<i32>> = MemoryStore::from_parts(
            Some(3),
            None,
            Some(LruPolicy::new()),
            None,
            None,
            false,
            Box::new(DefaultAttributeService::default()),
            Box::new(TracingExceptionService),
            None,
        );

        put_ok(&mut store, 1, "a");
        put_ok(&mut store, 2, "b");
        put_ok(&mut store, 3, "c");
        store.get(&1);
        let outcome = put_ok(&mut store, 4, "d");

        assert_eq!(outcome.evicted.len(), 1);
        assert_eq!(*outcome.evicted[0].value(), "b");
        assert!(store.contains_key(&1));
        assert!(store.contains_key(&3));
        assert!(store.contains_key(&4));
    }

    #[test]
    fn disabled_store_never_inserts() {
        let mut store: MemoryStore<i32, &str, UnlimitedPolicy<i32>> = MemoryStore::from_parts(
            None,
            None,
            Some(UnlimitedPolicy::new()),
            None,
            None,
            true,
            Box::new(DefaultAttributeService::default()),
            Box::new(TracingExceptionService),
            None,
        );

        let outcome = put_ok(&mut store, 1, "a");
        assert!(outcome.new_entry.is_none());
        assert_eq!(store.len(), 0);
        assert_eq!(store.get(&1), None);
    }

    #[test]
    fn replace_contract_requires_matching_expected_value() {
        let mut store: MemoryStore<i32, &str, UnlimitedPolicy<i32>> = MemoryStore::unbounded();
        put_ok(&mut store, 1, "v");

        assert!(!store.replace(1, Some("wrong"), "new", AttributeMap::new()).unwrap());
        assert_eq!(*store.peek(&1).unwrap().value(), "v");

        assert!(store.replace(1, Some("v"), "new", AttributeMap::new()).unwrap());
        assert_eq!(*store.peek(&1).unwrap().value(), "new");
    }

    #[test]
    fn replace_notifies_listeners_with_its_own_operation_kind() {
        use std::sync::{Arc, Mutex};

        struct RecordingListener(Arc<Mutex<Vec<OperationKind>>>);
        impl Listener<i32, &'static str> for RecordingListener {
            fn after(&self, event: &AfterEvent<i32, &'static str>) {
                self.0.lock().unwrap().push(event.operation);
            }
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut store: MemoryStore<i32, &str, UnlimitedPolicy<i32>> = MemoryStore::from_parts(
            None,
            None,
            Some(UnlimitedPolicy::new()),
            None,
            None,
            false,
            Box::new(DefaultAttributeService::default()),
            Box::new(TracingExceptionService),
            Some(Box::new(RecordingListener(Arc::clone(&seen)))),
        );

        put_ok(&mut store, 1, "v");
        assert!(store.replace(1, Some("v"), "new", AttributeMap::new()).unwrap());

        assert_eq!(*seen.lock().unwrap(), vec![OperationKind::Put, OperationKind::Replace]);
    }

    #[test]
    fn clear_empties_map_size_and_volume() {
        let mut store: MemoryStore<i32, &str, UnlimitedPolicy<i32>> = MemoryStore::unbounded();
        put_ok(&mut store, 1, "a");
        put_ok(&mut store, 2, "b");

        let drained = store.clear().unwrap();
        assert_eq!(drained.len(), 2);
        assert_eq!(store.len(), 0);
        assert_eq!(store.volume(), 0);
        assert_eq!(store.peek(&1), None);
    }

    #[test]
    fn mutating_after_shutdown_is_rejected() {
        let mut store: MemoryStore<i32, &str, UnlimitedPolicy<i32>> = MemoryStore::unbounded();
        store.shutdown();
        let result = store.put(1, "a", AttributeMap::new(), false);
        assert!(matches!(result, Err(StoreError::AlreadyShutdown)));
    }

    #[test]
    fn volume_budget_evicts_to_make_room() {
        let size_attr = &*SIZE;
        let mut store: MemoryStore<&str, &str, FifoPolicy<&str>> = MemoryStore::from_parts(
            None,
            Some(10),
            Some(FifoPolicy::new()),
            None,
            None,
            false,
            Box::new(DefaultAttributeService::default()),
            Box::new(TracingExceptionService),
            None,
        );

        for (key, value) in [("a", "a"), ("b", "b"), ("c", "c")] {
            let mut attrs = AttributeMap::new();
            attrs.put(size_attr, 4).unwrap();
            store.put(key, value, attrs, false).unwrap();
        }

        assert_eq!(store.len(), 2);
        assert_eq!(store.volume(), 8);
    }

    #[test]
    fn policy_declaring_the_same_dependency_twice_poisons_the_store_on_start() {
        use crate::attribute::SIZE;
        use crate::policy::Dependency;

        #[derive(Default)]
        struct BrokenPolicy;
        impl ReplacementPolicy<i32> for BrokenPolicy {
            fn add(&mut self, _key: &i32) {}
            fn replace(&mut self, _key: &i32) -> Admission {
                Admission::RetainNew
            }
            fn remove(&mut self, _key: &i32) {}
            fn touch(&mut self, _key: &i32) {}
            fn evict_next(&self) -> Option<i32> {
                None
            }
            fn clear(&mut self) {}
            fn len(&self) -> usize {
                0
            }
            fn dependencies(&self) -> Vec<Dependency> {
                vec![Dependency::Soft(SIZE.id()), Dependency::Hard(SIZE.id())]
            }
        }

        let mut store: MemoryStore<i32, &str, BrokenPolicy> = MemoryStore::unbounded();
        let result = store.put(1, "a", AttributeMap::new(), false);

        assert!(matches!(result, Err(StoreError::PolicyViolation(_))));
        assert!(store.is_poisoned());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_round_trips_live_pairs_through_json() {
        let mut store: MemoryStore<u32, String, UnlimitedPolicy<u32>> = MemoryStore::unbounded();
        put_ok(&mut store, 1, "a".to_string());
        put_ok(&mut store, 2, "b".to_string());

        let json = serde_json::to_string(&store.snapshot()).unwrap();
        let back: Vec<(u32, String)> = serde_json::from_str(&json).unwrap();

        assert_eq!(back.len(), 2);
        assert!(back.contains(&(1, "a".to_string())));
        assert!(back.contains(&(2, "b".to_string())));
    }
}
