//! The synchronized variant: a [`crate::store::MemoryStore`] behind one
//! `parking_lot::Mutex`, for callers that need `Send + Sync` without changing any of the
//! store's own contracts. Each operation takes and releases the lock once; there is no
//! cross-operation atomicity beyond what `MemoryStore` itself already guarantees within a
//! single call.

use std::hash::Hash;

use parking_lot::Mutex;

use crate::attribute::AttributeMap;
use crate::entry::Entry;
use crate::error::StoreResult;
use crate::policy::ReplacementPolicy;
use crate::store::{MemoryStore, PutOutcome};

pub struct SyncStore<K, V, P> {
    inner: Mutex<MemoryStore<K, V, P>>,
}

impl<K, V, P> SyncStore<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Clone,
    P: ReplacementPolicy<K>,
{
    pub fn new(store: MemoryStore<K, V, P>) -> Self {
        Self { inner: Mutex::new(store) }
    }

    pub fn put(&self, key: K, value: V, attrs: AttributeMap, absent_only: bool) -> StoreResult<PutOutcome<K, V>> {
        self.inner.lock().put(key, value, attrs, absent_only)
    }

    pub fn put_all(&self, entries: impl IntoIterator<Item = (K, V, AttributeMap)>) -> StoreResult<Vec<PutOutcome<K, V>>> {
        self.inner.lock().put_all(entries)
    }

    pub fn get(&self, key: &K) -> Option<Entry<K, V>> {
        self.inner.lock().get(key)
    }

    pub fn peek(&self, key: &K) -> Option<Entry<K, V>> {
        self.inner.lock().peek(key)
    }

    pub fn remove(&self, key: &K) -> StoreResult<Option<Entry<K, V>>> {
        self.inner.lock().remove(key)
    }

    pub fn remove_if(&self, key: &K, predicate: impl FnOnce(&V) -> bool) -> StoreResult<Option<Entry<K, V>>> {
        self.inner.lock().remove_if(key, predicate)
    }

    pub fn remove_all(&self, keys: impl IntoIterator<Item = K>) -> StoreResult<Vec<Entry<K, V>>> {
        self.inner.lock().remove_all(keys)
    }

    pub fn clear(&self) -> StoreResult<Vec<Entry<K, V>>> {
        self.inner.lock().clear()
    }

    pub fn replace(&self, key: K, expected: Option<V>, new_value: V, attrs: AttributeMap) -> StoreResult<bool>
    where
        V: PartialEq,
    {
        self.inner.lock().replace(key, expected, new_value, attrs)
    }

    pub fn trim(&self) -> StoreResult<Vec<Entry<K, V>>> {
        self.inner.lock().trim()
    }

    pub fn start(&self) -> StoreResult<()> {
        self.inner.lock().start()
    }

    pub fn shutdown(&self) {
        self.inner.lock().shutdown();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn volume(&self) -> u64 {
        self.inner.lock().volume()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.lock().contains_key(key)
    }
}
