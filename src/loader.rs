//! Read-through value loading: on a miss, synchronously compute a value and insert it
//! through the normal put skeleton before returning it to the caller.

use crate::attribute::AttributeMap;
use crate::entry::Entry;
use crate::error::LoadError;
use crate::policy::ReplacementPolicy;
use crate::store::MemoryStore;

/// An external value producer consulted on a cache miss.
pub trait Loader<K, V, E>: Send + Sync {
    fn load(&self, key: &K, attrs: &AttributeMap) -> Result<Option<(V, AttributeMap)>, E>;
}

/// Wraps a [`MemoryStore`] with a [`Loader`], fabricating missing entries on `get`.
pub struct LoadingStore<K, V, P, L, E> {
    store: MemoryStore<K, V, P>,
    loader: L,
    _error: std::marker::PhantomData<E>,
}

impl<K, V, P, L, E> LoadingStore<K, V, P, L, E>
where
    K: std::hash::Hash + Eq + Clone,
    V: Clone,
    P: ReplacementPolicy<K>,
    L: Loader<K, V, E>,
{
    pub fn new(store: MemoryStore<K, V, P>, loader: L) -> Self {
        Self {
            store,
            loader,
            _error: std::marker::PhantomData,
        }
    }

    pub fn store(&self) -> &MemoryStore<K, V, P> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MemoryStore<K, V, P> {
        &mut self.store
    }

    /// Returns the cached entry, loading and inserting it on a miss.
    pub fn get(&mut self, key: &K) -> Result<Option<Entry<K, V>>, LoadError<E>> {
        if let Some(hit) = self.store.get(key) {
            return Ok(Some(hit));
        }

        match self.loader.load(key, &AttributeMap::new()) {
            Ok(Some((value, attrs))) => {
                let outcome = self.store.put(key.clone(), value, attrs, false)?;
                Ok(outcome.new_entry)
            }
            Ok(None) => Ok(None),
            Err(err) => {
                let substitute = self.store.exception_service().load_failed(key, "loader returned an error");
                match substitute {
                    Some(value) => {
                        let outcome = self.store.put(key.clone(), value, AttributeMap::new(), false)?;
                        Ok(outcome.new_entry)
                    }
                    None => Err(LoadError::Loader(err)),
                }
            }
        }
    }
}
