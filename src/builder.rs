//! Explicit-construction builder for [`crate::store::MemoryStore`], replacing the
//! source system's dependency-injection container: every collaborator is supplied as a
//! builder method and validated once at `.build()`.

use std::hash::Hash;

use crate::attribute_service::{AttributeService, DefaultAttributeService};
use crate::entry::Entry;
use crate::error::{ExceptionService, StoreError, StoreResult, TracingExceptionService};
use crate::listener::Listener;
use crate::policy::ReplacementPolicy;
use crate::store::{Evictor, MemoryStore};

pub struct StoreBuilder<K, V, P> {
    max_size: Option<usize>,
    max_volume: Option<u64>,
    policy: Option<P>,
    is_cacheable: Option<Box<dyn Fn(&Entry<K, V>) -> bool + Send + Sync>>,
    evictor: Option<Box<dyn Evictor<K, V>>>,
    disabled: bool,
    attribute_service: Option<Box<dyn AttributeService<K, V>>>,
    exception_service: Option<Box<dyn ExceptionService<K, V>>>,
    listener: Option<Box<dyn Listener<K, V>>>,
}

impl<K, V, P> Default for StoreBuilder<K, V, P> {
    fn default() -> Self {
        Self {
            max_size: None,
            max_volume: None,
            policy: None,
            is_cacheable: None,
            evictor: None,
            disabled: false,
            attribute_service: None,
            exception_service: None,
            listener: None,
        }
    }
}

impl<K, V, P> StoreBuilder<K, V, P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn max_volume(mut self, max_volume: u64) -> Self {
        self.max_volume = Some(max_volume);
        self
    }

    pub fn policy(mut self, policy: P) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn is_cacheable(mut self, predicate: impl Fn(&Entry<K, V>) -> bool + Send + Sync + 'static) -> Self {
        self.is_cacheable = Some(Box::new(predicate));
        self
    }

    pub fn evictor(mut self, evictor: impl Evictor<K, V> + 'static) -> Self {
        self.evictor = Some(Box::new(evictor));
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn attribute_service(mut self, service: impl AttributeService<K, V> + 'static) -> Self {
        self.attribute_service = Some(Box::new(service));
        self
    }

    pub fn exception_service(mut self, service: impl ExceptionService<K, V> + 'static) -> Self {
        self.exception_service = Some(Box::new(service));
        self
    }

    pub fn listener(mut self, listener: impl Listener<K, V> + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Validates the accumulated configuration and constructs the store. A zero-valued
    /// `max_size` or `max_volume` is rejected: a budget of zero can never be satisfied by
    /// a non-empty entry and almost always signals a caller error rather than an
    /// intentional "always empty" cache.
    pub fn build(self) -> StoreResult<MemoryStore<K, V, P>>
    where
        K: Eq + Hash + Clone,
        V: Clone,
        P: ReplacementPolicy<K>,
    {
        if self.max_size == Some(0) {
            return Err(StoreError::InvalidArgument("max_size must be positive".to_string()));
        }
        if self.max_volume == Some(0) {
            return Err(StoreError::InvalidArgument("max_volume must be positive".to_string()));
        }

        Ok(MemoryStore::from_parts(
            self.max_size,
            self.max_volume,
            self.policy,
            self.is_cacheable,
            self.evictor,
            self.disabled,
            self.attribute_service
                .unwrap_or_else(|| Box::new(DefaultAttributeService::default())),
            self.exception_service.unwrap_or_else(|| Box::new(TracingExceptionService)),
            self.listener,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeMap;
    use crate::policy::FifoPolicy;

    #[test]
    fn zero_max_size_is_rejected() {
        let result: StoreResult<MemoryStore<i32, i32, FifoPolicy<i32>>> =
            StoreBuilder::new().max_size(0).policy(FifoPolicy::new()).build();
        assert!(matches!(result, Err(StoreError::InvalidArgument(_))));
    }

    #[test]
    fn builder_wires_a_working_store() {
        let mut store: MemoryStore<i32, &str, FifoPolicy<i32>> = StoreBuilder::new()
            .max_size(2)
            .policy(FifoPolicy::new())
            .build()
            .unwrap();

        store.put(1, "a", AttributeMap::new(), false).unwrap();
        store.put(2, "b", AttributeMap::new(), false).unwrap();
        store.put(3, "c", AttributeMap::new(), false).unwrap();

        assert_eq!(store.len(), 2);
        assert!(!store.contains_key(&1));
    }
}
