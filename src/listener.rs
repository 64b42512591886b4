//! Before/after event channel. Listeners are fire-and-forget observers: a panic inside
//! one is caught and logged, never allowed to affect store invariants or propagate past
//! the store boundary.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::entry::Entry;

/// Identifies which public operation is about to run, for listeners that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Put,
    Remove,
    Replace,
    Clear,
}

/// Fired immediately before a mutation is applied. `key` is `None` for whole-store
/// operations such as `clear` that are not keyed to a single entry.
pub struct BeforeEvent<'a, K, V> {
    pub operation: OperationKind,
    pub key: Option<&'a K>,
    pub previous: Option<&'a Entry<K, V>>,
}

/// Fired after a mutation completes, carrying everything that changed.
pub struct AfterEvent<K, V> {
    pub operation: OperationKind,
    pub previous: Option<Entry<K, V>>,
    pub new_entry: Option<Entry<K, V>>,
    pub evicted: Vec<Entry<K, V>>,
}

pub trait Listener<K, V>: Send + Sync {
    fn before(&self, _event: &BeforeEvent<'_, K, V>) {}

    fn after(&self, _event: &AfterEvent<K, V>) {}
}

/// Invokes a listener callback, catching and logging any panic so the store's own
/// invariants are never put at risk by observer code.
pub(crate) fn notify_before<K, V>(listener: &dyn Listener<K, V>, event: &BeforeEvent<'_, K, V>) {
    let result = catch_unwind(AssertUnwindSafe(|| listener.before(event)));
    if result.is_err() {
        tracing::error!(target: "avila_store", "listener panicked in before()");
    }
}

pub(crate) fn notify_after<K, V>(listener: &dyn Listener<K, V>, event: &AfterEvent<K, V>) {
    let result = catch_unwind(AssertUnwindSafe(|| listener.after(event)));
    if result.is_err() {
        tracing::error!(target: "avila_store", "listener panicked in after()");
    }
}
