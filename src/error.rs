//! Error taxonomy and the exception-handling hook consumed by the store.
//!
//! Follows the `thiserror`-derived enum + `Result<T>` alias pairing used throughout this
//! crate's service-facing collaborators.

use thiserror::Error;

/// Errors raised while validating or mutating an [`crate::attribute::AttributeMap`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("value rejected by attribute `{attribute}`'s validity predicate")]
    InvalidValue { attribute: &'static str },
}

/// Errors surfaced by [`crate::store::MemoryStore`]'s public operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("store has already been shut down")]
    AlreadyShutdown,

    #[error("replacement policy violated its contract: {0}")]
    PolicyViolation(String),

    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Error surfaced by a [`crate::loader::Loader`] on a cache miss.
#[derive(Debug, Error)]
pub enum LoadError<E> {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("loader failed: {0}")]
    Loader(E),
}

/// The external collaborator the store routes recoverable failures and fatal
/// contract violations through.
///
/// A store is always constructed with one (see [`crate::builder::StoreBuilder`]);
/// [`TracingExceptionService`] is the default and simply logs.
pub trait ExceptionService<K, V>: Send + Sync {
    /// A non-recoverable condition: the op is still completed as documented (treated as
    /// `false`/no-op), but the condition is worth surfacing loudly.
    fn fatal(&self, message: &str);

    /// A recoverable condition worth a log line but no special handling.
    fn warning(&self, message: &str);

    /// Called when a [`crate::loader::Loader`] returns an error. Returning `Some(value)`
    /// substitutes that value as if the loader had produced it directly; returning
    /// `None` propagates the original error to the caller.
    fn load_failed(&self, _key: &K, _message: &str) -> Option<V> {
        None
    }
}

/// Default [`ExceptionService`] that logs via `tracing` and never substitutes a value.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingExceptionService;

impl<K, V> ExceptionService<K, V> for TracingExceptionService {
    fn fatal(&self, message: &str) {
        tracing::error!(target: "avila_store", "{message}");
    }

    fn warning(&self, message: &str) {
        tracing::warn!(target: "avila_store", "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exception_service_defaults_do_not_substitute() {
        let svc = TracingExceptionService;
        let result: Option<i32> = ExceptionService::<&str, i32>::load_failed(&svc, &"k", "boom");
        assert_eq!(result, None);
    }
}
