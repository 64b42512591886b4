//! Typed keyed metadata attached to cache entries.
//!
//! An [`Attribute<T>`] is a process-wide descriptor: two attributes with the same name
//! and type are still distinct unless they are literally the same descriptor (identity,
//! not structural equality). An [`AttributeMap`] holds zero or more values keyed by such
//! descriptors, falling back to each descriptor's default when a slot was never written.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::AttributeError;

static NEXT_ATTRIBUTE_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque identity for an [`Attribute`], assigned once per descriptor at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeId(u64);

struct Inner<T> {
    id: AttributeId,
    name: &'static str,
    default: T,
    is_valid: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

/// A typed, process-wide descriptor for a slot of per-entry metadata.
///
/// Equality and hashing are by identity (`id`), never by name or default. Two
/// `Attribute<i64>` values named `"size"` are different attributes unless they are
/// clones of the same descriptor.
pub struct Attribute<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Attribute<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for Attribute<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl<T> Eq for Attribute<T> {}

impl<T> std::hash::Hash for Attribute<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl<T> fmt::Debug for Attribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Attribute<T> {
    /// Creates a new attribute descriptor with a default value and a validity predicate.
    ///
    /// `is_valid` is consulted by [`AttributeMap::put`] before a value is accepted.
    pub fn new(name: &'static str, default: T, is_valid: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        let id = AttributeId(NEXT_ATTRIBUTE_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            inner: Arc::new(Inner {
                id,
                name,
                default,
                is_valid: Box::new(is_valid),
            }),
        }
    }

    /// Creates a new attribute descriptor that accepts any value.
    pub fn unconstrained(name: &'static str, default: T) -> Self {
        Self::new(name, default, |_| true)
    }

    pub fn id(&self) -> AttributeId {
        self.inner.id
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn default(&self) -> T {
        self.inner.default.clone()
    }

    pub fn is_valid(&self, value: &T) -> bool {
        (self.inner.is_valid)(value)
    }
}

/// A boxed attribute value that knows how to clone itself despite being type-erased.
trait ErasedValue: Any + Send + Sync {
    fn clone_boxed(&self) -> Box<dyn ErasedValue>;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Clone + Send + Sync + 'static> ErasedValue for T {
    fn clone_boxed(&self) -> Box<dyn ErasedValue> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Type-erased per-entry metadata map.
///
/// Constructing an empty map (`AttributeMap::new`) does not allocate, so callers who
/// don't supply attributes get a map that's already as cheap as a shared static singleton
/// would be (see DESIGN.md for why a literal `'static` singleton was not used instead).
#[derive(Default)]
pub struct AttributeMap {
    values: HashMap<AttributeId, Box<dyn ErasedValue>>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Returns the stored value, or the attribute's default if unset.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, attr: &Attribute<T>) -> T {
        self.get_ref(attr).cloned().unwrap_or_else(|| attr.default())
    }

    /// Returns a reference to the stored value, or `None` if unset.
    pub fn get_ref<T: Send + Sync + 'static>(&self, attr: &Attribute<T>) -> Option<&T> {
        self.values
            .get(&attr.id())
            .map(|boxed| boxed.as_any().downcast_ref::<T>().expect("attribute id/type mismatch"))
    }

    /// Validates and stores a value, replacing any previous one.
    pub fn put<T: Clone + Send + Sync + 'static>(
        &mut self,
        attr: &Attribute<T>,
        value: T,
    ) -> Result<(), AttributeError> {
        if !attr.is_valid(&value) {
            return Err(AttributeError::InvalidValue {
                attribute: attr.name(),
            });
        }
        self.values.insert(attr.id(), Box::new(value) as Box<dyn ErasedValue>);
        Ok(())
    }

    pub fn contains<T: Send + Sync + 'static>(&self, attr: &Attribute<T>) -> bool {
        self.values.contains_key(&attr.id())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Identifiers of every attribute currently populated, for introspection.
    pub fn attribute_ids(&self) -> impl Iterator<Item = AttributeId> + '_ {
        self.values.keys().copied()
    }
}

impl Clone for AttributeMap {
    fn clone(&self) -> Self {
        let values = self
            .values
            .iter()
            .map(|(id, value)| (*id, value.clone_boxed()))
            .collect();
        Self { values }
    }
}

/// Well-known attributes the core store itself reads and writes.
pub static SIZE: Lazy<Attribute<i64>> = Lazy::new(|| Attribute::new("size", 1, |v| *v >= 0));
pub static HITS: Lazy<Attribute<i64>> = Lazy::new(|| Attribute::new("hits", 0, |v| *v >= 0));
pub static COST: Lazy<Attribute<f64>> = Lazy::new(|| Attribute::new("cost", 0.0, |v| v.is_finite()));
pub static TIMESTAMP: Lazy<Attribute<i64>> = Lazy::new(|| Attribute::new("timestamp", 0, |_| true));
