//! The immutable key/value/attributes triple stored by the [`crate::store::MemoryStore`].

use std::hash::{Hash, Hasher};

use crate::attribute::{Attribute, AttributeMap};

/// An immutable cache entry.
///
/// Equality and hashing follow the key-value-pair convention: two entries are equal iff
/// their keys and values are equal. Attribute contents never participate in either
/// (they are bookkeeping, not identity).
#[derive(Clone)]
pub struct Entry<K, V> {
    key: K,
    value: V,
    attributes: AttributeMap,
}

impl<K, V> Entry<K, V> {
    pub fn new(key: K, value: V, attributes: AttributeMap) -> Self {
        Self {
            key,
            value,
            attributes,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }

    /// Convenience accessor delegating to the entry's attribute map.
    pub fn attribute<T: Clone + Send + Sync + 'static>(&self, attr: &Attribute<T>) -> T {
        self.attributes.get(attr)
    }

    pub fn into_key_value(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for Entry<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl<K: Eq, V: Eq> Eq for Entry<K, V> {}

impl<K: Hash, V: Hash> Hash for Entry<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.value.hash(state);
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("attributes_len", &self.attributes.len())
            .finish()
    }
}

// Attributes are type-erased (`Box<dyn Any>` under the hood) and have no generic
// serialization story, so a round-tripped entry carries only its key and value, enough
// for a point-in-time snapshot, not a durability format.
#[cfg(feature = "serde")]
impl<K: serde::Serialize, V: serde::Serialize> serde::Serialize for Entry<K, V> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.key, &self.value).serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, K: serde::Deserialize<'de>, V: serde::Deserialize<'de>> serde::Deserialize<'de> for Entry<K, V> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (key, value) = <(K, V)>::deserialize(deserializer)?;
        Ok(Entry::new(key, value, AttributeMap::new()))
    }
}
