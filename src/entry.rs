use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use crate::hash::{hash_key, DefaultHashBuilder};

/// A key/value pair with the key's hash cached at construction.
///
/// Equality looks at the key alone; the cached hash and the value are ignored.
#[derive(Debug, Clone)]
pub struct Entry<K, V> {
    hash: u64,
    key: K,
    value: Option<V>,
}

impl<K: Hash, V> Entry<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self::with_hasher(key, Some(value), &DefaultHashBuilder::default())
    }

    /// An entry with no value, rendered as `Entry(key, None)`.
    pub fn key_only(key: K) -> Self {
        Self::with_hasher(key, None, &DefaultHashBuilder::default())
    }

    pub fn with_hasher<S: BuildHasher>(key: K, value: Option<V>, build: &S) -> Self {
        Self {
            hash: hash_key(build, &key),
            key,
            value,
        }
    }
}

impl<K, V> Entry<K, V> {
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<V> {
        self.value
    }

    /// Probe comparison used by lookups. Equal keys always share a hash, so
    /// the hash check only short-circuits mismatches.
    #[inline]
    pub(crate) fn matches<Q>(&self, hash: u64, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.hash == hash && self.key.borrow() == key
    }
}

impl<K: PartialEq, V> PartialEq for Entry<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Eq, V> Eq for Entry<K, V> {}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "Entry({}, {})", self.key, value),
            None => write!(f, "Entry({}, None)", self.key),
        }
    }
}
