use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::ops::Index;

use log::{debug, trace};

use crate::entry::Entry;
use crate::error::{Error, KeyNotFound, Result};
use crate::hash::{hash_key, DefaultHashBuilder};

pub const DEFAULT_BUCKET_COUNT: usize = 10;

/// Chain of entries sharing a bucket index, oldest first.
pub type Bucket<K, V> = Vec<Entry<K, V>>;

/// Fixed-size separate-chaining hash table.
///
/// The bucket array is allocated once and never resized, so chains grow with
/// the load factor. Each key appears at most once across all buckets.
#[derive(Debug, Clone)]
pub struct Table<K, V, S = DefaultHashBuilder> {
    buckets: Vec<Bucket<K, V>>,
    hasher: S,
    len: usize,
}

impl<K: Hash + Eq, V> Table<K, V> {
    pub fn new() -> Self {
        Self::allocate(DEFAULT_BUCKET_COUNT, DefaultHashBuilder::default())
    }

    pub fn with_buckets(bucket_count: usize) -> Result<Self> {
        Self::with_buckets_and_hasher(bucket_count, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq, V> Default for Table<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Table<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub fn with_buckets_and_hasher(bucket_count: usize, hasher: S) -> Result<Self> {
        if bucket_count == 0 {
            return Err(Error::InvalidBucketCount(bucket_count));
        }
        Ok(Self::allocate(bucket_count, hasher))
    }

    fn allocate(bucket_count: usize, hasher: S) -> Self {
        debug!("Allocating table with {} buckets", bucket_count);
        Self {
            buckets: (0..bucket_count).map(|_| Bucket::new()).collect(),
            hasher,
            len: 0,
        }
    }

    #[inline]
    fn slot(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    /// Bucket that `key` routes to.
    pub fn bucket_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        self.slot(hash_key(&self.hasher, key))
    }

    /// Inserts `value` under `key`.
    ///
    /// An existing entry with an equal key is removed from its chain and the
    /// new entry appended, so an overwritten key moves to the end of its
    /// bucket.
    pub fn add(&mut self, key: K, value: V) {
        let entry = Entry::with_hasher(key, Some(value), &self.hasher);
        let index = self.slot(entry.hash());
        let bucket = &mut self.buckets[index];
        match bucket.iter().position(|existing| *existing == entry) {
            Some(position) => {
                bucket.remove(position);
                debug!("Overwriting entry at bucket {} position {}", index, position);
            }
            None => {
                self.len += 1;
                trace!("Appending entry to bucket {}", index);
            }
        }
        bucket.push(entry);
    }

    /// Returns the value stored under `key`, or [`KeyNotFound`] holding the
    /// key that missed.
    pub fn get<'k, Q>(&self, key: &'k Q) -> std::result::Result<&V, KeyNotFound<&'k Q>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = hash_key(&self.hasher, key);
        let index = self.slot(hash);
        trace!("Probing bucket {} for hash {:#018x}", index, hash);
        self.buckets[index]
            .iter()
            .find(|entry| entry.matches(hash, key))
            .and_then(Entry::value)
            .ok_or(KeyNotFound(key))
    }

    /// Same as [`Table::get`].
    #[inline]
    pub fn get_item<'k, Q>(&self, key: &'k Q) -> std::result::Result<&V, KeyNotFound<&'k Q>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key)
    }

    /// Same as [`Table::add`].
    #[inline]
    pub fn set_item(&mut self, key: K, value: V) {
        self.add(key, value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = hash_key(&self.hasher, key);
        self.buckets[self.slot(hash)]
            .iter()
            .any(|entry| entry.matches(hash, key))
    }
}

impl<K, V, S> Table<K, V, S> {
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    pub fn buckets(&self) -> &[Bucket<K, V>] {
        &self.buckets
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Walks buckets in index order and each chain oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.buckets
            .iter()
            .flatten()
            .filter_map(|entry| entry.value().map(|value| (entry.key(), value)))
    }
}

impl<K, Q, V, S> Index<&Q> for Table<K, V, S>
where
    K: Borrow<Q> + Hash + Eq,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    /// Panics when `key` is absent.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Ok(value) => value,
            Err(_) => panic!("key not found in table"),
        }
    }
}

impl<K, V, S> Extend<(K, V)> for Table<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for Table<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<K: fmt::Display, V: fmt::Display, S> fmt::Display for Table<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, bucket) in self.buckets.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "Table.{}:[", index)?;
            for (position, entry) in bucket.iter().enumerate() {
                if position > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", entry)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}
