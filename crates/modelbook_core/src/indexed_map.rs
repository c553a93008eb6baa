//! Immutable map with a reverse index.
//!
//! # Responsibility
//! - Forward lookup `K -> V` in O(1).
//! - Reverse lookup `V -> [K]` and stable enumeration in build order.
//!
//! # Invariants
//! - Built once from a snapshot and never mutated; updates build a new map.
//!   Share it behind an `Arc` so readers never copy and never observe a
//!   partially updated index.
//! - Duplicate keys resolve last-write-wins; the key keeps the position of
//!   its first occurrence.
//! - Absent keys report `None`, never an error.

use indexmap::IndexMap;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct IndexedMap<K: Eq + Hash, V: Eq + Hash> {
    entries: IndexMap<K, V>,
    index: HashMap<V, Vec<K>>,
}

impl<K, V> Default for IndexedMap<K, V>
where
    K: Eq + Hash,
    V: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
            index: HashMap::new(),
        }
    }
}

/// Equal when both enumerate the same pairs in the same order.
impl<K, V> PartialEq for IndexedMap<K, V>
where
    K: Eq + Hash,
    V: Eq + Hash,
{
    fn eq(&self, other: &Self) -> bool {
        self.entries.iter().eq(other.entries.iter())
    }
}

impl<K, V> Eq for IndexedMap<K, V>
where
    K: Eq + Hash,
    V: Eq + Hash,
{
}

impl<K, V> IndexedMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    /// Builds the map from `(key, value)` pairs in enumeration order.
    pub fn from_entries(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut entries = IndexMap::new();
        for (key, value) in pairs {
            entries.insert(key, value);
        }

        let mut index: HashMap<V, Vec<K>> = HashMap::new();
        for (key, value) in &entries {
            index.entry(value.clone()).or_default().push(key.clone());
        }

        Self { entries, index }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Position of `key` in enumeration order.
    pub fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get_index_of(key)
    }

    /// Keys mapped to `value`, in enumeration order. Empty when none.
    pub fn keys_for<Q>(&self, value: &Q) -> &[K]
    where
        V: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.get(value).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for IndexedMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}
