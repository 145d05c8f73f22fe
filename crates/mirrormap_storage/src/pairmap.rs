//! Insertion-ordered key-value containers.
//!
//! `PairMap` is the entry storage for one side of a linked pair. On its own
//! it behaves as an ordinary associative container; the linkage and
//! mirroring protocol lives in [`MapStore`](crate::MapStore).

use std::fmt;
use std::hash::Hash;
use std::iter::FromIterator;

use indexmap::IndexMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Insertion-ordered map of unique keys to values.
///
/// Iteration yields entries in insertion order; overwriting a key keeps its
/// original position, and removal preserves the order of the remaining
/// entries. Equality is order-insensitive: two maps are equal when they hold
/// the same set of pairs.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairMap<K, V>
where
    K: Eq + Hash,
{
    entries: IndexMap<K, V>,
}

impl<K: Eq + Hash, V> PairMap<K, V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gets a value by key.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Returns true if the map contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts a key-value pair, returning the key's previous value.
    ///
    /// An existing key keeps its position in iteration order; a new key is
    /// appended at the end.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Removes the entry under `key`, returning its value.
    ///
    /// The order of the remaining entries is preserved.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.shift_remove(key)
    }

    /// Removes and returns the most recently inserted entry.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.entries.pop()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns an iterator over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    /// Returns an iterator over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Returns an iterator over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }
}

impl<K: Eq + Hash + fmt::Debug, V: fmt::Debug> fmt::Debug for PairMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Eq + Hash, V: PartialEq> PartialEq for PairMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq + Hash, V: Eq> Eq for PairMap<K, V> {}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for PairMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: IndexMap::from_iter(iter),
        }
    }
}

impl<K: Eq + Hash, V> Extend<(K, V)> for PairMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl<K: Eq + Hash, V> IntoIterator for PairMap<K, V> {
    type Item = (K, V);
    type IntoIter = indexmap::map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K: Eq + Hash, V> IntoIterator for &'a PairMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = indexmap::map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
