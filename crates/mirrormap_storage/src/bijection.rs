//! The mirroring capability and link-time reconciliation.
//!
//! Linking two previously independent maps must leave them as exact inverses
//! of one another. The protocol is written against the [`Bijective`]
//! capability, so "can this container take part?" is a compile-time bound on
//! the container type rather than a runtime probe of its methods.

use std::collections::HashMap;
use std::hash::Hash;

use crate::pairmap::PairMap;

/// Capability to take part in the mirroring protocol.
///
/// Implementors expose just enough of their contents for [`reconcile`] to
/// rebuild two sides as exact inverses of one another.
pub trait Bijective<K, V> {
    /// Snapshots the entries in iteration order.
    fn pairs(&self) -> Vec<(K, V)>;

    /// Inserts a pair, overwriting any entry under the same key.
    fn put(&mut self, key: K, value: V);

    /// Removes the entry under `key`, preserving the order of the rest.
    fn take(&mut self, key: &K) -> Option<V>;

    /// Removes every entry.
    fn wipe(&mut self);
}

impl<K: Clone + Eq + Hash, V: Clone> Bijective<K, V> for PairMap<K, V> {
    fn pairs(&self) -> Vec<(K, V)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn take(&mut self, key: &K) -> Option<V> {
        self.remove(key)
    }

    fn wipe(&mut self) {
        self.clear();
    }
}

/// Reconciles two newly linked sides so they leave as exact inverses.
///
/// `other`'s contents are authoritative:
///
/// 1. Overlay: each `(k, v)` of `other`, in iteration order, is written into
///    `own` as `v → k`, last write winning when two of `other`'s entries
///    share a value.
/// 2. Prune: entries of `own` whose value recurs later in its iteration
///    order are dropped, keeping the last holder of each value.
/// 3. Rebuild: `other` becomes exactly `{v: k for (k, v) in own}`.
///
/// The net effect is that `other`'s pre-link contents dominate, while `own`'s
/// surviving entries are reflected back into `other`.
pub fn reconcile<K, V>(own: &mut impl Bijective<K, V>, other: &mut impl Bijective<V, K>)
where
    K: Clone + Eq + Hash,
    V: Clone + Eq + Hash,
{
    for (key, value) in other.pairs() {
        own.put(value, key);
    }

    let pairs = own.pairs();
    let mut last_holder: HashMap<&V, &K> = HashMap::new();
    for (key, value) in &pairs {
        last_holder.insert(value, key);
    }
    for (key, value) in &pairs {
        if last_holder.get(value).copied() != Some(key) {
            own.take(key);
        }
    }

    other.wipe();
    for (key, value) in own.pairs() {
        other.put(value, key);
    }
}
