//! Key lookup and non-destructive update.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use crate::persistent::{OrderedMap, PersistentHashMap};

/// Maps that answer key lookups and derive updated copies of themselves.
///
/// `assoc` and `dissoc` never modify `self`. Persistent maps share structure
/// with the result; standard library maps are cloned first.
pub trait Associative<K, V>: Sized {
    /// Returns the value stored under `key`.
    fn lookup(&self, key: &K) -> Option<&V>;

    /// Returns the value stored under `key`, or `default`.
    fn lookup_or<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.lookup(key).unwrap_or(default)
    }

    /// Returns `true` if `key` is present.
    fn has_key(&self, key: &K) -> bool {
        self.lookup(key).is_some()
    }

    /// Number of entries.
    fn count(&self) -> usize;

    /// Returns a map where `key` is bound to `value`.
    #[must_use]
    fn assoc(&self, key: K, value: V) -> Self;

    /// Returns a map without `key`.
    #[must_use]
    fn dissoc(&self, key: &K) -> Self;
}

impl<K: Clone + Hash + Eq, V: Clone, M> Associative<K, V> for OrderedMap<K, V, M> {
    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn has_key(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn count(&self) -> usize {
        self.len()
    }

    fn assoc(&self, key: K, value: V) -> Self {
        Self::assoc(self, key, value)
    }

    fn dissoc(&self, key: &K) -> Self {
        Self::dissoc(self, key)
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Associative<K, V> for PersistentHashMap<K, V> {
    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn has_key(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn count(&self) -> usize {
        self.len()
    }

    fn assoc(&self, key: K, value: V) -> Self {
        self.insert(key, value)
    }

    fn dissoc(&self, key: &K) -> Self {
        self.remove(key)
    }
}

impl<K, V, S> Associative<K, V> for HashMap<K, V, S>
where
    K: Clone + Hash + Eq,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn count(&self) -> usize {
        self.len()
    }

    fn assoc(&self, key: K, value: V) -> Self {
        let mut copy = self.clone();
        copy.insert(key, value);
        copy
    }

    fn dissoc(&self, key: &K) -> Self {
        let mut copy = self.clone();
        copy.remove(key);
        copy
    }
}

impl<K: Clone + Ord, V: Clone> Associative<K, V> for BTreeMap<K, V> {
    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn count(&self) -> usize {
        self.len()
    }

    fn assoc(&self, key: K, value: V) -> Self {
        let mut copy = self.clone();
        copy.insert(key, value);
        copy
    }

    fn dissoc(&self, key: &K) -> Self {
        let mut copy = self.clone();
        copy.remove(key);
        copy
    }
}
