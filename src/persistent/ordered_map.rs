//! Persistent map that remembers the order in which keys were first inserted.
//!
//! This module provides [`OrderedMap`], an immutable associative container
//! with hash-map lookup cost and deterministic, insertion-ordered iteration.
//!
//! # Overview
//!
//! An `OrderedMap` is three persistent structures kept in step:
//!
//! - a [`PersistentHashMap`] from key to value, authoritative for membership
//! - a [`PersistentTreeMap`] from sequence number to key, which fixes the
//!   iteration order
//! - a [`PersistentHashMap`] from key to sequence number, used to find a key's
//!   place in the ordering index when it is removed
//!
//! Every key receives the next sequence number when it is first inserted.
//! Updating a key never touches its sequence number, and removing a key never
//! renumbers the survivors: the gap it leaves is permanent for that lineage of
//! maps. A removed key that is inserted again is a new key and goes to the end.
//!
//! | Operation               | Complexity |
//! |-------------------------|------------|
//! | `get` / `contains_key`  | O(log32 N) |
//! | `assoc` (existing key)  | O(log32 N) |
//! | `assoc` (new key)       | O(log N)   |
//! | `dissoc`                | O(log N)   |
//! | `nth`                   | O(log N)   |
//! | `iter` / `rseq` (full)  | O(N)       |
//! | `len`                   | O(1)       |
//!
//! # Examples
//!
//! ```rust
//! use seqmap::persistent::OrderedMap;
//!
//! let map = OrderedMap::new()
//!     .assoc("b", 2)
//!     .assoc("a", 1)
//!     .assoc("c", 3);
//!
//! let keys: Vec<&&str> = map.keys().collect();
//! assert_eq!(keys, vec![&"b", &"a", &"c"]);
//!
//! // Updating keeps the position, removing and re-adding moves to the end.
//! let updated = map.assoc("b", 20).dissoc("a").assoc("a", 10);
//! let entries: Vec<(&&str, &i32)> = updated.iter().collect();
//! assert_eq!(entries, vec![(&"b", &20), (&"c", &3), (&"a", &10)]);
//!
//! // The original is untouched.
//! assert_eq!(map.get("b"), Some(&2));
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::{FromIterator, Rev};

use super::hashmap::hash_of;
use super::treemap::PersistentTreeMapIterator;
use super::{
    IndexOutOfRange, PersistentHashMap, PersistentTreeMap, ReferenceCounter, SequenceNumber,
};
use crate::typeclass::{Foldable, TypeConstructor};

// =============================================================================
// OrderedMap Definition
// =============================================================================

/// A persistent map that iterates in first-insertion order.
///
/// `M` is the type of the optional metadata attached with
/// [`with_metadata`](Self::with_metadata). Metadata rides along with the map
/// through every derived version but never takes part in equality, hashing,
/// ordering or serialization.
///
/// # Examples
///
/// ```rust
/// use seqmap::persistent::OrderedMap;
///
/// let first: OrderedMap<&str, i32> = [("x", 1), ("y", 2)].into_iter().collect();
/// let second: OrderedMap<&str, i32> = [("y", 2), ("x", 1)].into_iter().collect();
///
/// // Same content, different order: equal maps, different iteration.
/// assert_eq!(first, second);
/// assert_ne!(first.keys().next(), second.keys().next());
/// ```
pub struct OrderedMap<K, V, M = ()> {
    entries: PersistentHashMap<K, V>,
    order: PersistentTreeMap<SequenceNumber, K>,
    positions: PersistentHashMap<K, SequenceNumber>,
    next_sequence: SequenceNumber,
    metadata: Option<ReferenceCounter<M>>,
}

impl<K, V, M> Clone for OrderedMap<K, V, M> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            order: self.order.clone(),
            positions: self.positions.clone(),
            next_sequence: self.next_sequence,
            metadata: self.metadata.clone(),
        }
    }
}

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(OrderedMap<String, i32>: Send, Sync);

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(OrderedMap<String, i32>: Send, Sync);

impl<K, V> OrderedMap<K, V> {
    /// Creates the empty map without allocating.
    ///
    /// Every empty map built this way is interchangeable with every other.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::empty()
    }
}

impl<K, V, M> OrderedMap<K, V, M> {
    const fn empty() -> Self {
        Self {
            entries: PersistentHashMap::new(),
            order: PersistentTreeMap::new(),
            positions: PersistentHashMap::new(),
            next_sequence: 0,
            metadata: None,
        }
    }

    /// Returns the number of entries in the map.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Alias for [`len`](Self::len).
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the sequence number the next new key will receive.
    ///
    /// This never decreases across versions derived from one another, not even
    /// through [`dissoc`](Self::dissoc) or [`clear`](Self::clear).
    #[inline]
    #[must_use]
    pub const fn next_sequence(&self) -> SequenceNumber {
        self.next_sequence
    }

    /// Returns the attached metadata, if any.
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> Option<&M> {
        self.metadata.as_deref()
    }

    /// Returns a map with identical content whose metadata is `metadata`.
    ///
    /// The metadata type of the result is that of `metadata`, whatever this
    /// map carried before.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqmap::persistent::OrderedMap;
    ///
    /// let plain = OrderedMap::new().assoc("a", 1);
    /// let tagged = plain.with_metadata("source: config");
    ///
    /// assert_eq!(tagged.metadata(), Some(&"source: config"));
    /// assert_eq!(plain.metadata(), None);
    /// assert_eq!(plain, tagged);
    /// ```
    #[must_use]
    pub fn with_metadata<N>(&self, metadata: N) -> OrderedMap<K, V, N> {
        OrderedMap {
            entries: self.entries.clone(),
            order: self.order.clone(),
            positions: self.positions.clone(),
            next_sequence: self.next_sequence,
            metadata: Some(ReferenceCounter::new(metadata)),
        }
    }

    /// Returns a map with identical content and no metadata.
    #[must_use]
    pub fn without_metadata(&self) -> Self {
        Self {
            metadata: None,
            ..self.clone()
        }
    }

    /// Returns `true` if both maps share all of their internal structure.
    ///
    /// [`dissoc`](Self::dissoc) of an absent key returns a map for which this
    /// holds.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.next_sequence == other.next_sequence
            && self.entries.ptr_eq(&other.entries)
            && self.order.ptr_eq(&other.order)
            && self.positions.ptr_eq(&other.positions)
    }

    /// Returns an empty map that keeps this map's metadata and sequence
    /// counter.
    #[must_use]
    pub fn clear(&self) -> Self {
        Self {
            entries: PersistentHashMap::new(),
            order: PersistentTreeMap::new(),
            positions: PersistentHashMap::new(),
            next_sequence: self.next_sequence,
            metadata: self.metadata.clone(),
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone, M> OrderedMap<K, V, M> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// Only the value store is consulted; lookups pay nothing for ordering.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Returns the value for `key`, or `default` when the key is absent.
    #[must_use]
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_or(key, default)
    }

    /// Returns `true` if the map contains a value for the specified key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Returns the sequence number `key` received when it was inserted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqmap::persistent::OrderedMap;
    ///
    /// let map = OrderedMap::new().assoc("a", 1).assoc("b", 2).dissoc("a");
    /// assert_eq!(map.sequence_of("b"), Some(1));
    /// assert_eq!(map.sequence_of("a"), None);
    /// ```
    #[must_use]
    pub fn sequence_of<Q>(&self, key: &Q) -> Option<SequenceNumber>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.positions.get(key).copied()
    }

    /// Associates `value` with `key`.
    ///
    /// An existing key keeps its position and only its value changes. A new
    /// key is appended to the iteration order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqmap::persistent::OrderedMap;
    ///
    /// let map = OrderedMap::new().assoc("a", 1).assoc("b", 2);
    /// let updated = map.assoc("a", 99);
    ///
    /// let entries: Vec<(&&str, &i32)> = updated.iter().collect();
    /// assert_eq!(entries, vec![(&"a", &99), (&"b", &2)]);
    /// assert_eq!(map.get("a"), Some(&1));
    /// ```
    #[must_use]
    pub fn assoc(&self, key: K, value: V) -> Self {
        if self.entries.contains_key(&key) {
            return Self {
                entries: self.entries.insert(key, value),
                ..self.clone()
            };
        }

        let sequence = self.next_sequence;
        Self {
            entries: self.entries.insert(key.clone(), value),
            order: self.order.insert(sequence, key.clone()),
            positions: self.positions.insert(key, sequence),
            next_sequence: sequence + 1,
            metadata: self.metadata.clone(),
        }
    }

    /// Removes `key` from the map.
    ///
    /// Removing an absent key returns this same map, sharing every node (see
    /// [`ptr_eq`](Self::ptr_eq)). Removing a present key leaves a permanent
    /// gap in the sequence numbers; survivors are never renumbered.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqmap::persistent::OrderedMap;
    ///
    /// let map = OrderedMap::new().assoc("a", 1).assoc("b", 2);
    ///
    /// assert!(map.dissoc("missing").ptr_eq(&map));
    ///
    /// let removed = map.dissoc("a");
    /// assert_eq!(removed.len(), 1);
    /// assert_eq!(removed.next_sequence(), 2);
    /// ```
    #[must_use]
    pub fn dissoc<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(sequence) = self.positions.get(key) else {
            return self.clone();
        };

        let order = self.order.remove(sequence);
        debug_assert_eq!(
            order.len() + 1,
            self.order.len(),
            "ordering index lost track of a key present in the reverse index"
        );

        Self {
            entries: self.entries.remove(key),
            order,
            positions: self.positions.remove(key),
            next_sequence: self.next_sequence,
            metadata: self.metadata.clone(),
        }
    }

    /// Replaces the value of an existing key with `function(value)`.
    ///
    /// Returns `None` if the key is absent. The key keeps its position.
    #[must_use]
    pub fn update<Q, F>(&self, key: &Q, function: F) -> Option<Self>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> V,
    {
        let sequence = self.positions.get(key)?;
        let stored_key = self.order.get(sequence)?;
        let value = self.entries.get(key)?;

        Some(Self {
            entries: self.entries.insert(stored_key.clone(), function(value)),
            ..self.clone()
        })
    }

    /// Returns a lazy iterator over entries in insertion order.
    ///
    /// Each call starts a fresh walk; the map itself holds no cursor. The
    /// iterator is double-ended, so `iter().rev()` is the reverse walk.
    #[must_use]
    pub fn iter(&self) -> OrderedMapIterator<'_, K, V> {
        OrderedMapIterator {
            order: self.order.iter(),
            entries: &self.entries,
        }
    }

    /// Alias for [`iter`](Self::iter).
    #[inline]
    #[must_use]
    pub fn seq(&self) -> OrderedMapIterator<'_, K, V> {
        self.iter()
    }

    /// Returns a lazy iterator over entries in reverse insertion order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqmap::persistent::OrderedMap;
    ///
    /// let map = OrderedMap::new().assoc(1, 'a').assoc(2, 'b').assoc(3, 'c');
    /// let reversed: String = map.rseq().map(|(_, value)| *value).collect();
    /// assert_eq!(reversed, "cba");
    /// ```
    #[must_use]
    pub fn rseq(&self) -> Rev<OrderedMapIterator<'_, K, V>> {
        self.iter().rev()
    }

    /// Returns an iterator over keys in insertion order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values in insertion order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.iter().map(|(_, value)| value)
    }

    /// Returns the earliest inserted entry still present.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    /// Returns the latest inserted entry still present.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.iter().next_back()
    }

    /// Returns the entry whose sequence number is exactly `index`.
    ///
    /// This is **not** the `index`-th surviving entry. While nothing has been
    /// removed the two coincide, because sequence numbers run contiguously
    /// from 0. After a removal the numbering has a gap: looking up the gap
    /// fails, and entries after it answer to their original numbers.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when no present entry carries sequence
    /// number `index`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqmap::persistent::OrderedMap;
    ///
    /// let map = OrderedMap::new().assoc("a", 1).assoc("b", 2).assoc("c", 3);
    /// assert_eq!(map.nth(1), Ok((&"b", &2)));
    /// assert!(map.nth(3).is_err());
    ///
    /// let gapped = map.dissoc("b");
    /// assert!(gapped.nth(1).is_err());
    /// assert_eq!(gapped.nth(2), Ok((&"c", &3)));
    /// ```
    pub fn nth(&self, index: usize) -> Result<(&K, &V), IndexOutOfRange> {
        self.get_nth(index).ok_or_else(|| {
            tracing::trace!(
                index,
                count = self.len(),
                next_sequence = self.next_sequence,
                "no entry carries the requested sequence number"
            );
            IndexOutOfRange {
                index,
                count: self.len(),
                next_sequence: self.next_sequence,
            }
        })
    }

    /// Like [`nth`](Self::nth), returning `None` instead of an error.
    #[must_use]
    pub fn get_nth(&self, index: usize) -> Option<(&K, &V)> {
        let sequence = SequenceNumber::try_from(index).ok()?;
        let key = self.order.get(&sequence)?;
        self.entries.get(key).map(|value| (key, value))
    }

    /// Like [`nth`](Self::nth), returning `default` instead of an error.
    #[must_use]
    pub fn nth_or<'a>(&'a self, index: usize, default: (&'a K, &'a V)) -> (&'a K, &'a V) {
        self.get_nth(index).unwrap_or(default)
    }

    /// Folds over keys and values in insertion order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqmap::persistent::OrderedMap;
    ///
    /// let map = OrderedMap::new().assoc("x", 1).assoc("y", 2);
    /// let rendered = map.fold_with_key(String::new(), |mut text, key, value| {
    ///     text.push_str(&format!("{key}={value};"));
    ///     text
    /// });
    /// assert_eq!(rendered, "x=1;y=2;");
    /// ```
    pub fn fold_with_key<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &K, &V) -> B,
    {
        self.iter()
            .fold(init, |accumulator, (key, value)| function(accumulator, key, value))
    }

    /// Associates every entry of `other`, in `other`'s order.
    ///
    /// Keys already present keep their position and take `other`'s value;
    /// new keys are appended.
    #[must_use]
    pub fn merge<N>(&self, other: &OrderedMap<K, V, N>) -> Self {
        other
            .iter()
            .fold(self.clone(), |map, (key, value)| map.assoc(key.clone(), value.clone()))
    }

    /// Keeps only the entries for which `predicate` returns `true`.
    ///
    /// Survivors keep their sequence numbers.
    #[must_use]
    pub fn retain<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.iter()
            .filter(|(key, value)| !predicate(key, value))
            .fold(self.clone(), |map, (key, _)| map.dissoc(key))
    }

    /// Applies `transform` to every value, keeping keys, order, sequence
    /// numbers and metadata.
    #[must_use]
    pub fn map_values<W, F>(&self, mut transform: F) -> OrderedMap<K, W, M>
    where
        W: Clone,
        F: FnMut(&V) -> W,
    {
        let entries = self
            .iter()
            .fold(PersistentHashMap::new(), |store, (key, value)| {
                store.insert(key.clone(), transform(value))
            });

        OrderedMap {
            entries,
            order: self.order.clone(),
            positions: self.positions.clone(),
            next_sequence: self.next_sequence,
            metadata: self.metadata.clone(),
        }
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// A lazy iterator over an [`OrderedMap`] in insertion order.
///
/// Walks the ordering index and resolves each key against the value store.
pub struct OrderedMapIterator<'a, K, V> {
    order: PersistentTreeMapIterator<'a, SequenceNumber, K>,
    entries: &'a PersistentHashMap<K, V>,
}

impl<K, V> Clone for OrderedMapIterator<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            order: self.order.clone(),
            entries: self.entries,
        }
    }
}

impl<'a, K: Clone + Hash + Eq, V: Clone> Iterator for OrderedMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries;
        self.order
            .find_map(|(_, key)| entries.get(key).map(|value| (key, value)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> DoubleEndedIterator for OrderedMapIterator<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let entries = self.entries;
        self.order
            .by_ref()
            .rev()
            .find_map(|(_, key)| entries.get(key).map(|value| (key, value)))
    }
}

impl<K: Clone + Hash + Eq, V: Clone> ExactSizeIterator for OrderedMapIterator<'_, K, V> {}

/// An owning iterator over an [`OrderedMap`] in insertion order.
pub struct OrderedMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for OrderedMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for OrderedMapIntoIterator<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for OrderedMapIntoIterator<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, M> Default for OrderedMap<K, V, M> {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: Clone + Hash + Eq, V: Clone, M> FromIterator<(K, V)> for OrderedMap<K, V, M> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |map, (key, value)| map.assoc(key, value))
    }
}

impl<K: Clone + Hash + Eq, V: Clone, M> IntoIterator for OrderedMap<K, V, M> {
    type Item = (K, V);
    type IntoIter = OrderedMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let entries: Vec<(K, V)> = self
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        OrderedMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K: Clone + Hash + Eq, V: Clone, M> IntoIterator for &'a OrderedMap<K, V, M> {
    type Item = (&'a K, &'a V);
    type IntoIter = OrderedMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Content equality: order, sequence numbers and metadata are ignored.
impl<K, V, M, N> PartialEq<OrderedMap<K, V, N>> for OrderedMap<K, V, M>
where
    K: Clone + Hash + Eq,
    V: Clone + PartialEq,
{
    fn eq(&self, other: &OrderedMap<K, V, N>) -> bool {
        self.entries == other.entries
    }
}

impl<K: Clone + Hash + Eq, V: Clone + Eq, M> Eq for OrderedMap<K, V, M> {}

/// Order-independent hash of the content.
///
/// Each entry is hashed on its own and the results are summed, so maps that
/// compare equal hash equal however their entries were ordered.
impl<K, V, M> Hash for OrderedMap<K, V, M>
where
    K: Clone + Hash + Eq,
    V: Clone + Hash,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self
            .entries
            .iter()
            .fold(0u64, |accumulator, entry| accumulator.wrapping_add(hash_of(&entry)));
        state.write_usize(self.len());
        state.write_u64(combined);
    }
}

impl<K, V, M> fmt::Debug for OrderedMap<K, V, M>
where
    K: Clone + Hash + Eq + fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, M> fmt::Display for OrderedMap<K, V, M>
where
    K: Clone + Hash + Eq + fmt::Display,
    V: Clone + fmt::Display,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        for (position, (key, value)) in self.iter().enumerate() {
            if position > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Type Class Implementations
// =============================================================================

impl<K, V, M> TypeConstructor for OrderedMap<K, V, M> {
    type Inner = V;
    type WithType<B> = OrderedMap<K, B, M>;
}

impl<K: Clone + Hash + Eq, V: Clone, M> Foldable for OrderedMap<K, V, M> {
    fn fold_left<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(B, V) -> B,
    {
        self.values()
            .fold(init, |accumulator, value| function(accumulator, value.clone()))
    }

    fn fold_right<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(V, B) -> B,
    {
        self.values()
            .rev()
            .fold(init, |accumulator, value| function(value.clone(), accumulator))
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    fn length(&self) -> usize {
        self.entries.len()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V, M> serde::Serialize for OrderedMap<K, V, M>
where
    K: serde::Serialize + Clone + Hash + Eq,
    V: serde::Serialize + Clone,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct OrderedMapVisitor<K, V, M> {
    marker: std::marker::PhantomData<fn() -> OrderedMap<K, V, M>>,
}

#[cfg(feature = "serde")]
impl<'de, K, V, M> serde::de::Visitor<'de> for OrderedMapVisitor<K, V, M>
where
    K: serde::Deserialize<'de> + Clone + Hash + Eq,
    V: serde::Deserialize<'de> + Clone,
{
    type Value = OrderedMap<K, V, M>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = OrderedMap::default();
        while let Some((key, value)) = access.next_entry()? {
            map = map.assoc(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, M> serde::Deserialize<'de> for OrderedMap<K, V, M>
where
    K: serde::Deserialize<'de> + Clone + Hash + Eq,
    V: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn abc() -> OrderedMap<&'static str, i32> {
        OrderedMap::new().assoc("a", 1).assoc("b", 2).assoc("c", 3)
    }

    /// Checks that the three indices agree with each other.
    fn assert_consistent<K, V, M>(map: &OrderedMap<K, V, M>)
    where
        K: Clone + Hash + Eq + fmt::Debug,
        V: Clone,
    {
        assert_eq!(map.entries.len(), map.order.len());
        assert_eq!(map.entries.len(), map.positions.len());
        for (sequence, key) in &map.order {
            assert_eq!(map.positions.get(key), Some(sequence));
            assert!(map.entries.contains_key(key), "{key:?} missing from store");
            assert!(*sequence < map.next_sequence);
        }
    }

    #[rstest]
    fn test_new_is_empty() {
        let map: OrderedMap<String, i32> = OrderedMap::new();
        assert!(map.is_empty());
        assert_eq!(map.next_sequence(), 0);
        assert_eq!(map.iter().next(), None);
        assert_eq!(map.rseq().next(), None);
    }

    #[rstest]
    fn test_assoc_new_key_takes_next_sequence() {
        let map = abc();
        assert_consistent(&map);
        assert_eq!(map.sequence_of("a"), Some(0));
        assert_eq!(map.sequence_of("c"), Some(2));
        assert_eq!(map.next_sequence(), 3);
    }

    #[rstest]
    fn test_assoc_existing_key_touches_only_store() {
        let map = abc();
        let updated = map.assoc("b", 20);

        assert_consistent(&updated);
        assert!(updated.order.ptr_eq(&map.order));
        assert!(updated.positions.ptr_eq(&map.positions));
        assert_eq!(updated.next_sequence(), 3);
        assert_eq!(updated.get("b"), Some(&20));
    }

    #[rstest]
    fn test_dissoc_keeps_sequence_counter() {
        let removed = abc().dissoc("a");
        assert_consistent(&removed);
        assert_eq!(removed.len(), 2);
        assert_eq!(removed.next_sequence(), 3);
        assert_eq!(removed.sequence_of("b"), Some(1));
    }

    #[rstest]
    fn test_dissoc_absent_is_identity() {
        let map = abc();
        assert!(map.dissoc("zzz").ptr_eq(&map));
    }

    #[rstest]
    fn test_reinsert_after_dissoc_goes_to_end() {
        let map = abc().dissoc("a").assoc("a", 100);
        assert_consistent(&map);
        let keys: Vec<&&str> = map.keys().collect();
        assert_eq!(keys, vec![&"b", &"c", &"a"]);
        assert_eq!(map.sequence_of("a"), Some(3));
    }

    #[rstest]
    fn test_iterator_mixed_ends() {
        let map = abc();
        let mut iterator = map.iter();
        assert_eq!(iterator.len(), 3);
        assert_eq!(iterator.next_back(), Some((&"c", &3)));
        assert_eq!(iterator.next(), Some((&"a", &1)));
        assert_eq!(iterator.next(), Some((&"b", &2)));
        assert_eq!(iterator.next_back(), None);
    }

    #[rstest]
    #[case(0, Some(("a", 1)))]
    #[case(2, Some(("c", 3)))]
    #[case(3, None)]
    #[case(usize::MAX, None)]
    fn test_get_nth_without_removals(#[case] index: usize, #[case] expected: Option<(&str, i32)>) {
        let map = abc();
        let found = map.get_nth(index).map(|(key, value)| (*key, *value));
        assert_eq!(found, expected);
    }

    #[rstest]
    fn test_nth_error_carries_context() {
        let map = abc().dissoc("b");
        assert_eq!(
            map.nth(1),
            Err(IndexOutOfRange {
                index: 1,
                count: 2,
                next_sequence: 3,
            })
        );
    }

    #[rstest]
    fn test_clear_keeps_metadata_and_counter() {
        let map = OrderedMap::new().assoc("a", 1).with_metadata(7u8);
        let cleared = map.clear();
        assert!(cleared.is_empty());
        assert_eq!(cleared.metadata(), Some(&7));
        assert_eq!(cleared.next_sequence(), 1);
        assert_eq!(cleared.assoc("b", 2).sequence_of("b"), Some(1));
    }

    #[rstest]
    fn test_map_values_keeps_sequence_numbers() {
        let doubled = abc().dissoc("a").map_values(|value| value * 2);
        assert_consistent(&doubled);
        assert_eq!(doubled.nth(2), Ok((&"c", &6)));
        assert_eq!(doubled.next_sequence(), 3);
    }

    #[rstest]
    fn test_retain_keeps_gaps() {
        let kept = abc().retain(|key, _| *key != "b");
        assert_consistent(&kept);
        assert_eq!(kept.len(), 2);
        assert!(kept.nth(1).is_err());
        assert_eq!(kept.nth(2), Ok((&"c", &3)));
    }

    #[rstest]
    fn test_display_in_insertion_order() {
        let map = OrderedMap::new().assoc("z", 26).assoc("a", 1);
        assert_eq!(format!("{map}"), "{z: 26, a: 1}");
        assert_eq!(format!("{map:?}"), "{\"z\": 26, \"a\": 1}");
    }

    #[rstest]
    fn test_fold_right_runs_backwards() {
        let rendered = abc().fold_right(String::new(), |value, text| format!("{text}{value}"));
        assert_eq!(rendered, "321");
    }
}
