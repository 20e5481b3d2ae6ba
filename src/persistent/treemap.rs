//! Persistent (immutable) ordered map based on an AVL tree.
//!
//! [`PersistentTreeMap`] keeps its entries sorted by key. Inside
//! [`OrderedMap`](super::OrderedMap) it is the ordering index, keyed by
//! sequence number, so an in-order walk visits keys in the order they were
//! first inserted.
//!
//! # Overview
//!
//! - O(log N) `get`, `insert`, `remove`
//! - O(log N) `first` / `last`
//! - O(1) `len` and `is_empty`
//! - Lazy in-order iteration from either end
//!
//! Removal rebalances on the way back up, so the height bound
//! (about 1.44 log2 N) holds no matter how many keys are removed.
//!
//! # Examples
//!
//! ```rust
//! use seqmap::persistent::PersistentTreeMap;
//!
//! let map = PersistentTreeMap::new()
//!     .insert(3, "three")
//!     .insert(1, "one")
//!     .insert(2, "two");
//!
//! let keys: Vec<&i32> = map.keys().collect();
//! assert_eq!(keys, vec![&1, &2, &3]);
//!
//! let descending: Vec<&i32> = map.keys().rev().collect();
//! assert_eq!(descending, vec![&3, &2, &1]);
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;

use smallvec::SmallVec;

use super::ReferenceCounter;

// =============================================================================
// Node Definition
// =============================================================================

type Link<K, V> = Option<ReferenceCounter<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    height: u8,
    left: Link<K, V>,
    right: Link<K, V>,
}

fn height<K, V>(link: &Link<K, V>) -> u8 {
    link.as_ref().map_or(0, |node| node.height)
}

/// Allocates a node whose children are already balanced relative to each other.
fn join<K, V>(key: K, value: V, left: Link<K, V>, right: Link<K, V>) -> ReferenceCounter<Node<K, V>> {
    let height = height(&left).max(height(&right)) + 1;
    ReferenceCounter::new(Node {
        key,
        value,
        height,
        left,
        right,
    })
}

/// Like [`join`], but restores the AVL balance when the children differ in
/// height by two.
fn balance<K: Clone, V: Clone>(
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
) -> ReferenceCounter<Node<K, V>> {
    let left_height = height(&left);
    let right_height = height(&right);

    if left_height > right_height + 1
        && let Some(pivot) = &left
    {
        if height(&pivot.left) >= height(&pivot.right) {
            let lowered = join(key, value, pivot.right.clone(), right);
            return join(pivot.key.clone(), pivot.value.clone(), pivot.left.clone(), Some(lowered));
        }
        if let Some(middle) = &pivot.right {
            let new_left = join(
                pivot.key.clone(),
                pivot.value.clone(),
                pivot.left.clone(),
                middle.left.clone(),
            );
            let new_right = join(key, value, middle.right.clone(), right);
            return join(middle.key.clone(), middle.value.clone(), Some(new_left), Some(new_right));
        }
    }

    if right_height > left_height + 1
        && let Some(pivot) = &right
    {
        if height(&pivot.right) >= height(&pivot.left) {
            let lowered = join(key, value, left, pivot.left.clone());
            return join(pivot.key.clone(), pivot.value.clone(), Some(lowered), pivot.right.clone());
        }
        if let Some(middle) = &pivot.left {
            let new_left = join(key, value, left, middle.left.clone());
            let new_right = join(
                pivot.key.clone(),
                pivot.value.clone(),
                middle.right.clone(),
                pivot.right.clone(),
            );
            return join(middle.key.clone(), middle.value.clone(), Some(new_left), Some(new_right));
        }
    }

    join(key, value, left, right)
}

// =============================================================================
// PersistentTreeMap Definition
// =============================================================================

/// A persistent (immutable) ordered map based on an AVL tree.
///
/// # Time Complexity
///
/// | Operation      | Complexity |
/// |----------------|------------|
/// | `new`          | O(1)       |
/// | `get`          | O(log N)   |
/// | `insert`       | O(log N)   |
/// | `remove`       | O(log N)   |
/// | `first`/`last` | O(log N)   |
/// | `iter`         | O(N)       |
/// | `len`          | O(1)       |
///
/// # Examples
///
/// ```rust
/// use seqmap::persistent::PersistentTreeMap;
///
/// let map = PersistentTreeMap::singleton(42, "answer");
/// assert_eq!(map.get(&42), Some(&"answer"));
/// assert_eq!(map.remove(&42).len(), 0);
/// ```
pub struct PersistentTreeMap<K, V> {
    root: Link<K, V>,
    length: usize,
}

impl<K, V> Clone for PersistentTreeMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            length: self.length,
        }
    }
}

impl<K, V> PersistentTreeMap<K, V> {
    /// Creates a new empty map without allocating.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            length: 0,
        }
    }

    /// Returns the number of entries in the map.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns `true` if both maps share the same root node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(left), Some(right)) => ReferenceCounter::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some((&node.key, &node.value))
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some((&node.key, &node.value))
    }

    /// Returns a lazy iterator over entries in ascending key order.
    ///
    /// The iterator is double-ended: `rev()` walks in descending order
    /// without collecting anything first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqmap::persistent::PersistentTreeMap;
    ///
    /// let map: PersistentTreeMap<i32, char> =
    ///     [(2, 'b'), (1, 'a'), (3, 'c')].into_iter().collect();
    ///
    /// let ascending: String = map.iter().map(|(_, value)| *value).collect();
    /// let descending: String = map.iter().rev().map(|(_, value)| *value).collect();
    /// assert_eq!(ascending, "abc");
    /// assert_eq!(descending, "cba");
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentTreeMapIterator<'_, K, V> {
        let mut iterator = PersistentTreeMapIterator {
            front: SmallVec::new(),
            back: SmallVec::new(),
            remaining: self.length,
        };
        iterator.descend_left(self.root.as_deref());
        iterator.descend_right(self.root.as_deref());
        iterator
    }

    /// Returns an iterator over keys in ascending order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values in ascending key order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.iter().map(|(_, value)| value)
    }
}

impl<K: Clone + Ord, V: Clone> PersistentTreeMap<K, V> {
    /// Creates a map containing a single key-value pair.
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().insert(key, value)
    }

    /// Returns a reference to the value stored under exactly `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqmap::persistent::PersistentTreeMap;
    ///
    /// let map = PersistentTreeMap::new().insert(7u64, "seven");
    /// assert_eq!(map.get(&7), Some(&"seven"));
    /// assert_eq!(map.get(&8), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut link = self.root.as_deref();
        while let Some(node) = link {
            link = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    /// Returns `true` if the map contains `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Inserts a key-value pair, replacing the value of an existing key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqmap::persistent::PersistentTreeMap;
    ///
    /// let first = PersistentTreeMap::new().insert(1, "one");
    /// let second = first.insert(1, "ONE");
    ///
    /// assert_eq!(first.get(&1), Some(&"one"));
    /// assert_eq!(second.get(&1), Some(&"ONE"));
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let (root, added) = Self::insert_into(self.root.as_ref(), key, value);
        Self {
            root: Some(root),
            length: if added { self.length + 1 } else { self.length },
        }
    }

    fn insert_into(
        link: Option<&ReferenceCounter<Node<K, V>>>,
        key: K,
        value: V,
    ) -> (ReferenceCounter<Node<K, V>>, bool) {
        let Some(node) = link else {
            return (join(key, value, None, None), true);
        };

        match key.cmp(&node.key) {
            Ordering::Less => {
                let (left, added) = Self::insert_into(node.left.as_ref(), key, value);
                let rebuilt = balance(node.key.clone(), node.value.clone(), Some(left), node.right.clone());
                (rebuilt, added)
            }
            Ordering::Greater => {
                let (right, added) = Self::insert_into(node.right.as_ref(), key, value);
                let rebuilt = balance(node.key.clone(), node.value.clone(), node.left.clone(), Some(right));
                (rebuilt, added)
            }
            Ordering::Equal => (join(key, value, node.left.clone(), node.right.clone()), false),
        }
    }

    /// Removes a key from the map.
    ///
    /// Removing an absent key returns a clone that shares the original root.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqmap::persistent::PersistentTreeMap;
    ///
    /// let map = PersistentTreeMap::new().insert(1, "one").insert(2, "two");
    /// let removed = map.remove(&1);
    ///
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(removed.len(), 1);
    /// assert_eq!(removed.get(&1), None);
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match Self::remove_from(self.root.as_ref(), key) {
            Some(root) => Self {
                root,
                length: self.length - 1,
            },
            None => self.clone(),
        }
    }

    /// Returns `None` when `key` is absent, otherwise the rebuilt subtree.
    fn remove_from<Q>(link: Option<&ReferenceCounter<Node<K, V>>>, key: &Q) -> Option<Link<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = link?;

        match key.cmp(node.key.borrow()) {
            Ordering::Less => {
                let left = Self::remove_from(node.left.as_ref(), key)?;
                Some(Some(balance(node.key.clone(), node.value.clone(), left, node.right.clone())))
            }
            Ordering::Greater => {
                let right = Self::remove_from(node.right.as_ref(), key)?;
                Some(Some(balance(node.key.clone(), node.value.clone(), node.left.clone(), right)))
            }
            Ordering::Equal => Some(match (&node.left, &node.right) {
                (None, only) | (only, None) => only.clone(),
                (Some(_), Some(right)) => {
                    let (successor_key, successor_value, rest) = Self::remove_min(right);
                    Some(balance(successor_key, successor_value, node.left.clone(), rest))
                }
            }),
        }
    }

    /// Detaches the smallest entry of a non-empty subtree.
    fn remove_min(node: &ReferenceCounter<Node<K, V>>) -> (K, V, Link<K, V>) {
        match &node.left {
            None => (node.key.clone(), node.value.clone(), node.right.clone()),
            Some(left) => {
                let (key, value, rest) = Self::remove_min(left);
                let rebuilt = balance(node.key.clone(), node.value.clone(), rest, node.right.clone());
                (key, value, Some(rebuilt))
            }
        }
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// A lazy, double-ended iterator over a [`PersistentTreeMap`] in key order.
///
/// Each end keeps its own spine of pending ancestors; `remaining` stops the
/// two ends once they have met.
pub struct PersistentTreeMapIterator<'a, K, V> {
    front: SmallVec<[&'a Node<K, V>; 24]>,
    back: SmallVec<[&'a Node<K, V>; 24]>,
    remaining: usize,
}

impl<K, V> Clone for PersistentTreeMapIterator<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            front: self.front.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> PersistentTreeMapIterator<'a, K, V> {
    fn descend_left(&mut self, mut link: Option<&'a Node<K, V>>) {
        while let Some(node) = link {
            self.front.push(node);
            link = node.left.as_deref();
        }
    }

    fn descend_right(&mut self, mut link: Option<&'a Node<K, V>>) {
        while let Some(node) = link {
            self.back.push(node);
            link = node.right.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for PersistentTreeMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front.pop()?;
        self.descend_left(node.right.as_deref());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for PersistentTreeMapIterator<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back.pop()?;
        self.descend_right(node.left.as_deref());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for PersistentTreeMapIterator<'_, K, V> {}

impl<K, V> std::iter::FusedIterator for PersistentTreeMapIterator<'_, K, V> {}

/// An owning iterator over a [`PersistentTreeMap`] in key order.
pub struct PersistentTreeMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for PersistentTreeMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for PersistentTreeMapIntoIterator<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for PersistentTreeMapIntoIterator<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for PersistentTreeMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Ord, V: Clone> FromIterator<(K, V)> for PersistentTreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |map, (key, value)| map.insert(key, value))
    }
}

impl<K: Clone, V: Clone> IntoIterator for PersistentTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = PersistentTreeMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let entries: Vec<(K, V)> = self
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        PersistentTreeMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentTreeMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for PersistentTreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && (self.ptr_eq(other) || self.iter().eq(other.iter()))
    }
}

impl<K: Eq, V: Eq> Eq for PersistentTreeMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PersistentTreeMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
