//! Persistent (immutable) hash map based on a HAMT.
//!
//! [`PersistentHashMap`] is the value store behind
//! [`OrderedMap`](super::OrderedMap) and also serves as its key-to-sequence
//! reverse index. It carries no ordering responsibility of its own: iteration
//! follows the trie layout, which depends only on key hashes.
//!
//! # Overview
//!
//! - O(log32 N) `get`, `insert`, `remove`
//! - O(1) `len` and `is_empty`
//! - Lazy iteration without intermediate allocation
//!
//! Every write copies the path from the root to the touched slot and shares
//! everything else with the previous version.
//!
//! # Examples
//!
//! ```rust
//! use seqmap::persistent::PersistentHashMap;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2);
//!
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));
//! assert_eq!(updated.get("one"), Some(&100));
//! ```
//!
//! # Internal Structure
//!
//! - 32-way branching, 5 hash bits per level
//! - A bitmap per branch records which of the 32 slots are occupied, and
//!   only occupied slots are stored
//! - Leaves keep their full hash so splitting a slot never rehashes a key
//! - Keys whose 64-bit hashes are identical share a collision node

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::slice;

use smallvec::SmallVec;

use super::ReferenceCounter;

// =============================================================================
// Constants
// =============================================================================

/// Hash bits consumed per trie level.
const BITS_PER_LEVEL: usize = 5;

/// Mask selecting one level's worth of hash bits.
const LEVEL_MASK: u64 = (1 << BITS_PER_LEVEL) - 1;

// =============================================================================
// Hash computation
// =============================================================================

#[cfg(feature = "fxhash")]
type KeyHasher = rustc_hash::FxHasher;

#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
type KeyHasher = ahash::AHasher;

#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
type KeyHasher = std::collections::hash_map::DefaultHasher;

/// Hashes a value with the hasher selected by the crate features.
///
/// The result is stable for the lifetime of the process, which is all the
/// trie needs.
pub(crate) fn hash_of<Q: Hash + ?Sized>(value: &Q) -> u64 {
    let mut hasher = KeyHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Slot index of `hash` at trie level `depth`.
///
/// Two distinct 64-bit hashes always diverge before `depth` reaches 13, so the
/// shift never overflows.
#[inline]
const fn slot_index(hash: u64, depth: usize) -> u32 {
    ((hash >> (depth * BITS_PER_LEVEL)) & LEVEL_MASK) as u32
}

/// Position of `bit` inside the compressed slot array of a branch.
#[inline]
const fn compressed_position(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

// =============================================================================
// Node Definition
// =============================================================================

#[derive(Clone)]
enum Node<K, V> {
    Branch {
        bitmap: u32,
        slots: ReferenceCounter<[Slot<K, V>]>,
    },
    Collision {
        hash: u64,
        entries: ReferenceCounter<[(K, V)]>,
    },
}

#[derive(Clone)]
enum Slot<K, V> {
    Leaf { hash: u64, key: K, value: V },
    Child(ReferenceCounter<Node<K, V>>),
}

/// Outcome of removing a key from a subtree.
enum Removal<K, V> {
    /// The subtree held only the removed key.
    Emptied,
    /// The subtree shrank to a single entry, which the parent inlines.
    Collapsed { hash: u64, key: K, value: V },
    /// The subtree still holds several entries.
    Shrunk(Node<K, V>),
}

impl<K, V> Node<K, V> {
    fn branch(bitmap: u32, slots: Vec<Slot<K, V>>) -> Self {
        Self::Branch {
            bitmap,
            slots: ReferenceCounter::from(slots),
        }
    }
}

// =============================================================================
// PersistentHashMap Definition
// =============================================================================

/// A persistent (immutable) hash map based on a HAMT.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `new`          | O(1)              |
/// | `get`          | O(log32 N)        |
/// | `insert`       | O(log32 N)        |
/// | `remove`       | O(log32 N)        |
/// | `len`          | O(1)              |
///
/// # Examples
///
/// ```rust
/// use seqmap::persistent::PersistentHashMap;
///
/// let map = PersistentHashMap::singleton("key".to_string(), 42);
/// assert_eq!(map.get("key"), Some(&42));
/// assert_eq!(map.remove("key").len(), 0);
/// ```
pub struct PersistentHashMap<K, V> {
    root: Option<ReferenceCounter<Node<K, V>>>,
    length: usize,
}

impl<K, V> Clone for PersistentHashMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            length: self.length,
        }
    }
}

impl<K, V> PersistentHashMap<K, V> {
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
    ///
    /// Two maps that share a root are guaranteed to be equal; the converse
    /// does not hold.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(left), Some(right)) => ReferenceCounter::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Returns a lazy iterator over key-value pairs in trie order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqmap::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert(1, 10).insert(2, 20);
    /// let total: i32 = map.iter().map(|(_, value)| value).sum();
    /// assert_eq!(total, 30);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentHashMapIterator<'_, K, V> {
        let mut cursors = SmallVec::new();
        if let Some(root) = &self.root {
            cursors.push(Cursor::over(root));
        }
        PersistentHashMapIterator {
            cursors,
            remaining: self.length,
        }
    }

    /// Returns an iterator over keys in trie order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values in trie order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

impl<K: Clone + Hash + Eq, V: Clone> PersistentHashMap<K, V> {
    /// Creates a map containing a single key-value pair.
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but `Hash` and
    /// `Eq` on the borrowed form must match those for the key type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqmap::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("hello".to_string(), 42);
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = hash_of(key);
        let mut node = self.root.as_deref()?;
        let mut depth = 0;

        loop {
            match node {
                Node::Branch { bitmap, slots } => {
                    let bit = 1u32 << slot_index(hash, depth);
                    if bitmap & bit == 0 {
                        return None;
                    }
                    match &slots[compressed_position(*bitmap, bit)] {
                        Slot::Leaf {
                            hash: leaf_hash,
                            key: leaf_key,
                            value,
                        } => {
                            return (*leaf_hash == hash && leaf_key.borrow() == key)
                                .then_some(value);
                        }
                        Slot::Child(child) => {
                            node = &**child;
                            depth += 1;
                        }
                    }
                }
                Node::Collision {
                    hash: collision_hash,
                    entries,
                } => {
                    if *collision_hash != hash {
                        return None;
                    }
                    return entries
                        .iter()
                        .find(|(entry_key, _)| entry_key.borrow() == key)
                        .map(|(_, value)| value);
                }
            }
        }
    }

    /// Returns the value for `key`, or `default` when the key is absent.
    #[must_use]
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns `true` if the map contains a value for the specified key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Inserts a key-value pair, replacing the value of an existing key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqmap::persistent::PersistentHashMap;
    ///
    /// let first = PersistentHashMap::new().insert("key".to_string(), 1);
    /// let second = first.insert("key".to_string(), 2);
    ///
    /// assert_eq!(first.get("key"), Some(&1));
    /// assert_eq!(second.get("key"), Some(&2));
    /// assert_eq!(second.len(), 1);
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let hash = hash_of(&key);
        let (root, added) = match self.root.as_deref() {
            None => {
                let leaf = Slot::Leaf { hash, key, value };
                (Node::branch(1 << slot_index(hash, 0), vec![leaf]), true)
            }
            Some(root) => Self::insert_into(root, hash, key, value, 0),
        };

        Self {
            root: Some(ReferenceCounter::new(root)),
            length: if added { self.length + 1 } else { self.length },
        }
    }

    /// Returns the rewritten node and whether a new key was added.
    fn insert_into(node: &Node<K, V>, hash: u64, key: K, value: V, depth: usize) -> (Node<K, V>, bool) {
        match node {
            Node::Branch { bitmap, slots } => {
                let bit = 1u32 << slot_index(hash, depth);
                let position = compressed_position(*bitmap, bit);
                let mut new_slots = slots.to_vec();

                if bitmap & bit == 0 {
                    new_slots.insert(position, Slot::Leaf { hash, key, value });
                    return (Node::branch(bitmap | bit, new_slots), true);
                }

                let (replacement, added) = match &slots[position] {
                    Slot::Leaf {
                        hash: leaf_hash,
                        key: leaf_key,
                        value: leaf_value,
                    } => {
                        if *leaf_hash == hash && *leaf_key == key {
                            (Slot::Leaf { hash, key, value }, false)
                        } else {
                            let split = Self::split_leaves(
                                (*leaf_hash, leaf_key.clone(), leaf_value.clone()),
                                (hash, key, value),
                                depth + 1,
                            );
                            (Slot::Child(ReferenceCounter::new(split)), true)
                        }
                    }
                    Slot::Child(child) => {
                        let (new_child, added) = Self::insert_into(child, hash, key, value, depth + 1);
                        (Slot::Child(ReferenceCounter::new(new_child)), added)
                    }
                };

                new_slots[position] = replacement;
                (Node::branch(*bitmap, new_slots), added)
            }
            Node::Collision {
                hash: collision_hash,
                entries,
            } => {
                if *collision_hash == hash {
                    let mut new_entries = entries.to_vec();
                    let added = match new_entries.iter_mut().find(|(entry_key, _)| *entry_key == key) {
                        Some(entry) => {
                            entry.1 = value;
                            false
                        }
                        None => {
                            new_entries.push((key, value));
                            true
                        }
                    };
                    let node = Node::Collision {
                        hash,
                        entries: ReferenceCounter::from(new_entries),
                    };
                    (node, added)
                } else {
                    // Push the collision one level down behind a branch, then
                    // insert the new key into that branch.
                    let wrapper = Node::branch(
                        1 << slot_index(*collision_hash, depth),
                        vec![Slot::Child(ReferenceCounter::new(node.clone()))],
                    );
                    Self::insert_into(&wrapper, hash, key, value, depth)
                }
            }
        }
    }

    /// Builds the smallest subtree at `depth` holding two distinct keys.
    fn split_leaves(existing: (u64, K, V), incoming: (u64, K, V), depth: usize) -> Node<K, V> {
        let (existing_hash, existing_key, existing_value) = existing;
        let (incoming_hash, incoming_key, incoming_value) = incoming;

        if existing_hash == incoming_hash {
            return Node::Collision {
                hash: existing_hash,
                entries: ReferenceCounter::from(vec![
                    (existing_key, existing_value),
                    (incoming_key, incoming_value),
                ]),
            };
        }

        let existing_index = slot_index(existing_hash, depth);
        let incoming_index = slot_index(incoming_hash, depth);

        if existing_index == incoming_index {
            let child = Self::split_leaves(
                (existing_hash, existing_key, existing_value),
                (incoming_hash, incoming_key, incoming_value),
                depth + 1,
            );
            return Node::branch(
                1 << existing_index,
                vec![Slot::Child(ReferenceCounter::new(child))],
            );
        }

        let existing_leaf = Slot::Leaf {
            hash: existing_hash,
            key: existing_key,
            value: existing_value,
        };
        let incoming_leaf = Slot::Leaf {
            hash: incoming_hash,
            key: incoming_key,
            value: incoming_value,
        };
        let slots = if existing_index < incoming_index {
            vec![existing_leaf, incoming_leaf]
        } else {
            vec![incoming_leaf, existing_leaf]
        };
        Node::branch((1 << existing_index) | (1 << incoming_index), slots)
    }

    /// Removes a key from the map.
    ///
    /// Removing an absent key returns a clone that shares the original root.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqmap::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    /// let removed = map.remove("a");
    ///
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(removed.len(), 1);
    /// assert_eq!(removed.get("a"), None);
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(root) = self.root.as_deref() else {
            return self.clone();
        };

        let hash = hash_of(key);
        let root = match Self::remove_from(root, hash, key, 0) {
            None => return self.clone(),
            Some(Removal::Emptied) => None,
            // The root is never inlined into a parent, so a collapsed root
            // becomes a branch with a single leaf.
            Some(Removal::Collapsed { hash, key, value }) => Some(Node::branch(
                1 << slot_index(hash, 0),
                vec![Slot::Leaf { hash, key, value }],
            )),
            Some(Removal::Shrunk(node)) => Some(node),
        };

        Self {
            root: root.map(ReferenceCounter::new),
            length: self.length - 1,
        }
    }

    /// Returns `None` when the key is not present below `node`.
    fn remove_from<Q>(node: &Node<K, V>, hash: u64, key: &Q, depth: usize) -> Option<Removal<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match node {
            Node::Branch { bitmap, slots } => {
                let bit = 1u32 << slot_index(hash, depth);
                if bitmap & bit == 0 {
                    return None;
                }
                let position = compressed_position(*bitmap, bit);

                match &slots[position] {
                    Slot::Leaf {
                        hash: leaf_hash,
                        key: leaf_key,
                        ..
                    } => {
                        if *leaf_hash != hash || leaf_key.borrow() != key {
                            return None;
                        }
                        let mut new_slots = slots.to_vec();
                        new_slots.remove(position);
                        Some(Self::shrink_branch(bitmap & !bit, new_slots))
                    }
                    Slot::Child(child) => {
                        let removal = Self::remove_from(child, hash, key, depth + 1)?;
                        let mut new_slots = slots.to_vec();
                        match removal {
                            Removal::Emptied => {
                                new_slots.remove(position);
                                Some(Self::shrink_branch(bitmap & !bit, new_slots))
                            }
                            Removal::Collapsed { hash, key, value } => {
                                new_slots[position] = Slot::Leaf { hash, key, value };
                                Some(Self::shrink_branch(*bitmap, new_slots))
                            }
                            Removal::Shrunk(new_child) => {
                                new_slots[position] = Slot::Child(ReferenceCounter::new(new_child));
                                Some(Removal::Shrunk(Node::branch(*bitmap, new_slots)))
                            }
                        }
                    }
                }
            }
            Node::Collision {
                hash: collision_hash,
                entries,
            } => {
                if *collision_hash != hash {
                    return None;
                }
                let position = entries
                    .iter()
                    .position(|(entry_key, _)| entry_key.borrow() == key)?;
                let mut remaining = entries.to_vec();
                remaining.remove(position);

                if remaining.len() == 1 {
                    let (key, value) = remaining.remove(0);
                    Some(Removal::Collapsed {
                        hash: *collision_hash,
                        key,
                        value,
                    })
                } else {
                    Some(Removal::Shrunk(Node::Collision {
                        hash: *collision_hash,
                        entries: ReferenceCounter::from(remaining),
                    }))
                }
            }
        }
    }

    /// Keeps the trie canonical: a branch left with one leaf is inlined.
    fn shrink_branch(bitmap: u32, mut slots: Vec<Slot<K, V>>) -> Removal<K, V> {
        if slots.len() == 1 {
            match slots.pop() {
                Some(Slot::Leaf { hash, key, value }) => {
                    return Removal::Collapsed { hash, key, value };
                }
                Some(child) => slots.push(child),
                None => {}
            }
        }

        if slots.is_empty() {
            Removal::Emptied
        } else {
            Removal::Shrunk(Node::branch(bitmap, slots))
        }
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

enum Cursor<'a, K, V> {
    Slots(slice::Iter<'a, Slot<K, V>>),
    Entries(slice::Iter<'a, (K, V)>),
}

impl<'a, K, V> Cursor<'a, K, V> {
    fn over(node: &'a Node<K, V>) -> Self {
        match node {
            Node::Branch { slots, .. } => Self::Slots(slots.iter()),
            Node::Collision { entries, .. } => Self::Entries(entries.iter()),
        }
    }
}

enum Step<'a, K, V> {
    Yield(&'a K, &'a V),
    Descend(&'a Node<K, V>),
    Ascend,
}

/// A lazy iterator over key-value pairs of a [`PersistentHashMap`].
///
/// The trie is at most 13 levels deep, so the cursor stack stays inline.
pub struct PersistentHashMapIterator<'a, K, V> {
    cursors: SmallVec<[Cursor<'a, K, V>; 8]>,
    remaining: usize,
}

impl<'a, K, V> Iterator for PersistentHashMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let step = match self.cursors.last_mut()? {
                Cursor::Slots(slots) => match slots.next() {
                    Some(Slot::Leaf { key, value, .. }) => Step::Yield(key, value),
                    Some(Slot::Child(child)) => Step::Descend(&**child),
                    None => Step::Ascend,
                },
                Cursor::Entries(entries) => match entries.next() {
                    Some((key, value)) => Step::Yield(key, value),
                    None => Step::Ascend,
                },
            };

            match step {
                Step::Yield(key, value) => {
                    self.remaining -= 1;
                    return Some((key, value));
                }
                Step::Descend(node) => self.cursors.push(Cursor::over(node)),
                Step::Ascend => {
                    self.cursors.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIterator<'_, K, V> {}

/// An owning iterator over key-value pairs of a [`PersistentHashMap`].
pub struct PersistentHashMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for PersistentHashMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIntoIterator<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for PersistentHashMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> FromIterator<(K, V)> for PersistentHashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |map, (key, value)| map.insert(key, value))
    }
}

impl<K: Clone, V: Clone> IntoIterator for PersistentHashMap<K, V> {
    type Item = (K, V);
    type IntoIter = PersistentHashMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let entries: Vec<(K, V)> = self
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        PersistentHashMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentHashMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentHashMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone + Hash + Eq, V: Clone + PartialEq> PartialEq for PersistentHashMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length
            && (self.ptr_eq(other)
                || self
                    .iter()
                    .all(|(key, value)| other.get(key) == Some(value)))
    }
}

impl<K: Clone + Hash + Eq, V: Clone + Eq> Eq for PersistentHashMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PersistentHashMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
