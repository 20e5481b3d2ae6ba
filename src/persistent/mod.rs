//! Persistent (immutable) data structures.
//!
//! Every structure here shares unchanged nodes between versions, so deriving a
//! new version costs a path of fresh nodes instead of a full copy, and every
//! earlier version stays valid and unchanged.
//!
//! - [`PersistentHashMap`]: hash array mapped trie, the value store
//! - [`PersistentTreeMap`]: AVL tree, the ordering index
//! - [`OrderedMap`]: insertion-ordered map composed of the two above
//!
//! # Examples
//!
//! ```rust
//! use seqmap::persistent::{OrderedMap, PersistentHashMap, PersistentTreeMap};
//!
//! let store = PersistentHashMap::new().insert("k", 1);
//! let index = PersistentTreeMap::new().insert(0u64, "k");
//! assert_eq!(store.get("k"), Some(&1));
//! assert_eq!(index.first(), Some((&0, &"k")));
//!
//! let map = OrderedMap::new().assoc("k", 1);
//! let older = map.clone();
//! let newer = map.assoc("k", 2);
//! assert_eq!(older.get("k"), Some(&1));
//! assert_eq!(newer.get("k"), Some(&2));
//! ```
//!
//! # Thread Safety
//!
//! With the `arc` feature (enabled by default) nodes are shared through
//! [`std::sync::Arc`] and every structure is `Send + Sync` whenever its
//! contents are. Without it, [`std::rc::Rc`] is used and the structures stay
//! on one thread.

/// Shared ownership for structure nodes.
///
/// `Arc` when the `arc` feature is enabled, `Rc` otherwise.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

/// Position of a key in the insertion order of an [`OrderedMap`].
///
/// Issued from 0 upwards as new keys arrive and never reused within one
/// lineage of maps.
pub type SequenceNumber = u64;

mod builder;
mod error;
mod hashmap;
mod ordered_map;
mod treemap;

pub use builder::build;
pub use error::{IndexOutOfRange, OddArgumentCount, UnsupportedMutation};
pub use hashmap::PersistentHashMap;
pub use hashmap::PersistentHashMapIntoIterator;
pub use hashmap::PersistentHashMapIterator;
pub use ordered_map::OrderedMap;
pub use ordered_map::OrderedMapIntoIterator;
pub use ordered_map::OrderedMapIterator;
pub use treemap::PersistentTreeMap;
pub use treemap::PersistentTreeMapIntoIterator;
pub use treemap::PersistentTreeMapIterator;
