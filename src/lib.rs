//! # seqmap
//!
//! Persistent maps that iterate in the order keys were first inserted.
//!
//! ## Overview
//!
//! - [`persistent`]: the [`OrderedMap`](persistent::OrderedMap) facade, the
//!   hash array mapped trie and AVL tree it is built from, the
//!   [`build`](persistent::build) function and the [`ordered_map!`] macro
//! - [`capability`]: traits letting generic code accept an ordered map, a
//!   persistent hash map or a standard library map alike
//! - [`typeclass`]: [`Foldable`](typeclass::Foldable) and the
//!   [`TypeConstructor`](typeclass::TypeConstructor) it rests on
//!
//! Every operation is pure. Updating a map yields a new map that shares
//! unchanged structure with the old one, and the old one stays valid.
//!
//! ## Quick Start
//!
//! ```rust
//! use seqmap::prelude::*;
//!
//! let settings = ordered_map! {
//!     "name" => "server",
//!     "port" => "8080",
//! };
//! let tuned = settings.assoc("threads", "4").assoc("name", "edge");
//!
//! let keys: Vec<&&str> = tuned.keys().collect();
//! assert_eq!(keys, vec![&"name", &"port", &"threads"]);
//! assert_eq!(settings.get("name"), Some(&"server"));
//! assert_eq!(tuned.nth(2), Ok((&"threads", &"4")));
//! ```
//!
//! ## Feature Flags
//!
//! - `persistent`, `typeclass`, `capability`: the modules above (default)
//! - `arc`: share nodes through `Arc` so maps are `Send + Sync` (default)
//! - `serde`: `Serialize`/`Deserialize` for `OrderedMap`
//! - `fxhash` / `ahash`: faster key hashing in the trie

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// ```rust
/// use seqmap::prelude::*;
///
/// let map = OrderedMap::new().assoc(1, "one");
/// assert_eq!(map.lookup(&1), Some(&"one"));
/// ```
pub mod prelude {
    #[cfg(feature = "typeclass")]
    pub use crate::typeclass::*;

    #[cfg(feature = "persistent")]
    pub use crate::persistent::*;

    #[cfg(feature = "capability")]
    pub use crate::capability::*;

    #[cfg(feature = "persistent")]
    pub use crate::ordered_map;
}

#[cfg(feature = "typeclass")]
pub mod typeclass;

#[cfg(feature = "persistent")]
pub mod persistent;

#[cfg(feature = "capability")]
pub mod capability;
