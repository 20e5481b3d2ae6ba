//! Capability traits that let generic code treat different maps alike.
//!
//! - [`Associative`]: key lookup plus non-destructive `assoc`/`dissoc`
//! - [`Sequential`]: ordered traversal in both directions and indexed access
//! - [`MutableMap`]: in-place mutation, which persistent maps refuse
//!
//! Each trait is implemented for the persistent containers of this crate and
//! for the matching standard library collections, so a function written
//! against a capability accepts either.
//!
//! # Examples
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use seqmap::capability::Associative;
//! use seqmap::persistent::OrderedMap;
//!
//! fn with_default<M: Associative<&'static str, u32>>(map: &M) -> M {
//!     if map.has_key(&"retries") { map.dissoc(&"unused") } else { map.assoc("retries", 3) }
//! }
//!
//! let ordered = with_default(&OrderedMap::new());
//! let hashed = with_default(&HashMap::new());
//! assert_eq!(ordered.lookup(&"retries"), hashed.lookup(&"retries"));
//! ```

mod associative;
mod mutable;
mod sequential;

pub use associative::Associative;
pub use mutable::MutableMap;
pub use sequential::Sequential;
