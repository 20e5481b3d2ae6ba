//! Construction of [`OrderedMap`] from literal argument lists.
//!
//! Two entry points are offered:
//!
//! - [`build`]: a flat run of alternating keys and values of one type,
//!   checked at runtime
//! - [`ordered_map!`](crate::ordered_map): paired `key => value` syntax,
//!   checked at compile time, with independent key and value types
//!
//! Both fold [`OrderedMap::assoc`] over the input from the empty map, so a key
//! that appears twice keeps its first position and its last value.

use std::fmt;
use std::hash::Hash;

use super::{OddArgumentCount, OrderedMap};

/// Builds an ordered map from alternating keys and values.
///
/// # Errors
///
/// Returns [`OddArgumentCount`] carrying the last element when the input has
/// an odd length.
///
/// # Examples
///
/// ```rust
/// use seqmap::persistent::build;
///
/// let map = build(["host", "localhost", "port", "8080"]).unwrap();
/// assert_eq!(map.get("port"), Some(&"8080"));
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["host", "port"]);
///
/// assert!(build(Vec::<&str>::new()).unwrap().is_empty());
/// ```
pub fn build<T, I>(arguments: I) -> Result<OrderedMap<T, T>, OddArgumentCount<T>>
where
    T: Clone + Hash + Eq + fmt::Debug,
    I: IntoIterator<Item = T>,
{
    let mut arguments = arguments.into_iter();
    let mut map = OrderedMap::new();
    let mut pairs = 0usize;

    while let Some(key) = arguments.next() {
        let Some(value) = arguments.next() else {
            tracing::debug!(
                trailing = ?key,
                pairs,
                "builder received an odd number of arguments"
            );
            return Err(OddArgumentCount { trailing: key });
        };
        map = map.assoc(key, value);
        pairs += 1;
    }

    tracing::trace!(pairs, entries = map.len(), "built ordered map");
    Ok(map)
}

/// Creates an [`OrderedMap`](crate::persistent::OrderedMap) from
/// `key => value` pairs, in the order written.
///
/// # Examples
///
/// ```rust
/// use seqmap::ordered_map;
/// use seqmap::persistent::OrderedMap;
///
/// let map = ordered_map! {
///     "width" => 640,
///     "height" => 480,
/// };
/// assert_eq!(map.nth(1), Ok((&"height", &480)));
///
/// let empty: OrderedMap<String, bool> = ordered_map! {};
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! ordered_map {
    () => {
        $crate::persistent::OrderedMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::persistent::OrderedMap::new()
            $(.assoc($key, $value))+
    };
}
