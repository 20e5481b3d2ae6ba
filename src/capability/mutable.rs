//! In-place mutation, and its refusal by persistent containers.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use crate::persistent::{OrderedMap, PersistentHashMap, PersistentTreeMap, UnsupportedMutation};

/// Maps that can be changed where they stand.
///
/// The standard library maps implement every operation. The persistent maps
/// of this crate implement the trait only to reject each call with
/// [`UnsupportedMutation`] and leave themselves untouched; use their
/// non-destructive counterparts (`assoc`, `dissoc`, ...) instead.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
///
/// use seqmap::capability::MutableMap;
/// use seqmap::persistent::OrderedMap;
///
/// let mut scratch: HashMap<&str, i32> = HashMap::new();
/// assert_eq!(scratch.put("a", 1), Ok(None));
///
/// let mut frozen = OrderedMap::new().assoc("a", 1);
/// let error = frozen.put("a", 2).unwrap_err();
/// assert_eq!(error.operation, "put");
/// assert_eq!(frozen.get("a"), Some(&1));
/// ```
pub trait MutableMap<K, V> {
    /// Binds `key` to `value`, returning the value it replaced.
    ///
    /// # Errors
    ///
    /// [`UnsupportedMutation`] if the container is persistent.
    fn put(&mut self, key: K, value: V) -> Result<Option<V>, UnsupportedMutation>;

    /// Removes `key`, returning its value.
    ///
    /// # Errors
    ///
    /// [`UnsupportedMutation`] if the container is persistent.
    fn remove(&mut self, key: &K) -> Result<Option<V>, UnsupportedMutation>;

    /// Removes every entry.
    ///
    /// # Errors
    ///
    /// [`UnsupportedMutation`] if the container is persistent.
    fn clear(&mut self) -> Result<(), UnsupportedMutation>;

    /// Puts every pair of `entries` in turn.
    ///
    /// # Errors
    ///
    /// [`UnsupportedMutation`] if the container is persistent, even when
    /// `entries` is empty.
    fn put_all<I>(&mut self, entries: I) -> Result<(), UnsupportedMutation>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.put(key, value)?;
        }
        Ok(())
    }
}

impl<K, V, S> MutableMap<K, V> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn put(&mut self, key: K, value: V) -> Result<Option<V>, UnsupportedMutation> {
        Ok(self.insert(key, value))
    }

    fn remove(&mut self, key: &K) -> Result<Option<V>, UnsupportedMutation> {
        Ok(Self::remove(self, key))
    }

    fn clear(&mut self) -> Result<(), UnsupportedMutation> {
        Self::clear(self);
        Ok(())
    }
}

impl<K: Ord, V> MutableMap<K, V> for BTreeMap<K, V> {
    fn put(&mut self, key: K, value: V) -> Result<Option<V>, UnsupportedMutation> {
        Ok(self.insert(key, value))
    }

    fn remove(&mut self, key: &K) -> Result<Option<V>, UnsupportedMutation> {
        Ok(Self::remove(self, key))
    }

    fn clear(&mut self) -> Result<(), UnsupportedMutation> {
        Self::clear(self);
        Ok(())
    }
}

fn reject<T>(container: &'static str, operation: &'static str) -> Result<T, UnsupportedMutation> {
    tracing::debug!(container, operation, "rejected in-place mutation");
    Err(UnsupportedMutation {
        container,
        operation,
    })
}

macro_rules! reject_mutation {
    ($name:literal) => {
        fn put(&mut self, _key: K, _value: V) -> Result<Option<V>, UnsupportedMutation> {
            reject($name, "put")
        }

        fn remove(&mut self, _key: &K) -> Result<Option<V>, UnsupportedMutation> {
            reject($name, "remove")
        }

        fn clear(&mut self) -> Result<(), UnsupportedMutation> {
            reject($name, "clear")
        }

        fn put_all<I>(&mut self, _entries: I) -> Result<(), UnsupportedMutation>
        where
            I: IntoIterator<Item = (K, V)>,
        {
            reject($name, "put_all")
        }
    };
}

impl<K, V, M> MutableMap<K, V> for OrderedMap<K, V, M> {
    reject_mutation!("OrderedMap");
}

impl<K, V> MutableMap<K, V> for PersistentHashMap<K, V> {
    reject_mutation!("PersistentHashMap");
}

impl<K, V> MutableMap<K, V> for PersistentTreeMap<K, V> {
    reject_mutation!("PersistentTreeMap");
}
