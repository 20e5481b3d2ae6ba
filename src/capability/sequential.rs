//! Ordered traversal of key/value entries.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::hash::Hash;
use std::iter::{Map, Rev};
use std::slice;

use crate::persistent::{
    OrderedMap, OrderedMapIterator, PersistentTreeMap, PersistentTreeMapIterator,
};

/// Collections of pairs that have a defined traversal order.
///
/// What the order is depends on the implementor: insertion order for
/// [`OrderedMap`], key order for the sorted maps, element order for a vector
/// of pairs.
pub trait Sequential<K, V> {
    /// Iterator returned by [`seq`](Self::seq).
    type Iter<'a>: DoubleEndedIterator<Item = (&'a K, &'a V)>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    /// Walks the entries front to back.
    fn seq(&self) -> Self::Iter<'_>;

    /// Walks the entries back to front.
    fn rseq(&self) -> Rev<Self::Iter<'_>> {
        self.seq().rev()
    }

    /// Returns the entry at `index`.
    ///
    /// For [`OrderedMap`] `index` is a raw sequence number, see
    /// [`OrderedMap::nth`]. Everywhere else it is the ordinal position in
    /// [`seq`](Self::seq).
    fn nth_entry(&self, index: usize) -> Option<(&K, &V)>;
}

impl<K: Clone + Hash + Eq, V: Clone, M> Sequential<K, V> for OrderedMap<K, V, M> {
    type Iter<'a>
        = OrderedMapIterator<'a, K, V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    fn seq(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn nth_entry(&self, index: usize) -> Option<(&K, &V)> {
        self.get_nth(index)
    }
}

impl<K, V> Sequential<K, V> for PersistentTreeMap<K, V> {
    type Iter<'a>
        = PersistentTreeMapIterator<'a, K, V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    fn seq(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn nth_entry(&self, index: usize) -> Option<(&K, &V)> {
        self.iter().nth(index)
    }
}

impl<K, V> Sequential<K, V> for BTreeMap<K, V> {
    type Iter<'a>
        = btree_map::Iter<'a, K, V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    fn seq(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn nth_entry(&self, index: usize) -> Option<(&K, &V)> {
        self.iter().nth(index)
    }
}

fn split_pair<K, V>(pair: &(K, V)) -> (&K, &V) {
    (&pair.0, &pair.1)
}

impl<K, V> Sequential<K, V> for Vec<(K, V)> {
    type Iter<'a>
        = Map<slice::Iter<'a, (K, V)>, fn(&(K, V)) -> (&K, &V)>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    fn seq(&self) -> Self::Iter<'_> {
        let split: fn(&(K, V)) -> (&K, &V) = split_pair;
        self.as_slice().iter().map(split)
    }

    fn nth_entry(&self, index: usize) -> Option<(&K, &V)> {
        self.get(index).map(split_pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn keys_back_to_front<S: Sequential<u8, char>>(collection: &S) -> Vec<u8> {
        collection.rseq().map(|(key, _)| *key).collect()
    }

    #[rstest]
    fn each_implementor_reports_its_own_order() {
        let pairs = vec![(3u8, 'c'), (1, 'a'), (2, 'b')];
        let ordered: OrderedMap<u8, char> = pairs.iter().copied().collect();
        let sorted: BTreeMap<u8, char> = pairs.iter().copied().collect();
        let tree: PersistentTreeMap<u8, char> = pairs.iter().copied().collect();

        assert_eq!(keys_back_to_front(&pairs), vec![2, 1, 3]);
        assert_eq!(keys_back_to_front(&ordered), vec![2, 1, 3]);
        assert_eq!(keys_back_to_front(&sorted), vec![3, 2, 1]);
        assert_eq!(keys_back_to_front(&tree), vec![3, 2, 1]);
    }

    #[rstest]
    fn nth_entry_is_raw_for_ordered_map_and_ordinal_elsewhere() {
        let pairs = vec![(10u8, 'x'), (20, 'y'), (30, 'z')];
        let ordered: OrderedMap<u8, char> = pairs.iter().copied().collect();
        let ordered = ordered.dissoc(&10);
        let remaining = vec![(20u8, 'y'), (30, 'z')];

        assert_eq!(ordered.nth_entry(0), None);
        assert_eq!(ordered.nth_entry(1), Some((&20, &'y')));
        assert_eq!(remaining.nth_entry(0), Some((&20, &'y')));
        assert_eq!(remaining.nth_entry(2), None);
    }
}
