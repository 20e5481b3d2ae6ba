#![cfg(feature = "persistent")]
//! Property-based tests for `OrderedMap`.
//!
//! A `Vec` of distinct keys in first-insertion order serves as the model the
//! map is checked against.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use proptest::prelude::*;
use seqmap::persistent::OrderedMap;
use seqmap::typeclass::Foldable;

// =============================================================================
// Strategies
// =============================================================================

#[derive(Debug, Clone)]
enum Operation {
    Assoc(u8, i32),
    Dissoc(u8),
}

fn arbitrary_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (any::<u8>(), any::<i32>()).prop_map(|(key, value)| Operation::Assoc(key % 64, value)),
        1 => any::<u8>().prop_map(|key| Operation::Dissoc(key % 64)),
    ]
}

fn arbitrary_operations() -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(arbitrary_operation(), 0..200)
}

fn arbitrary_entries() -> impl Strategy<Value = Vec<(String, i32)>> {
    prop::collection::vec(("[a-z]{1,6}", any::<i32>()), 0..60)
}

/// Applies `operations` to both the map and a model of it.
fn replay(operations: &[Operation]) -> (OrderedMap<u8, i32>, Vec<(u8, i32)>) {
    let mut model: Vec<(u8, i32)> = Vec::new();
    let map = operations
        .iter()
        .fold(OrderedMap::new(), |map, operation| match *operation {
            Operation::Assoc(key, value) => {
                match model.iter_mut().find(|(existing, _)| *existing == key) {
                    Some(entry) => entry.1 = value,
                    None => model.push((key, value)),
                }
                map.assoc(key, value)
            }
            Operation::Dissoc(key) => {
                model.retain(|(existing, _)| *existing != key);
                map.dissoc(&key)
            }
        });
    (map, model)
}

fn hash_value<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// =============================================================================
// Model Law: seq() equals the first-insertion-order model
// =============================================================================

proptest! {
    #[test]
    fn prop_seq_matches_model(operations in arbitrary_operations()) {
        let (map, model) = replay(&operations);
        let entries: Vec<(u8, i32)> = map.iter().map(|(key, value)| (*key, *value)).collect();

        prop_assert_eq!(entries, model.clone());
        prop_assert_eq!(map.count(), model.len());
    }
}

// =============================================================================
// Reverse Law: rseq() == reverse(seq())
// =============================================================================

proptest! {
    #[test]
    fn prop_rseq_is_reversed_seq(operations in arbitrary_operations()) {
        let (map, _) = replay(&operations);
        let mut forward: Vec<(&u8, &i32)> = map.seq().collect();
        forward.reverse();
        let backward: Vec<(&u8, &i32)> = map.rseq().collect();

        prop_assert_eq!(forward, backward);
    }
}

// =============================================================================
// Get-Assoc Law: map.assoc(k, v).get(&k) == Some(&v)
// =============================================================================

proptest! {
    #[test]
    fn prop_get_assoc(operations in arbitrary_operations(), key in 0u8..64, value in any::<i32>()) {
        let (map, _) = replay(&operations);
        let updated = map.assoc(key, value);

        prop_assert_eq!(updated.get(&key), Some(&value));
        for (other, other_value) in &map {
            if *other != key {
                prop_assert_eq!(updated.get(other), Some(other_value));
            }
        }
    }
}

// =============================================================================
// Dissoc Law: map.dissoc(&k).get(&k) == None, survivors keep order
// =============================================================================

proptest! {
    #[test]
    fn prop_dissoc_removes_only_key(operations in arbitrary_operations(), key in 0u8..64) {
        let (map, _) = replay(&operations);
        let removed = map.dissoc(&key);

        prop_assert!(!removed.contains_key(&key));
        prop_assert_eq!(removed.next_sequence(), map.next_sequence());

        let expected: Vec<&u8> = map.keys().filter(|other| **other != key).collect();
        let actual: Vec<&u8> = removed.keys().collect();
        prop_assert_eq!(actual, expected);
    }
}

// =============================================================================
// Identity Law: dissoc of an absent key shares the whole structure
// =============================================================================

proptest! {
    #[test]
    fn prop_dissoc_absent_is_identity(operations in arbitrary_operations()) {
        let (map, _) = replay(&operations);

        prop_assert!(map.dissoc(&200).ptr_eq(&map));
    }
}

// =============================================================================
// Order Independence: equality and hash ignore insertion order
// =============================================================================

proptest! {
    #[test]
    fn prop_equality_and_hash_ignore_order(entries in arbitrary_entries()) {
        let deduplicated: HashMap<String, i32> = entries.into_iter().collect();
        let pairs: Vec<(String, i32)> = deduplicated.into_iter().collect();

        let forward: OrderedMap<String, i32> = pairs.iter().cloned().collect();
        let backward: OrderedMap<String, i32> = pairs.iter().rev().cloned().collect();

        prop_assert_eq!(&forward, &backward);
        prop_assert_eq!(hash_value(&forward), hash_value(&backward));
    }
}

// =============================================================================
// Persistence: deriving a new version never changes the old one
// =============================================================================

proptest! {
    #[test]
    fn prop_old_version_is_unchanged(
        operations in arbitrary_operations(),
        more in arbitrary_operations()
    ) {
        let (map, model) = replay(&operations);
        let _derived = more.iter().fold(map.clone(), |current, operation| match *operation {
            Operation::Assoc(key, value) => current.assoc(key, value),
            Operation::Dissoc(key) => current.dissoc(&key),
        });

        let entries: Vec<(u8, i32)> = map.iter().map(|(key, value)| (*key, *value)).collect();
        prop_assert_eq!(entries, model);
    }
}

// =============================================================================
// Indexed Law: without removals nth(i) is the i-th inserted entry
// =============================================================================

proptest! {
    #[test]
    fn prop_nth_without_removals(keys in prop::collection::hash_set(any::<u16>(), 0..80)) {
        let keys: Vec<u16> = keys.into_iter().collect();
        let map: OrderedMap<u16, usize> = keys.iter().enumerate().map(|(index, key)| (*key, index)).collect();

        for (index, key) in keys.iter().enumerate() {
            prop_assert_eq!(map.nth(index), Ok((key, &index)));
        }
        prop_assert!(map.nth(keys.len()).is_err());
    }
}

// =============================================================================
// Foldable Law: fold_left visits values in seq() order
// =============================================================================

proptest! {
    #[test]
    fn prop_fold_left_follows_seq(operations in arbitrary_operations()) {
        let (map, model) = replay(&operations);
        let folded = map.fold_left(Vec::new(), |mut values, value| {
            values.push(value);
            values
        });
        let expected: Vec<i32> = model.into_iter().map(|(_, value)| value).collect();

        prop_assert_eq!(folded, expected);
    }
}
