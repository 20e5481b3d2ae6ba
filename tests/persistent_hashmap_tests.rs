#![cfg(feature = "persistent")]
//! Integration tests for `PersistentHashMap`, the value store and reverse
//! index behind `OrderedMap`.

use rstest::rstest;
use seqmap::persistent::PersistentHashMap;

// =============================================================================
// Construction
// =============================================================================

#[rstest]
fn test_singleton() {
    let map = PersistentHashMap::singleton("key", 7);

    assert_eq!(map.len(), 1);
    assert_eq!(map.get("key"), Some(&7));
}

#[rstest]
fn test_default_matches_new() {
    let map: PersistentHashMap<String, i32> = PersistentHashMap::default();

    assert_eq!(map, PersistentHashMap::new());
    assert!(map.iter().next().is_none());
}

// =============================================================================
// Updates
// =============================================================================

#[rstest]
#[case(1)]
#[case(33)]
#[case(1_025)]
#[case(5_000)]
fn test_insert_then_remove_half(#[case] size: u32) {
    let full: PersistentHashMap<u32, u32> = (0..size).map(|key| (key, key * 2)).collect();
    let half = (0..size).step_by(2).fold(full.clone(), |map, key| map.remove(&key));

    assert_eq!(full.len(), size as usize);
    assert_eq!(half.len(), (size / 2) as usize);
    for key in 0..size {
        let expected = (key % 2 == 1).then_some(key * 2);
        assert_eq!(half.get(&key).copied(), expected, "key {key}");
        assert_eq!(full.get(&key), Some(&(key * 2)));
    }
}

#[rstest]
fn test_update_does_not_change_length() {
    let map = PersistentHashMap::new().insert("a", 1).insert("a", 2);

    assert_eq!(map.len(), 1);
    assert_eq!(map.get("a"), Some(&2));
}

#[rstest]
fn test_remove_absent_equals_original() {
    let map: PersistentHashMap<i32, i32> = (0..100).map(|key| (key, key)).collect();

    assert!(map.remove(&1_000).ptr_eq(&map));
    assert_eq!(map.remove(&1_000), map);
}

#[rstest]
fn test_removal_order_does_not_matter() {
    let map: PersistentHashMap<i32, i32> = (0..300).map(|key| (key, key)).collect();
    let forward = (0..150).fold(map.clone(), |current, key| current.remove(&key));
    let backward = (0..150).rev().fold(map, |current, key| current.remove(&key));

    assert_eq!(forward, backward);
    assert_eq!(forward.len(), 150);
}

// =============================================================================
// Iteration
// =============================================================================

#[rstest]
fn test_iteration_visits_every_entry_once() {
    let map: PersistentHashMap<u16, u16> = (0..2_000).map(|key| (key, key)).collect();
    let mut seen: Vec<u16> = map.keys().copied().collect();
    seen.sort_unstable();

    assert_eq!(seen, (0..2_000).collect::<Vec<_>>());
    assert_eq!(map.values().map(|value| u32::from(*value)).sum::<u32>(), 1_999_000);
}

#[rstest]
fn test_owned_and_borrowed_iteration_agree() {
    let map: PersistentHashMap<String, usize> =
        ["x", "y", "z"].iter().map(|key| ((*key).to_string(), key.len())).collect();

    let mut borrowed: Vec<(String, usize)> =
        (&map).into_iter().map(|(key, value)| (key.clone(), *value)).collect();
    let mut owned: Vec<(String, usize)> = map.into_iter().collect();
    borrowed.sort();
    owned.sort();

    assert_eq!(borrowed, owned);
}

#[rstest]
fn test_debug_lists_entries() {
    let map = PersistentHashMap::singleton(1, "one");

    assert_eq!(format!("{map:?}"), "{1: \"one\"}");
}
