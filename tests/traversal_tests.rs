#![cfg(feature = "capability")]
//! Deterministic parent/child walks driven by `OrderedMap`.
//!
//! Adjacency is stored as ordered maps so every walk visits neighbours in the
//! order the relations were recorded, independent of key hashing.

use std::collections::VecDeque;

use rstest::{fixture, rstest};
use seqmap::capability::Sequential;
use seqmap::persistent::OrderedMap;

type Children = OrderedMap<&'static str, u32>;
type Graph = OrderedMap<&'static str, Children>;

fn relate(graph: &Graph, parent: &'static str, child: &'static str, weight: u32) -> Graph {
    let children = graph.get(parent).cloned().unwrap_or_default();
    graph.assoc(parent, children.assoc(child, weight))
}

fn breadth_first(graph: &Graph, root: &'static str) -> Vec<&'static str> {
    let mut visited: OrderedMap<&'static str, ()> = OrderedMap::new();
    let mut queue = VecDeque::from([root]);

    while let Some(node) = queue.pop_front() {
        if visited.contains_key(node) {
            continue;
        }
        visited = visited.assoc(node, ());
        if let Some(children) = graph.get(node) {
            queue.extend(children.keys().copied());
        }
    }

    visited.keys().copied().collect()
}

/// Builds the child to parent relation, visiting parents in the order they
/// were recorded.
fn invert(graph: &Graph) -> Graph {
    graph.seq().fold(OrderedMap::new(), |inverse, (parent, children)| {
        children
            .seq()
            .fold(inverse, |inverse, (child, weight)| relate(&inverse, *child, *parent, *weight))
    })
}

#[fixture]
fn graph() -> Graph {
    let edges = [
        ("root", "zeta", 1),
        ("root", "alpha", 2),
        ("root", "mid", 3),
        ("alpha", "leaf", 4),
        ("zeta", "leaf", 5),
        ("mid", "alpha", 6),
    ];
    edges
        .into_iter()
        .fold(OrderedMap::new(), |graph, (parent, child, weight)| {
            relate(&graph, parent, child, weight)
        })
}

#[rstest]
fn test_children_visited_in_recorded_order(graph: Graph) {
    assert_eq!(breadth_first(&graph, "root"), vec!["root", "zeta", "alpha", "mid", "leaf"]);
}

#[rstest]
fn test_walk_is_repeatable(graph: Graph) {
    let first = breadth_first(&graph, "root");
    let second = breadth_first(&graph.clone(), "root");

    assert_eq!(first, second);
}

#[rstest]
fn test_inverse_relation_keeps_discovery_order(graph: Graph) {
    let parents = invert(&graph);
    let leaf_parents: Vec<&str> = parents
        .get("leaf")
        .map(|found| found.keys().copied().collect())
        .unwrap_or_default();

    assert_eq!(leaf_parents, vec!["alpha", "zeta"]);
    assert_eq!(parents.get("alpha").and_then(|found| found.get("mid")), Some(&6));
}

#[rstest]
fn test_detaching_a_child_leaves_other_versions_alone(graph: Graph) {
    let pruned = graph.assoc("root", graph.get("root").cloned().unwrap_or_default().dissoc("zeta"));

    assert_eq!(breadth_first(&pruned, "root"), vec!["root", "alpha", "mid", "leaf"]);
    assert_eq!(breadth_first(&graph, "root"), vec!["root", "zeta", "alpha", "mid", "leaf"]);
}

#[rstest]
fn test_last_child_through_sequential_capability(graph: Graph) {
    fn last_key<S: Sequential<&'static str, u32>>(children: &S) -> Option<&'static str> {
        children.rseq().next().map(|(key, _)| *key)
    }

    assert_eq!(graph.get("root").and_then(last_key), Some("mid"));
}
