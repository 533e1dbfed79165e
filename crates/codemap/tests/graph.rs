//! Integration tests for dependency graph construction and traversal.
//!
//! These tests exercise the public `DependencyGraph` API:
//! - Idempotent edge insertion and location merging
//! - Depth-bounded callers and callees
//! - Termination and cycle detection on cyclic graphs

use std::time::{Duration, Instant};

use codemap::{CycleError, DependencyGraph, DependencyKind, Location};
use proptest::prelude::*;
use rstest::rstest;

/// Chain `a -> b -> c -> d -> e`.
fn chain() -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for (from, to) in [("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")] {
        graph.add_call(from, to);
    }
    graph
}

/// Complete digraph on `n` nodes: every node calls every other node.
fn complete(n: usize) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for from in 0..n {
        for to in 0..n {
            if from != to {
                graph.add_call(&format!("m.f{from}"), &format!("m.f{to}"));
            }
        }
    }
    graph
}

/// Triangle `a -> b -> c -> a`.
fn triangle() -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    graph.add_call("a", "b");
    graph.add_call("b", "c");
    graph.add_call("c", "a");
    graph
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn adding_same_dependency_twice_keeps_one_edge_and_location() {
    let mut graph = DependencyGraph::new();
    let site = Location::new("main.py", 10);

    for _ in 0..2 {
        graph.add_dependency(
            "main.run",
            "auth.validate",
            DependencyKind::Calls,
            Some(site.clone()),
        );
    }

    assert_eq!(graph.edge_count(), 1);
    assert_eq!(
        graph.edge("main.run", "auth.validate").unwrap().locations,
        vec![site]
    );
}

#[test]
fn edges_to_undeclared_symbols_create_stubs() {
    let mut graph = DependencyGraph::new();
    graph.add_call("main.run", "os.getenv");

    assert!(graph.has_node("os.getenv"));
    assert!(graph.node("os.getenv").unwrap().is_stub());
    assert_eq!(graph.get_nodes(), vec!["main.run", "os.getenv"]);
}

// ============================================================================
// Traversal
// ============================================================================

#[rstest]
#[case(Some(0), &[])]
#[case(Some(1), &["b"])]
#[case(Some(2), &["b", "c"])]
#[case(Some(4), &["b", "c", "d", "e"])]
#[case(None, &["b", "c", "d", "e"])]
fn callees_respect_depth(#[case] depth: Option<usize>, #[case] expected: &[&str]) {
    assert_eq!(chain().get_callees("a", depth), expected);
}

#[rstest]
#[case(Some(0), &["d"])]
#[case(Some(1), &["c", "d"])]
#[case(Some(2), &["b", "c", "d"])]
#[case(None, &["a", "b", "c", "d"])]
fn callers_respect_depth(#[case] depth: Option<usize>, #[case] expected: &[&str]) {
    assert_eq!(chain().get_callers("e", depth), expected);
}

#[test]
fn traversal_terminates_on_cycle() {
    let graph = triangle();

    assert_eq!(graph.get_callers("a", None), vec!["a", "b", "c"]);
    assert_eq!(graph.get_callees("a", None), vec!["a", "b", "c"]);
}

#[test]
fn traversal_stays_in_component() {
    let mut graph = chain();
    graph.add_call("x", "y");

    assert_eq!(graph.get_callees("x", None), vec!["y"]);
    assert!(graph.get_callers("x", None).is_empty());
}

// ============================================================================
// Cycles
// ============================================================================

#[test]
fn triangle_has_exactly_one_cycle() {
    assert_eq!(triangle().find_cycles(), vec![vec!["a", "b", "c"]]);
}

#[test]
fn acyclic_chain_has_no_cycles() {
    assert!(chain().find_cycles().is_empty());
}

#[test]
fn cycles_are_sorted_and_complete() {
    let mut graph = triangle();
    graph.add_call("b", "a");
    graph.add_call("d", "d");

    assert_eq!(
        graph.find_cycles(),
        vec![vec!["a", "b"], vec!["a", "b", "c"], vec!["d"]]
    );
}

/// Elementary cycles of the complete digraph on `n` nodes:
/// the sum over `k` of `C(n, k) * (k - 1)!`.
#[rstest]
#[case(3, 5)]
#[case(5, 84)]
#[case(8, 16_064)]
fn dense_graphs_list_every_cycle(#[case] n: usize, #[case] expected: usize) {
    let graph = complete(n);

    let cycles = graph.find_cycles();
    assert_eq!(cycles.len(), expected);
    assert_eq!(graph.try_find_cycles().unwrap().len(), expected);
}

#[test]
fn exceeding_the_limit_is_an_error() {
    let graph = complete(5);

    assert_eq!(
        graph.try_find_cycles_with_limit(50),
        Err(CycleError::LimitExceeded { limit: 50 })
    );
    assert_eq!(graph.try_find_cycles_with_limit(84).unwrap().len(), 84);
}

#[test]
fn exceeding_the_limit_degrades_to_empty_promptly() {
    // K9 has 125 664 elementary cycles.
    let graph = complete(9);
    assert!(graph.get_callers("m.f0", None).contains(&"m.f0".to_string()));

    let started = Instant::now();
    let cycles = graph.find_cycles_with_limit(1_000);

    assert!(cycles.is_empty());
    assert!(started.elapsed() < Duration::from_secs(10));
}

// ============================================================================
// Properties
// ============================================================================

fn edge_list() -> impl Strategy<Value = Vec<(u8, u8)>> {
    prop::collection::vec((0u8..12, 0u8..12), 0..40)
}

fn build(edges: &[(u8, u8)]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for (from, to) in edges {
        graph.add_call(&format!("n{from}"), &format!("n{to}"));
    }
    graph
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Re-adding every edge changes nothing.
    #[test]
    fn prop_insertion_is_idempotent(edges in edge_list()) {
        let once = build(&edges);
        let doubled: Vec<_> = edges.iter().chain(edges.iter()).copied().collect();
        let twice = build(&doubled);

        prop_assert_eq!(once.get_edges(), twice.get_edges());
        prop_assert_eq!(once.len(), twice.len());
    }

    /// A node is a caller of `x` exactly when `x` is one of its callees.
    #[test]
    fn prop_callers_and_callees_are_converse(edges in edge_list()) {
        let graph = build(&edges);
        for node in graph.get_nodes() {
            for caller in graph.get_callers(&node, None) {
                prop_assert!(graph.get_callees(&caller, None).contains(&node));
            }
        }
    }

    /// Bounded results are always a subset of the unbounded closure.
    #[test]
    fn prop_depth_bound_is_monotonic(edges in edge_list(), depth in 0usize..5) {
        let graph = build(&edges);
        for node in graph.get_nodes() {
            let shallow = graph.get_callees(&node, Some(depth));
            let deeper = graph.get_callees(&node, Some(depth + 1));
            let all = graph.get_callees(&node, None);
            prop_assert!(shallow.iter().all(|n| deeper.contains(n)));
            prop_assert!(deeper.iter().all(|n| all.contains(n)));
        }
    }

    /// Every reported cycle is a real cycle: each member reaches every other.
    #[test]
    fn prop_cycle_members_are_mutually_reachable(edges in edge_list()) {
        let graph = build(&edges);
        for cycle in graph.find_cycles() {
            for member in &cycle {
                let reachable = graph.get_callees(member, None);
                for other in &cycle {
                    prop_assert!(reachable.contains(other));
                }
            }
        }
    }
}
