use std::collections::BTreeSet;

use lineage_graph::{CopyFlags, Orientation, PropertyGraph, VertexId};
use proptest::prelude::*;

/// Random DAG: edges only go from a lower to a higher vertex number.
fn arb_dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..12).prop_flat_map(|n| {
        let edge = (0..n, 0..n).prop_filter_map("forward edge", |(a, b)| {
            (a < b).then_some((a, b))
        });
        (Just(n), prop::collection::vec(edge, 0..30))
    })
}

fn build(n: usize, edges: &[(usize, usize)]) -> (PropertyGraph<usize, ()>, Vec<VertexId>) {
    let mut g = PropertyGraph::new(Orientation::ParentToChild);
    let ids: Vec<VertexId> = (0..n).map(|i| g.add_vertex_with(i)).collect();
    for &(a, b) in edges {
        g.add_edge(ids[a], ids[b]);
    }
    (g, ids)
}

fn reachability(g: &PropertyGraph<usize, ()>) -> BTreeSet<(VertexId, VertexId)> {
    g.vertices()
        .flat_map(|u| g.descendants(u).into_iter().map(move |v| (u, v)))
        .collect()
}

fn edges_of(g: &PropertyGraph<usize, ()>) -> BTreeSet<(VertexId, VertexId)> {
    g.edges().filter_map(|e| g.endpoints(e)).collect()
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn reduction_of_closure_preserves_reachability((n, edges) in arb_dag()) {
        let (g, _) = build(n, &edges);
        let closure = g.transitive_closure(CopyFlags::ALL);
        let reduced = closure.transitive_reduction();
        prop_assert!(reduced.acyclic);
        prop_assert_eq!(reachability(&reduced.graph), reachability(&g));
    }

    #[test]
    fn closure_edges_equal_reachability((n, edges) in arb_dag()) {
        let (g, _) = build(n, &edges);
        let closure = g.transitive_closure(CopyFlags::NONE);
        prop_assert_eq!(edges_of(&closure), reachability(&g));
    }

    #[test]
    fn reducing_twice_changes_nothing((n, edges) in arb_dag()) {
        let (g, _) = build(n, &edges);
        let once = g.transitive_reduction().graph;
        let twice = once.transitive_reduction();
        prop_assert!(twice.removed.is_empty());
        prop_assert_eq!(edges_of(&twice.graph), edges_of(&once));
    }

    #[test]
    fn topological_order_respects_every_edge((n, edges) in arb_dag()) {
        let (g, _) = build(n, &edges);
        let order = g.topological_sort();
        prop_assert_eq!(order.len(), n);
        let pos = |v: VertexId| order.iter().position(|&x| x == v);
        for (u, v) in edges_of(&g) {
            prop_assert!(pos(u) < pos(v));
        }
    }

    #[test]
    fn no_self_loops_ever(pairs in prop::collection::vec((0usize..6, 0usize..6), 0..40)) {
        let (g, _) = build(6, &pairs);
        for e in g.edges() {
            let (u, v) = g.endpoints(e).unwrap();
            prop_assert_ne!(u, v);
        }
    }
}
