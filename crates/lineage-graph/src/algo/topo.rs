//! Topological ordering.
//!
//! Kahn's algorithm with a min-heap on vertex ids, so among vertices that
//! are ready at the same time the smallest id always comes first.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::Direction;
use tracing::debug;

use crate::graph::{PropertyGraph, VertexId};

impl<V, E> PropertyGraph<V, E> {
    /// Order vertices so that for every edge `u → v`, `u` precedes `v`.
    ///
    /// Returns an empty list when the graph contains a cycle. An empty graph
    /// also yields an empty list; use [`PropertyGraph::is_dag`] to tell the
    /// two apart.
    #[must_use]
    pub fn topological_sort(&self) -> Vec<VertexId> {
        let mut remaining: HashMap<VertexId, usize> = self
            .vertices()
            .map(|v| (v, self.in_degree(v)))
            .collect();

        let mut ready: BinaryHeap<Reverse<VertexId>> = remaining
            .iter()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(&v, _)| Reverse(v))
            .collect();

        let mut order = Vec::with_capacity(remaining.len());
        while let Some(Reverse(v)) = ready.pop() {
            order.push(v);
            for next in self.inner.neighbors_directed(v.slot, Direction::Outgoing) {
                let next = self.vertex_id(next);
                if let Some(deg) = remaining.get_mut(&next) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(Reverse(next));
                    }
                }
            }
        }

        if order.len() == self.vertex_count() {
            order
        } else {
            debug!(
                sorted = order.len(),
                total = self.vertex_count(),
                "topological sort found a cycle"
            );
            Vec::new()
        }
    }

    /// `true` if the graph has no directed cycle.
    #[must_use]
    pub fn is_dag(&self) -> bool {
        self.is_empty() || !self.topological_sort().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{Orientation, PropertyGraph};

    #[test]
    fn ties_are_broken_by_id() {
        let mut g: PropertyGraph<(), ()> = PropertyGraph::new(Orientation::ParentToChild);
        let a = g.add_vertex();
        let b = g.add_vertex();
        let c = g.add_vertex();
        let d = g.add_vertex();
        g.add_edge(c, a);
        g.add_edge(d, b);

        assert_eq!(g.topological_sort(), vec![c, a, d, b]);
    }

    #[test]
    fn cycle_yields_empty_order() {
        let mut g: PropertyGraph<(), ()> = PropertyGraph::default();
        let a = g.add_vertex();
        let b = g.add_vertex();
        let c = g.add_vertex();
        g.add_edge(a, b);
        g.add_edge(b, c);
        g.add_edge(c, b);

        assert!(g.topological_sort().is_empty());
        assert!(!g.is_dag());
    }

    #[test]
    fn empty_graph_is_a_dag() {
        let g: PropertyGraph<(), ()> = PropertyGraph::default();
        assert!(g.topological_sort().is_empty());
        assert!(g.is_dag());
    }
}
