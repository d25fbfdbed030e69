//! Transitive closure and transitive reduction.
//!
//! # Overview
//!
//! Both operations return a *new* graph that keeps the vertex ids of the
//! input, so a vertex id found in the result can be used to look up the
//! original properties and vice versa.
//!
//! - **Closure** adds an edge `u → v` for every pair where `v` is reachable
//!   from `u`. It works on any graph; cycles simply produce more edges
//!   (never a self-loop).
//! - **Reduction** removes every edge `u → v` for which another path
//!   `u → … → v` exists. It is only defined for DAGs; on cyclic input it
//!   returns an empty graph with `acyclic == false`.
//!
//! # Algorithm
//!
//! Reachability is kept as one bitset per vertex slot. For reduction the
//! sets are filled in reverse topological order (sinks first), so each
//! vertex folds in the finished sets of its successors.

#![allow(clippy::module_name_repetitions)]

use fixedbitset::FixedBitSet;
use petgraph::Direction;
use tracing::warn;

use crate::graph::{EdgeId, PropertyGraph, VertexId};

/// Which property payloads a derived graph copies from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyFlags {
    pub vertex_properties: bool,
    pub edge_properties: bool,
}

impl CopyFlags {
    /// Copy both vertex and edge properties.
    pub const ALL: Self = Self {
        vertex_properties: true,
        edge_properties: true,
    };
    /// Copy topology only; every payload is `Default`.
    pub const NONE: Self = Self {
        vertex_properties: false,
        edge_properties: false,
    };
}

/// Result of [`PropertyGraph::transitive_reduction`].
#[derive(Debug, Clone)]
pub struct Reduction<V, E> {
    /// The reduced graph. Empty when the input was not a DAG.
    pub graph: PropertyGraph<V, E>,
    /// Edges of the *input* graph that the reduction dropped.
    pub removed: Vec<EdgeId>,
    /// `false` when the input contained a cycle.
    pub acyclic: bool,
}

impl<V, E> PropertyGraph<V, E> {
    /// Copy the graph, keeping ids, with payloads selected by `flags`.
    #[must_use]
    pub fn copy_with(&self, flags: CopyFlags) -> Self
    where
        V: Clone + Default,
        E: Clone + Default,
    {
        let inner = self.inner.map(
            |_, v| {
                if flags.vertex_properties {
                    v.clone()
                } else {
                    V::default()
                }
            },
            |_, e| {
                if flags.edge_properties {
                    e.clone()
                } else {
                    E::default()
                }
            },
        );
        self.with_inner(inner)
    }

    /// Vertices reachable from `v` through outbound edges, as a bitset over
    /// slot indices. `v` itself is only included if it lies on a cycle.
    pub(crate) fn outbound_reach(&self, v: VertexId) -> FixedBitSet {
        let mut seen = self.empty_set();
        let mut stack: Vec<VertexId> = vec![v];
        while let Some(current) = stack.pop() {
            for next in self.inner.neighbors_directed(current.slot, Direction::Outgoing) {
                if !seen.put(next.index()) {
                    stack.push(self.vertex_id(next));
                }
            }
        }
        seen
    }

    /// Graph with an edge `u → v` for every `v` reachable from `u`.
    ///
    /// Vertex ids are preserved. Edges already present keep their payload
    /// when `flags.edge_properties` is set; added edges get `E::default()`.
    #[must_use]
    pub fn transitive_closure(&self, flags: CopyFlags) -> Self
    where
        V: Clone + Default,
        E: Clone + Default,
    {
        let mut closure = self.copy_with(flags);
        for u in self.vertices() {
            let reach = self.outbound_reach(u);
            for v in self.set_to_vertices(&reach) {
                if v != u {
                    closure.add_edge(u, v);
                }
            }
        }
        closure
    }

    /// Minimal-edge graph with the same reachability relation.
    ///
    /// Payloads of kept vertices and edges are cloned. On cyclic input the
    /// returned graph is empty, `removed` is empty and `acyclic` is `false`.
    #[must_use]
    pub fn transitive_reduction(&self) -> Reduction<V, E>
    where
        V: Clone,
        E: Clone,
    {
        let topo = self.topological_sort();
        if topo.is_empty() && !self.is_empty() {
            warn!(
                vertices = self.vertex_count(),
                edges = self.edge_count(),
                "transitive reduction requested on a graph that is not a DAG"
            );
            return Reduction {
                graph: Self::new(self.orientation()),
                removed: Vec::new(),
                acyclic: false,
            };
        }

        // reach[u] = everything reachable from u in one or more steps.
        let bound = self.slot_bound();
        let mut reach: Vec<FixedBitSet> = vec![FixedBitSet::with_capacity(bound); bound];
        for &u in topo.iter().rev() {
            let mut acc = FixedBitSet::with_capacity(bound);
            for w in self.inner.neighbors_directed(u.slot, Direction::Outgoing) {
                acc.insert(w.index());
                acc.union_with(&reach[w.index()]);
            }
            reach[u.index()] = acc;
        }

        // u → v is redundant if v is reachable from another successor of u.
        let removed: Vec<EdgeId> = self
            .edges()
            .filter(|&e| {
                self.endpoints(e).is_some_and(|(u, v)| {
                    self.inner
                        .neighbors_directed(u.slot, Direction::Outgoing)
                        .filter(|&w| w != v.slot)
                        .any(|w| reach[w.index()].contains(v.index()))
                })
            })
            .collect();

        let mut graph = self.clone();
        for &e in &removed {
            graph.remove_edge(e);
        }

        Reduction {
            graph,
            removed,
            acyclic: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
