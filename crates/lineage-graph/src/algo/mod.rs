//! Graph algorithms over [`PropertyGraph`].
//!
//! Each sub-module adds an `impl` block to [`PropertyGraph`]:
//!
//! - [`topo`]: topological sort and DAG detection.
//! - [`closure`]: transitive closure and transitive reduction.
//! - [`paths`]: unit-weight shortest/longest paths and distances.
//! - [`dominators`]: dominator trees and dominated-vertex queries.
//! - [`traversal`]: reachability plus breadth-first and sorted depth-first
//!   display orderings.
//!
//! Algorithms that need acyclic input signal failure with an empty result
//! and a `warn` log line. None of them panic on cycles.

pub mod closure;
pub mod dominators;
pub mod paths;
pub mod topo;
pub mod traversal;

use fixedbitset::FixedBitSet;
use petgraph::visit::NodeIndexable;

use crate::graph::{PropertyGraph, VertexId};

impl<V, E> PropertyGraph<V, E> {
    /// Upper bound on vertex slot indices, for bitset sizing.
    pub(crate) fn slot_bound(&self) -> usize {
        NodeIndexable::node_bound(&self.inner)
    }

    pub(crate) fn empty_set(&self) -> FixedBitSet {
        FixedBitSet::with_capacity(self.slot_bound())
    }

    pub(crate) fn set_to_vertices(&self, set: &FixedBitSet) -> Vec<VertexId> {
        self.vertices().filter(|v| set.contains(v.index())).collect()
    }
}
