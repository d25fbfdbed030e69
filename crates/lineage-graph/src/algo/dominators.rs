//! Dominator trees.
//!
//! # Overview
//!
//! A vertex `d` dominates `v` (relative to a fixed root) when every path from
//! the root to `v` passes through `d`. The immediate dominator of `v` is its
//! closest strict dominator; linking every vertex to its immediate dominator
//! yields the dominator tree.
//!
//! In a lineage graph this answers "which versions exist only because of
//! this one": the vertices dominated by `v` are those whose sole connection
//! to the root runs through `v`.
//!
//! # Algorithm
//!
//! The iterative scheme of Cooper, Harvey and Kennedy: number vertices in
//! depth-first postorder, then repeatedly set each vertex's immediate
//! dominator to the intersection of its processed predecessors' dominator
//! chains until nothing changes. It is correct on cyclic graphs too.
//!
//! The walk direction is an [`Adjacency`] selector, so the same code serves
//! "root toward leaves" and "leaf toward roots" queries.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::error::GraphError;
use crate::graph::{Adjacency, PropertyGraph, VertexId};

/// Immediate-dominator map for the vertices reachable from a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DominatorTree {
    root: VertexId,
    idom: HashMap<VertexId, VertexId>,
}

impl DominatorTree {
    #[must_use]
    pub const fn root(&self) -> VertexId {
        self.root
    }

    /// Immediate dominator of `v`. `None` for the root and for vertices the
    /// root does not reach.
    #[must_use]
    pub fn immediate_dominator(&self, v: VertexId) -> Option<VertexId> {
        if v == self.root {
            return None;
        }
        self.idom.get(&v).copied()
    }

    /// `true` if `v` is reachable from the root.
    #[must_use]
    pub fn is_reachable(&self, v: VertexId) -> bool {
        v == self.root || self.idom.contains_key(&v)
    }

    /// Strict dominators of `v`, nearest first, ending at the root.
    #[must_use]
    pub fn dominators(&self, v: VertexId) -> Vec<VertexId> {
        let mut chain = Vec::new();
        let mut cursor = v;
        while let Some(d) = self.immediate_dominator(cursor) {
            chain.push(d);
            cursor = d;
        }
        chain
    }

    /// `true` if `a` dominates `b`. Every reachable vertex dominates itself.
    #[must_use]
    pub fn dominates(&self, a: VertexId, b: VertexId) -> bool {
        if !self.is_reachable(b) {
            return false;
        }
        a == b || self.dominators(b).contains(&a)
    }

    /// Vertices whose immediate dominator is `v`, ascending.
    #[must_use]
    pub fn children(&self, v: VertexId) -> Vec<VertexId> {
        let mut out: Vec<VertexId> = self
            .idom
            .iter()
            .filter(|&(&child, &parent)| parent == v && child != self.root)
            .map(|(&child, _)| child)
            .collect();
        out.sort_unstable();
        out
    }

    /// `v` and every vertex it dominates, ascending.
    #[must_use]
    pub fn dominated_by(&self, v: VertexId) -> Vec<VertexId> {
        if !self.is_reachable(v) {
            return Vec::new();
        }
        let mut out: Vec<VertexId> = std::iter::once(self.root)
            .chain(self.idom.keys().copied())
            .filter(|&x| self.dominates(v, x))
            .collect();
        out.sort_unstable();
        out
    }
}

impl<V, E> PropertyGraph<V, E> {
    /// Dominator tree of the vertices reachable from `root` walking `flow`.
    ///
    /// # Errors
    ///
    /// [`GraphError::VertexNotFound`] if `root` is not in the graph.
    pub fn dominator_tree(&self, root: VertexId, flow: Adjacency) -> Result<DominatorTree, GraphError> {
        if !self.contains_vertex(root) {
            return Err(GraphError::VertexNotFound(root));
        }

        let postorder = self.postorder(root, flow);
        let po_number: HashMap<VertexId, usize> =
            postorder.iter().enumerate().map(|(i, &v)| (v, i)).collect();

        let mut idom: HashMap<VertexId, VertexId> = HashMap::from([(root, root)]);
        let mut changed = true;
        while changed {
            changed = false;
            for &v in postorder.iter().rev() {
                if v == root {
                    continue;
                }
                let mut new_idom: Option<VertexId> = None;
                for p in self.adjacent_vertices(v, flow.reversed()) {
                    if !idom.contains_key(&p) {
                        continue;
                    }
                    new_idom = Some(match new_idom {
                        None => p,
                        Some(current) => intersect(&idom, &po_number, p, current),
                    });
                }
                if let Some(candidate) = new_idom {
                    if idom.get(&v) != Some(&candidate) {
                        idom.insert(v, candidate);
                        changed = true;
                    }
                }
            }
        }

        idom.remove(&root);
        Ok(DominatorTree { root, idom })
    }

    /// `v` and every vertex dominated by `v` when walking from `root`
    /// toward the leaves, ascending.
    ///
    /// # Errors
    ///
    /// [`GraphError::VertexNotFound`] if `root` is not in the graph.
    pub fn vertices_dominated_by(&self, v: VertexId, root: VertexId) -> Result<Vec<VertexId>, GraphError> {
        Ok(self
            .dominator_tree(root, Adjacency::TowardLeaf)?
            .dominated_by(v))
    }

    /// Like [`PropertyGraph::vertices_dominated_by`], ordered by a
    /// depth-first walk from `v` that visits siblings in `cmp` order.
    ///
    /// # Errors
    ///
    /// [`GraphError::VertexNotFound`] if `root` is not in the graph.
    pub fn vertices_dominated_by_sorted<F>(
        &self,
        v: VertexId,
        root: VertexId,
        cmp: F,
    ) -> Result<Vec<VertexId>, GraphError>
    where
        F: FnMut(VertexId, VertexId) -> Ordering,
    {
        let dominated: HashSet<VertexId> = self.vertices_dominated_by(v, root)?.into_iter().collect();
        if dominated.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.depth_first_within(&[v], &dominated, cmp))
    }

    /// Depth-first postorder from `root` along `flow`, children ascending.
    fn postorder(&self, root: VertexId, flow: Adjacency) -> Vec<VertexId> {
        let mut order = Vec::new();
        let mut visited: HashSet<VertexId> = HashSet::from([root]);
        let mut stack: Vec<(VertexId, Vec<VertexId>)> = vec![(root, self.pending_children(root, flow))];

        while let Some((node, pending)) = stack.last_mut() {
            match pending.pop() {
                Some(next) => {
                    if visited.insert(next) {
                        let children = self.pending_children(next, flow);
                        stack.push((next, children));
                    }
                }
                None => {
                    let done = *node;
                    stack.pop();
                    order.push(done);
                }
            }
        }
        order
    }

    /// Neighbours along `flow`, largest id first so `pop` yields ascending.
    fn pending_children(&self, v: VertexId, flow: Adjacency) -> Vec<VertexId> {
        let mut children = self.adjacent_vertices(v, flow);
        children.reverse();
        children
    }
}

fn intersect(
    idom: &HashMap<VertexId, VertexId>,
    po_number: &HashMap<VertexId, usize>,
    mut a: VertexId,
    mut b: VertexId,
) -> VertexId {
    while a != b {
        while po_number[&a] < po_number[&b] {
            a = idom[&a];
        }
        while po_number[&b] < po_number[&a] {
            b = idom[&b];
        }
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Orientation;

    /// r → a → c, r → b → c, c → d
    fn diamond_tail() -> (PropertyGraph<(), ()>, [VertexId; 5]) {
        let mut g = PropertyGraph::new(Orientation::ParentToChild);
        let r = g.add_vertex();
        let a = g.add_vertex();
        let b = g.add_vertex();
        let c = g.add_vertex();
        let d = g.add_vertex();
        g.add_edge(r, a);
        g.add_edge(r, b);
        g.add_edge(a, c);
        g.add_edge(b, c);
        g.add_edge(c, d);
        (g, [r, a, b, c, d])
    }

    #[test]
    fn join_point_is_dominated_by_root() {
        let (g, [r, a, b, c, d]) = diamond_tail();
        let tree = g.dominator_tree(r, Adjacency::TowardLeaf).unwrap();
        assert_eq!(tree.immediate_dominator(a), Some(r));
        assert_eq!(tree.immediate_dominator(b), Some(r));
        assert_eq!(tree.immediate_dominator(c), Some(r));
        assert_eq!(tree.immediate_dominator(d), Some(c));
        assert_eq!(tree.immediate_dominator(r), None);
        assert_eq!(tree.children(r), vec![a, b, c]);
        assert_eq!(tree.dominators(d), vec![c, r]);
    }

    #[test]
    fn dominated_sets() {
        let (g, [r, a, _, c, d]) = diamond_tail();
        assert_eq!(g.vertices_dominated_by(c, r).unwrap(), vec![c, d]);
        assert_eq!(g.vertices_dominated_by(a, r).unwrap(), vec![a]);
        assert_eq!(g.vertices_dominated_by(r, r).unwrap().len(), 5);
    }

    #[test]
    fn reverse_flow_from_leaf() {
        let (g, [r, a, b, c, d]) = diamond_tail();
        let tree = g.dominator_tree(d, Adjacency::TowardRoot).unwrap();
        assert_eq!(tree.immediate_dominator(c), Some(d));
        assert_eq!(tree.immediate_dominator(a), Some(c));
        assert_eq!(tree.immediate_dominator(b), Some(c));
        assert_eq!(tree.immediate_dominator(r), Some(c));
    }

    #[test]
    fn unreachable_vertices_are_absent() {
        let (g, [r, a, ..]) = diamond_tail();
        let tree = g.dominator_tree(a, Adjacency::TowardLeaf).unwrap();
        assert!(!tree.is_reachable(r));
        assert!(tree.dominated_by(r).is_empty());
    }

    #[test]
    fn cycles_do_not_hang() {
        let mut g: PropertyGraph<(), ()> = PropertyGraph::default();
        let a = g.add_vertex();
        let b = g.add_vertex();
        let c = g.add_vertex();
        g.add_edge(a, b);
        g.add_edge(b, c);
        g.add_edge(c, b);
        let tree = g.dominator_tree(a, Adjacency::Outbound).unwrap();
        assert_eq!(tree.immediate_dominator(c), Some(b));
    }

    #[test]
    fn missing_root_is_an_error() {
        let (mut g, [r, ..]) = diamond_tail();
        g.remove_vertex(r);
        assert_eq!(
            g.dominator_tree(r, Adjacency::TowardLeaf),
            Err(GraphError::VertexNotFound(r))
        );
    }
}
