//! Reachability queries and display orderings.
//!
//! The two ordering functions are recomputed on every call and always
//! return every vertex exactly once:
//!
//! 1. Walk from the roots of the reference vertex (if any) toward the leaves.
//! 2. Walk from every remaining root.
//! 3. Walk from any vertex still unvisited, ascending by id. Only vertices
//!    on root-less cycles are left for this step.

use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};

use crate::graph::{Adjacency, PropertyGraph, VertexId};

impl<V, E> PropertyGraph<V, E> {
    /// Vertices reachable from `v` walking `adjacency`, ascending, without `v`.
    #[must_use]
    pub fn reachable_from(&self, v: VertexId, adjacency: Adjacency) -> Vec<VertexId> {
        if !self.contains_vertex(v) {
            return Vec::new();
        }
        let mut seen: HashSet<VertexId> = HashSet::from([v]);
        let mut stack = vec![v];
        while let Some(current) = stack.pop() {
            for next in self.adjacent_vertices(current, adjacency) {
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen.remove(&v);
        let mut out: Vec<VertexId> = seen.into_iter().collect();
        out.sort_unstable();
        out
    }

    /// Every vertex `v` derives from, directly or indirectly.
    #[must_use]
    pub fn ancestors(&self, v: VertexId) -> Vec<VertexId> {
        self.reachable_from(v, Adjacency::TowardRoot)
    }

    /// Every vertex derived from `v`, directly or indirectly.
    #[must_use]
    pub fn descendants(&self, v: VertexId) -> Vec<VertexId> {
        self.reachable_from(v, Adjacency::TowardLeaf)
    }

    /// Roots `v` descends from. A root is its own single root.
    #[must_use]
    pub fn roots_of(&self, v: VertexId) -> Vec<VertexId> {
        if !self.contains_vertex(v) {
            return Vec::new();
        }
        if self.is_root(v) {
            return vec![v];
        }
        self.ancestors(v)
            .into_iter()
            .filter(|&a| self.is_root(a))
            .collect()
    }

    /// Leaves descending from `v`. A leaf is its own single leaf.
    #[must_use]
    pub fn leaves_from(&self, v: VertexId) -> Vec<VertexId> {
        if !self.contains_vertex(v) {
            return Vec::new();
        }
        if self.is_leaf(v) {
            return vec![v];
        }
        self.descendants(v)
            .into_iter()
            .filter(|&d| self.is_leaf(d))
            .collect()
    }

    /// Breadth-first order toward the leaves, seeded at the roots of
    /// `reference` first. Neighbours are visited in ascending id order.
    #[must_use]
    pub fn vertices_breadth_first(&self, reference: Option<VertexId>) -> Vec<VertexId> {
        let mut order = Vec::with_capacity(self.vertex_count());
        let mut visited: HashSet<VertexId> = HashSet::new();
        let mut queue: VecDeque<VertexId> = VecDeque::new();

        for seed in self.ordering_seeds(reference, |a, b| a.cmp(&b)) {
            if !visited.insert(seed) {
                continue;
            }
            queue.push_back(seed);
            while let Some(current) = queue.pop_front() {
                order.push(current);
                for next in self.adjacent_vertices(current, Adjacency::TowardLeaf) {
                    if visited.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        order
    }

    /// Depth-first preorder toward the leaves, seeded at the roots of
    /// `reference` first. Roots and siblings are visited in `cmp` order.
    #[must_use]
    pub fn vertices_depth_first_sorted<F>(&self, reference: Option<VertexId>, mut cmp: F) -> Vec<VertexId>
    where
        F: FnMut(VertexId, VertexId) -> Ordering,
    {
        let seeds = self.ordering_seeds(reference, &mut cmp);
        let everything: HashSet<VertexId> = self.vertices().collect();
        self.depth_first_within(&seeds, &everything, cmp)
    }

    /// Preorder walk toward the leaves from `seeds`, restricted to `allowed`.
    pub(crate) fn depth_first_within<F>(
        &self,
        seeds: &[VertexId],
        allowed: &HashSet<VertexId>,
        mut cmp: F,
    ) -> Vec<VertexId>
    where
        F: FnMut(VertexId, VertexId) -> Ordering,
    {
        let mut order = Vec::with_capacity(allowed.len());
        let mut visited: HashSet<VertexId> = HashSet::new();

        for &seed in seeds {
            if !allowed.contains(&seed) || visited.contains(&seed) {
                continue;
            }
            let mut stack = vec![seed];
            while let Some(current) = stack.pop() {
                if !visited.insert(current) {
                    continue;
                }
                order.push(current);
                let mut children: Vec<VertexId> = self
                    .adjacent_vertices(current, Adjacency::TowardLeaf)
                    .into_iter()
                    .filter(|c| allowed.contains(c) && !visited.contains(c))
                    .collect();
                children.sort_by(|&a, &b| cmp(a, b));
                stack.extend(children.into_iter().rev());
            }
        }
        order
    }

    /// Reference roots, then the other roots, then every vertex ascending.
    /// Duplicates are left for the callers to skip.
    fn ordering_seeds<F>(&self, reference: Option<VertexId>, mut cmp: F) -> Vec<VertexId>
    where
        F: FnMut(VertexId, VertexId) -> Ordering,
    {
        let mut seeds = reference.map(|r| self.roots_of(r)).unwrap_or_default();
        seeds.sort_by(|&a, &b| cmp(a, b));

        let mut other_roots: Vec<VertexId> = self
            .roots()
            .into_iter()
            .filter(|r| !seeds.contains(r))
            .collect();
        other_roots.sort_by(|&a, &b| cmp(a, b));

        seeds.extend(other_roots);
        seeds.extend(self.vertices());
        seeds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Orientation;

    /// Two trees: r1 → {a, b}, a → c; r2 → d. Plus an isolated cycle x ⇄ y.
    fn forest() -> (PropertyGraph<u32, ()>, Vec<VertexId>) {
        let mut g = PropertyGraph::new(Orientation::ParentToChild);
        let ids: Vec<VertexId> = (0..8).map(|i| g.add_vertex_with(i)).collect();
        let [r1, a, b, c, r2, d, x, y] = ids[..] else {
            unreachable!()
        };
        g.add_edge(r1, a);
        g.add_edge(r1, b);
        g.add_edge(a, c);
        g.add_edge(r2, d);
        g.add_edge(x, y);
        g.add_edge(y, x);
        (g, ids)
    }

    #[test]
    fn breadth_first_starts_at_reference_roots() {
        let (g, ids) = forest();
        let [r1, a, b, c, r2, d, x, y] = ids[..] else {
            unreachable!()
        };
        assert_eq!(
            g.vertices_breadth_first(Some(d)),
            vec![r2, d, r1, a, b, c, x, y]
        );
        assert_eq!(
            g.vertices_breadth_first(None),
            vec![r1, a, b, c, r2, d, x, y]
        );
    }

    #[test]
    fn depth_first_honours_comparator() {
        let (g, ids) = forest();
        let [r1, a, b, c, r2, d, x, y] = ids[..] else {
            unreachable!()
        };
        // Reverse id order everywhere.
        let order = g.vertices_depth_first_sorted(None, |p, q| q.cmp(&p));
        assert_eq!(order, vec![r2, d, r1, b, a, c, x, y]);
    }

    #[test]
    fn orderings_are_total() {
        let (g, _) = forest();
        for order in [
            g.vertices_breadth_first(None),
            g.vertices_depth_first_sorted(None, |p, q| p.cmp(&q)),
        ] {
            let unique: HashSet<_> = order.iter().collect();
            assert_eq!(order.len(), g.vertex_count());
            assert_eq!(unique.len(), g.vertex_count());
        }
    }

    #[test]
    fn ancestors_roots_and_leaves() {
        let (g, ids) = forest();
        let [r1, a, b, c, ..] = ids[..] else {
            unreachable!()
        };
        assert_eq!(g.ancestors(c), vec![r1, a]);
        assert_eq!(g.descendants(r1), vec![a, b, c]);
        assert_eq!(g.roots_of(c), vec![r1]);
        assert_eq!(g.roots_of(r1), vec![r1]);
        assert_eq!(g.leaves_from(r1), vec![b, c]);
    }
}
