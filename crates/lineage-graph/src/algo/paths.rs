//! Unit-weight shortest and longest paths.
//!
//! Every edge has weight 1. Paths follow outbound edges. Unreachable
//! targets produce an empty path or a missing distance entry rather than
//! an error.

use std::collections::{HashMap, VecDeque};

use petgraph::Direction;

use crate::graph::{PropertyGraph, VertexId};

impl<V, E> PropertyGraph<V, E> {
    /// Number of edges on a shortest path from `from` to every vertex it
    /// reaches. `from` maps to 0; unreachable vertices are absent.
    #[must_use]
    pub fn shortest_distances_from(&self, from: VertexId) -> HashMap<VertexId, usize> {
        let mut dist = HashMap::new();
        if !self.contains_vertex(from) {
            return dist;
        }
        dist.insert(from, 0);
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            let d = dist[&current];
            for next in self.adjacent_vertices(current, crate::Adjacency::Outbound) {
                dist.entry(next).or_insert_with(|| {
                    queue.push_back(next);
                    d + 1
                });
            }
        }
        dist
    }

    /// Shortest distance from `from` to `to`, `None` if unreachable.
    #[must_use]
    pub fn distance(&self, from: VertexId, to: VertexId) -> Option<usize> {
        self.shortest_distances_from(from).get(&to).copied()
    }

    /// A shortest path `from → … → to`, both ends included.
    ///
    /// Empty when `to` is unreachable. Among equally short paths, the one
    /// through the smallest vertex ids is chosen.
    #[must_use]
    pub fn shortest_path(&self, from: VertexId, to: VertexId) -> Vec<VertexId> {
        if !self.contains_vertex(from) || !self.contains_vertex(to) {
            return Vec::new();
        }
        let mut parent: HashMap<VertexId, VertexId> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        let mut found = from == to;
        while let Some(current) = queue.pop_front() {
            if found {
                break;
            }
            for next in self.adjacent_vertices(current, crate::Adjacency::Outbound) {
                if next == from || parent.contains_key(&next) {
                    continue;
                }
                parent.insert(next, current);
                if next == to {
                    found = true;
                    break;
                }
                queue.push_back(next);
            }
        }
        if !found {
            return Vec::new();
        }
        unwind(&parent, from, to)
    }

    /// A longest path `from → … → to`, both ends included.
    ///
    /// Requires a DAG. Returns an empty list when the graph has a cycle or
    /// `to` is unreachable.
    #[must_use]
    pub fn longest_path(&self, from: VertexId, to: VertexId) -> Vec<VertexId> {
        if !self.contains_vertex(from) || !self.contains_vertex(to) {
            return Vec::new();
        }
        let topo = self.topological_sort();
        if topo.is_empty() {
            return Vec::new();
        }

        let mut best: HashMap<VertexId, usize> = HashMap::from([(from, 0)]);
        let mut parent: HashMap<VertexId, VertexId> = HashMap::new();
        let start = topo.iter().position(|&v| v == from).unwrap_or(topo.len());
        for &u in &topo[start..] {
            let Some(&du) = best.get(&u) else {
                continue;
            };
            for next in self.inner.neighbors_directed(u.slot, Direction::Outgoing) {
                let next = self.vertex_id(next);
                let candidate = du + 1;
                let better = match best.get(&next) {
                    None => true,
                    Some(&current) => {
                        candidate > current
                            || (candidate == current && parent.get(&next).is_some_and(|&p| u < p))
                    }
                };
                if better {
                    best.insert(next, candidate);
                    parent.insert(next, u);
                }
            }
        }

        if !best.contains_key(&to) {
            return Vec::new();
        }
        unwind(&parent, from, to)
    }
}

fn unwind(parent: &HashMap<VertexId, VertexId>, from: VertexId, to: VertexId) -> Vec<VertexId> {
    let mut path = vec![to];
    let mut cursor = to;
    while cursor != from {
        match parent.get(&cursor) {
            Some(&p) => {
                cursor = p;
                path.push(p);
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use crate::graph::{PropertyGraph, VertexId};

    /// a → b → c → d with a shortcut a → d.
    fn shortcut() -> (PropertyGraph<(), ()>, [VertexId; 4]) {
        let mut g = PropertyGraph::default();
        let a = g.add_vertex();
        let b = g.add_vertex();
        let c = g.add_vertex();
        let d = g.add_vertex();
        g.add_edge(a, b);
        g.add_edge(b, c);
        g.add_edge(c, d);
        g.add_edge(a, d);
        (g, [a, b, c, d])
    }

    #[test]
    fn shortest_takes_the_shortcut() {
        let (g, [a, _, _, d]) = shortcut();
        assert_eq!(g.shortest_path(a, d), vec![a, d]);
        assert_eq!(g.distance(a, d), Some(1));
    }

    #[test]
    fn longest_walks_the_chain() {
        let (g, [a, b, c, d]) = shortcut();
        assert_eq!(g.longest_path(a, d), vec![a, b, c, d]);
    }

    #[test]
    fn unreachable_is_empty() {
        let (g, [a, _, _, d]) = shortcut();
        assert!(g.shortest_path(d, a).is_empty());
        assert!(g.longest_path(d, a).is_empty());
        assert_eq!(g.distance(d, a), None);
    }

    #[test]
    fn path_to_self_is_single_vertex() {
        let (g, [a, ..]) = shortcut();
        assert_eq!(g.shortest_path(a, a), vec![a]);
        assert_eq!(g.longest_path(a, a), vec![a]);
    }

    #[test]
    fn distances_cover_reachable_vertices_only() {
        let (g, [a, b, c, d]) = shortcut();
        let dist = g.shortest_distances_from(b);
        assert_eq!(dist.len(), 3);
        assert_eq!(dist[&b], 0);
        assert_eq!(dist[&c], 1);
        assert_eq!(dist[&d], 2);
        assert!(!dist.contains_key(&a));
    }

    #[test]
    fn longest_path_on_cycle_is_empty() {
        let mut g: PropertyGraph<(), ()> = PropertyGraph::default();
        let a = g.add_vertex();
        let b = g.add_vertex();
        g.add_edge(a, b);
        g.add_edge(b, a);
        assert!(g.longest_path(a, b).is_empty());
        assert_eq!(g.shortest_path(a, b), vec![a, b]);
    }
}
