//! Human-readable dump of a graph for log output.
//!
//! Not a stable format. A DAG is printed in topological order, one line per
//! vertex listing the vertices that point at it:
//!
//! ```text
//! a -> { }
//! b -> { a }
//! c -> { a, b }
//! ```
//!
//! A graph with a cycle prints `Not-a-DAG` followed by one label per line.

use std::fmt::Write as _;

use crate::graph::{Adjacency, PropertyGraph, VertexId};

impl<V, E> PropertyGraph<V, E> {
    /// Render the graph, labelling each vertex with `label`.
    pub fn render<F>(&self, mut label: F) -> String
    where
        F: FnMut(VertexId, &V) -> String,
    {
        let mut text = |v: VertexId| {
            self.properties(v)
                .map_or_else(|| v.to_string(), |props| label(v, props))
        };

        let mut out = String::new();
        let topo = self.topological_sort();
        if topo.is_empty() && !self.is_empty() {
            out.push_str("Not-a-DAG\n");
            for v in self.vertices() {
                let _ = writeln!(out, "{}", text(v));
            }
            return out;
        }

        for target in topo {
            let sources: Vec<String> = self
                .adjacent_vertices(target, Adjacency::Inbound)
                .into_iter()
                .map(&mut text)
                .collect();
            let head = text(target);
            if sources.is_empty() {
                let _ = writeln!(out, "{head} -> {{ }}");
            } else {
                let _ = writeln!(out, "{head} -> {{ {} }}", sources.join(", "));
            }
        }
        out
    }
}
