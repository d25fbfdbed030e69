#![forbid(unsafe_code)]
//! lineage-graph library.
//!
//! A small directed graph that stores an arbitrary property payload per
//! vertex and per edge, plus the algorithm suite the history engine needs:
//! transitive closure and reduction, topological sorting, unit-weight
//! shortest/longest paths, dominator trees and deterministic display
//! orderings.
//!
//! # Conventions
//!
//! - **Ids**: [`VertexId`] and [`EdgeId`] stay valid across removals of
//!   other vertices and edges.
//! - **Failure signals**: algorithms that need a DAG return an empty or
//!   sentinel result on cyclic input. They never panic.
//! - **Errors**: [`GraphError`] only for caller-supplied ids that do not
//!   exist.
//! - **Logging**: `tracing` macros.

pub mod algo;
pub mod error;
pub mod graph;
pub mod render;

pub use algo::dominators::DominatorTree;
pub use algo::closure::{CopyFlags, Reduction};
pub use error::GraphError;
pub use graph::{Adjacency, EdgeId, Orientation, PropertyGraph, VertexId};
