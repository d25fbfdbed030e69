use crate::graph::{EdgeId, VertexId};

/// Errors for operations that address a vertex or edge the graph does not own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The vertex id was never issued or has been removed.
    #[error("vertex not found: {0}")]
    VertexNotFound(VertexId),
    /// The edge id was never issued or has been removed.
    #[error("edge not found: {0}")]
    EdgeNotFound(EdgeId),
}
