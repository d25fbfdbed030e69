use lineage_graph::GraphError;
use thiserror::Error;

use crate::identity::ImageId;

/// Errors surfaced by the history engine.
///
/// Structural anomalies in history data (loops, cycles, unresolved
/// entries) are not errors; they are logged and handled in place.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("no record for image {0}")]
    RecordNotFound(ImageId),

    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),
}

impl HistoryError {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "E1002",
            Self::RecordNotFound(_) => "E2001",
            Self::Graph(GraphError::VertexNotFound(_)) => "E2101",
            Self::Graph(GraphError::EdgeNotFound(_)) => "E2102",
        }
    }

    /// Optional remediation hint for log output.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Config(_) => Some("Fix the syntax of the lineage config.toml and retry."),
            Self::RecordNotFound(_) => Some("The image may have been removed; refresh the catalog."),
            Self::Graph(_) => None,
        }
    }
}
