//! The image history graph.
//!
//! # Overview
//!
//! A history graph specializes [`lineage_graph::PropertyGraph`] with:
//!
//! - [`HistoryVertex`]: the identity keys and resolved records of one image
//!   state. Several files can share a vertex when they are copies of the
//!   same state.
//! - [`HistoryEdge`]: the ordered filter actions that turned one state into
//!   the next.
//!
//! [`HistoryGraphData`] owns the graph and implements merge-on-insert,
//! history assembly and the maintenance passes. The public entry point for
//! applications is [`crate::ImageHistoryGraph`].
//!
//! # Sub-modules
//!
//! - [`vertex`], [`edge`]: property payloads.
//! - [`data`]: insertion and maintenance.
//! - [`categorize`]: Source/Original/Current/Intermediate tagging.
//! - [`proximity`]: ordering of a vertex's records relative to a subject.

pub mod categorize;
pub mod data;
pub mod edge;
pub mod proximity;
pub mod vertex;

use serde::{Deserialize, Serialize};

use crate::action::FilterAction;
use crate::identity::IdentityKey;

pub use categorize::Category;
pub use data::{HistoryGraphData, ReductionConflict};
pub use edge::HistoryEdge;
pub use vertex::HistoryVertex;

/// One step of a stored, linear edit history.
///
/// `action` is what was applied to the previous state to reach this one.
/// `referred` lists the files saved at this state; all of them are copies
/// of the same image state and share one vertex. An entry may carry an
/// action without any saved file, in which case the action accumulates
/// onto the next edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<FilterAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub referred: Vec<IdentityKey>,
}

impl HistoryEntry {
    /// Entry for a saved file without a preceding action (typically the
    /// original).
    #[must_use]
    pub fn file(key: IdentityKey) -> Self {
        Self {
            action: None,
            referred: vec![key],
        }
    }

    /// Entry for an action whose result was not saved.
    #[must_use]
    pub const fn action(action: FilterAction) -> Self {
        Self {
            action: Some(action),
            referred: Vec::new(),
        }
    }

    /// Entry for an action whose result was saved as `key`.
    #[must_use]
    pub fn step(action: FilterAction, key: IdentityKey) -> Self {
        Self {
            action: Some(action),
            referred: vec![key],
        }
    }
}
