//! Tagging vertices as Source, Original, Current or Intermediate.
//!
//! Rules, first match wins:
//!
//! 1. every key of the vertex is marked [`IdentityKind::Source`] → `Source`
//! 2. the vertex is a leaf → `Current`
//! 3. the vertex is a root and some key is marked
//!    [`IdentityKind::Original`] → `Original`
//! 4. otherwise → `Intermediate`
//!
//! Any non-leaf vertex additionally gets `Current` when the user explicitly
//! branched off every version derived from it: each leaf-ward edge that
//! carries actions starts with an explicit-branch action, and there is at
//! least one such edge. Edges without actions are ignored. The tag from the
//! rules above is kept.

use std::collections::{BTreeMap, BTreeSet};

use lineage_graph::{Adjacency, VertexId};
use serde::{Deserialize, Serialize};

use super::data::HistoryGraphData;
use crate::identity::IdentityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Source,
    Original,
    Current,
    Intermediate,
}

impl HistoryGraphData {
    /// Category set of every vertex.
    #[must_use]
    pub fn categorize(&self) -> BTreeMap<VertexId, BTreeSet<Category>> {
        let graph = self.graph();
        let mut tags = BTreeMap::new();
        for v in graph.vertices() {
            let Some(props) = graph.properties(v) else {
                continue;
            };
            let mut set = BTreeSet::new();
            if props.always_marked_as(IdentityKind::Source) {
                set.insert(Category::Source);
            } else if graph.is_leaf(v) {
                set.insert(Category::Current);
            } else if graph.is_root(v) && props.marked_as(IdentityKind::Original) {
                set.insert(Category::Original);
            } else {
                set.insert(Category::Intermediate);
            }

            if !graph.is_leaf(v) && self.branches_explicitly(v) {
                set.insert(Category::Current);
            }
            tags.insert(v, set);
        }
        tags
    }

    fn branches_explicitly(&self, v: VertexId) -> bool {
        let graph = self.graph();
        let mut with_actions = graph
            .edges_of(v, Adjacency::TowardLeaf)
            .into_iter()
            .filter_map(|e| graph.edge_properties(e))
            .filter(|props| !props.is_empty())
            .peekable();
        if with_actions.peek().is_none() {
            return false;
        }
        with_actions.all(|props| props.first_action().is_some_and(|a| a.explicit_branch))
    }
}
