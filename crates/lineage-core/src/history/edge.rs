//! Edge payload: the actions that produced one state from another.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::FilterAction;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEdge {
    pub actions: Vec<FilterAction>,
}

impl HistoryEdge {
    #[must_use]
    pub const fn new(actions: Vec<FilterAction>) -> Self {
        Self { actions }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// First action recorded on the edge.
    #[must_use]
    pub fn first_action(&self) -> Option<&FilterAction> {
        self.actions.first()
    }

    /// Append the actions from `incoming` not already on this edge, in order.
    pub fn merge_actions(&mut self, incoming: &[FilterAction]) {
        let before = self.actions.len();
        for action in incoming {
            if !self.actions.contains(action) {
                self.actions.push(action.clone());
            }
        }
        if before > 0 && self.actions.len() > before {
            debug!(
                kept = before,
                added = self.actions.len() - before,
                "merged differing action lists onto one edge"
            );
        }
    }
}
