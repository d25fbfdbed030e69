//! Filter-action descriptors carried on history edges.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How faithfully an action can be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterCategory {
    /// Fully described by identifier, version and parameters.
    #[default]
    Reproducible,
    /// Replayable only with extra data not stored in the history.
    Complex,
    /// Recorded for documentation; cannot be replayed.
    DocumentedOnly,
}

/// One step of an edit: which filter ran, which version, with what settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterAction {
    pub identifier: String,
    pub version: u32,
    #[serde(default)]
    pub category: FilterCategory,
    /// The user deliberately forked a new version here instead of
    /// continuing to edit the current one.
    #[serde(default)]
    pub explicit_branch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl FilterAction {
    #[must_use]
    pub fn new(identifier: impl Into<String>, version: u32) -> Self {
        Self {
            identifier: identifier.into(),
            version,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_category(mut self, category: FilterCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub const fn branching(mut self) -> Self {
        self.explicit_branch = true;
        self
    }

    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

impl fmt::Display for FilterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.identifier, self.version)
    }
}
