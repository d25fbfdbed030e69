#![forbid(unsafe_code)]
//! lineage-core library.
//!
//! Builds, simplifies and queries the derivation history of images: which
//! file was produced from which, through which filter actions.
//!
//! # Conventions
//!
//! - **Identity**: [`identity::IdentityKey`] values are matched by UUID,
//!   then content hash, then name and date, then path. Matching keys share
//!   a vertex.
//! - **Collaborators**: storage is reached only through the traits in
//!   [`catalog`].
//! - **Errors**: [`error::HistoryError`]. Bad history data is logged and
//!   worked around, never returned as an error.
//! - **Logging**: `tracing` macros. No subscriber is installed here.

pub mod action;
pub mod catalog;
pub mod config;
pub mod error;
pub mod facade;
pub mod history;
pub mod identity;
pub mod record;

pub use action::{FilterAction, FilterCategory};
pub use catalog::{HistoryReader, IdentityResolver, ImageCatalog, MemoryCatalog, RecordStore, RelationReader};
pub use config::{DisplayConfig, HistoryConfig, LoadingConfig, load_config, load_user_config};
pub use error::HistoryError;
pub use facade::{DisplayReport, ImageHistoryGraph};
pub use history::data::{HistorySubject, ReductionReport};
pub use history::{Category, HistoryEdge, HistoryEntry, HistoryGraphData, HistoryVertex, ReductionConflict};
pub use identity::{IdentityKey, IdentityKind, ImageId, MatchCriterion};
pub use lineage_graph::{Orientation, VertexId};
pub use record::{ImageRecord, RelationPair};
