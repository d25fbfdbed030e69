//! Collaborator interfaces the engine consumes, and an in-memory catalog.
//!
//! The history engine never touches storage itself. It asks:
//!
//! - an [`IdentityResolver`] which existing records an identity key denotes,
//! - a [`RecordStore`] for the record behind an id,
//! - a [`HistoryReader`] for the history persisted with a record,
//! - a [`RelationReader`] for the relation cloud persisted around a record.
//!
//! [`ImageCatalog`] bundles all four and is implemented automatically.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::debug;

use crate::history::HistoryEntry;
use crate::identity::{IdentityKey, ImageId};
use crate::record::{ImageRecord, RelationPair};

pub trait IdentityResolver {
    /// Ids of existing records the key refers to, possibly none.
    fn resolve(&self, key: &IdentityKey) -> Vec<ImageId>;
}

pub trait RecordStore {
    fn record(&self, id: ImageId) -> Option<ImageRecord>;
}

pub trait HistoryReader {
    /// Stored history of `id`, oldest entry first. Empty when none was saved.
    fn stored_history(&self, id: ImageId) -> Vec<HistoryEntry>;
}

pub trait RelationReader {
    /// Every persisted relation in the connected cloud around `id`.
    fn stored_relations(&self, id: ImageId) -> Vec<RelationPair>;
}

/// All collaborator roles at once.
pub trait ImageCatalog: IdentityResolver + RecordStore + HistoryReader + RelationReader {}

impl<T> ImageCatalog for T where T: IdentityResolver + RecordStore + HistoryReader + RelationReader + ?Sized {}

// ---------------------------------------------------------------------------
// MemoryCatalog
// ---------------------------------------------------------------------------

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    records: BTreeMap<ImageId, ImageRecord>,
    identities: BTreeMap<ImageId, Vec<IdentityKey>>,
    histories: BTreeMap<ImageId, Vec<HistoryEntry>>,
    relations: BTreeSet<RelationPair>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record. It answers to its own [`ImageRecord::identity`]
    /// and to every key in `aliases`.
    pub fn insert_record(&mut self, record: ImageRecord, aliases: impl IntoIterator<Item = IdentityKey>) {
        let id = record.id;
        let mut keys = vec![record.identity()];
        keys.extend(aliases);
        self.identities.insert(id, keys);
        self.records.insert(id, record);
    }

    pub fn set_history(&mut self, id: ImageId, entries: Vec<HistoryEntry>) {
        self.histories.insert(id, entries);
    }

    pub fn add_relation(&mut self, pair: RelationPair) {
        self.relations.insert(pair);
    }

    /// Replace every persisted relation touching the ids in `pairs` with
    /// `pairs`, the way a simplified relation cloud is written back.
    pub fn store_relation_cloud(&mut self, pairs: &[RelationPair]) {
        let touched: BTreeSet<ImageId> = pairs.iter().flat_map(|p| [p.subject, p.object]).collect();
        self.relations
            .retain(|p| !touched.contains(&p.subject) && !touched.contains(&p.object));
        self.relations.extend(pairs.iter().copied());
        debug!(stored = pairs.len(), "relation cloud stored");
    }

    #[must_use]
    pub fn relations(&self) -> Vec<RelationPair> {
        self.relations.iter().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl IdentityResolver for MemoryCatalog {
    fn resolve(&self, key: &IdentityKey) -> Vec<ImageId> {
        self.identities
            .iter()
            .filter(|(_, keys)| keys.iter().any(|k| k.matches(key).is_some()))
            .map(|(&id, _)| id)
            .collect()
    }
}

impl RecordStore for MemoryCatalog {
    fn record(&self, id: ImageId) -> Option<ImageRecord> {
        self.records.get(&id).cloned()
    }
}

impl HistoryReader for MemoryCatalog {
    fn stored_history(&self, id: ImageId) -> Vec<HistoryEntry> {
        self.histories.get(&id).cloned().unwrap_or_default()
    }
}

impl RelationReader for MemoryCatalog {
    fn stored_relations(&self, id: ImageId) -> Vec<RelationPair> {
        let mut seen: BTreeSet<ImageId> = BTreeSet::from([id]);
        let mut queue = VecDeque::from([id]);
        let mut cloud: BTreeSet<RelationPair> = BTreeSet::new();
        while let Some(current) = queue.pop_front() {
            for pair in self
                .relations
                .iter()
                .filter(|p| p.subject == current || p.object == current)
            {
                cloud.insert(*pair);
                for other in [pair.subject, pair.object] {
                    if seen.insert(other) {
                        queue.push_back(other);
                    }
                }
            }
        }
        cloud.into_iter().collect()
    }
}
