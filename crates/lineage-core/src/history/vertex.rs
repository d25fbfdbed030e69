//! Vertex payload: every identity and record known for one image state.

use serde::{Deserialize, Serialize};

use crate::identity::{IdentityKey, IdentityKind, ImageId, MatchCriterion};
use crate::record::ImageRecord;

/// One image state. Several files (raw copies, re-imports, exports with
/// identical content) may collapse onto the same vertex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryVertex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub keys: Vec<IdentityKey>,
    /// Resolved records, first is the most relevant after
    /// [`crate::history::HistoryGraphData::sort_for_info`]. Never holds two
    /// records with the same id.
    #[serde(default)]
    pub records: Vec<ImageRecord>,
}

impl HistoryVertex {
    /// `false` when no existing record is known for this state.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.records.is_empty()
    }

    /// `true` if one of the stored keys is matched to `key` by `criterion`,
    /// with no higher-priority criterion telling them apart. A vertex whose
    /// UUID differs from the key's never matches.
    #[must_use]
    pub fn matches_key_by(&self, key: &IdentityKey, criterion: MatchCriterion) -> bool {
        if matches!((&self.uuid, &key.uuid), (Some(mine), Some(theirs)) if mine != theirs) {
            return false;
        }
        self.keys.iter().any(|k| k.matches(key) == Some(criterion))
    }

    #[must_use]
    pub fn matches_record(&self, id: ImageId) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// `true` if a stored key or record carries `uuid`.
    #[must_use]
    pub fn carries_uuid(&self, uuid: &str) -> bool {
        self.uuid.as_deref() == Some(uuid)
            || self.keys.iter().any(|k| k.uuid.as_deref() == Some(uuid))
            || self.records.iter().any(|r| r.uuid.as_deref() == Some(uuid))
    }

    /// Add `key` unless an equal key is already stored. Adopts its UUID if
    /// the vertex has none yet.
    pub fn merge_key(&mut self, key: IdentityKey) {
        if self.uuid.is_none() {
            self.uuid.clone_from(&key.uuid);
        }
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
    }

    /// Add `record` unless a record with the same id is already stored.
    pub fn merge_record(&mut self, record: ImageRecord) {
        if self.uuid.is_none() {
            self.uuid.clone_from(&record.uuid);
        }
        if !self.records.contains(&record) {
            self.records.push(record);
        }
    }

    /// Keys and records of `other` unioned into this vertex.
    pub fn absorb(&mut self, other: Self) {
        for key in other.keys {
            self.merge_key(key);
        }
        for record in other.records {
            self.merge_record(record);
        }
    }

    /// `true` if every stored key carries `kind`. A vertex without keys is
    /// never marked.
    #[must_use]
    pub fn always_marked_as(&self, kind: IdentityKind) -> bool {
        !self.keys.is_empty() && self.keys.iter().all(|k| k.kind == Some(kind))
    }

    /// `true` if at least one stored key carries `kind`.
    #[must_use]
    pub fn marked_as(&self, kind: IdentityKind) -> bool {
        self.keys.iter().any(|k| k.kind == Some(kind))
    }

    #[must_use]
    pub fn record_ids(&self) -> Vec<ImageId> {
        self.records.iter().map(|r| r.id).collect()
    }

    /// Short label for debug output.
    #[must_use]
    pub fn label(&self) -> String {
        if !self.records.is_empty() {
            let ids: Vec<String> = self.records.iter().map(|r| r.id.to_string()).collect();
            return ids.join("/");
        }
        self.keys
            .first()
            .map_or_else(|| "<empty>".to_string(), |k| format!("?{k}"))
    }
}

/// A vertex equals an image id when one of its records has that id.
impl PartialEq<ImageId> for HistoryVertex {
    fn eq(&self, other: &ImageId) -> bool {
        self.matches_record(*other)
    }
}

/// A vertex equals a key when [`HistoryVertex::matches_key_by`] holds for
/// some criterion.
impl PartialEq<IdentityKey> for HistoryVertex {
    fn eq(&self, other: &IdentityKey) -> bool {
        MatchCriterion::PRIORITY
            .into_iter()
            .any(|c| self.matches_key_by(other, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merging_is_a_set_union() {
        let mut v = HistoryVertex::default();
        let key = IdentityKey::default().with_uuid("u1");
        v.merge_key(key.clone());
        v.merge_key(key);
        v.merge_record(ImageRecord::new(ImageId(1), "/a", "x.jpg"));
        v.merge_record(ImageRecord::new(ImageId(1), "/b", "y.jpg"));
        assert_eq!(v.keys.len(), 1);
        assert_eq!(v.records.len(), 1);
        assert_eq!(v.uuid.as_deref(), Some("u1"));
        assert!(v.is_resolved());
        assert!(v == ImageId(1));
    }

    #[test]
    fn markers() {
        let mut v = HistoryVertex::default();
        assert!(!v.always_marked_as(IdentityKind::Source));
        v.merge_key(IdentityKey::default().with_uuid("a").with_kind(IdentityKind::Source));
        assert!(v.always_marked_as(IdentityKind::Source));
        v.merge_key(IdentityKey::default().with_uuid("b").with_kind(IdentityKind::Original));
        assert!(!v.always_marked_as(IdentityKind::Source));
        assert!(v.marked_as(IdentityKind::Original));
    }

    #[test]
    fn key_equality_uses_every_criterion() {
        let mut v = HistoryVertex::default();
        v.merge_key(IdentityKey::default().with_hash("h", 5));
        assert!(v == IdentityKey::default().with_hash("h", 5).with_uuid("new"));
        assert!(v != IdentityKey::default().with_hash("h", 6));
        assert!(v.matches_key_by(&IdentityKey::default().with_hash("h", 5), MatchCriterion::ContentHash));
        assert!(!v.matches_key_by(&IdentityKey::default().with_hash("h", 5), MatchCriterion::Uuid));
    }

    #[test]
    fn conflicting_uuid_blocks_weaker_criteria() {
        let mut v = HistoryVertex::default();
        v.merge_key(IdentityKey::default().with_uuid("u1"));
        v.merge_key(IdentityKey::default().with_hash("h", 5));
        let other = IdentityKey::default().with_uuid("u2").with_hash("h", 5);
        assert!(!v.matches_key_by(&other, MatchCriterion::ContentHash));
        assert!(v != other);
    }

    #[test]
    fn label_prefers_records() {
        let mut v = HistoryVertex::default();
        v.merge_key(IdentityKey::default().with_uuid("u"));
        assert_eq!(v.label(), "?uuid:u");
        v.merge_record(ImageRecord::new(ImageId(4), "/a", "x.jpg"));
        v.merge_record(ImageRecord::new(ImageId(2), "/a", "y.jpg"));
        assert_eq!(v.label(), "#4/#2");
    }
}
