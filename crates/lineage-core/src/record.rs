//! Resolved image records and the relation-pair interchange shape.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{IdentityKey, ImageId};

/// An image that currently exists in the application's database.
///
/// Two records are equal when their ids are equal; the other fields are
/// descriptive and only feed [`crate::history::proximity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_id: Option<i64>,
    /// Collection root the album lives under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_root_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    /// Directory containing the file.
    pub file_path: String,
    pub file_name: String,
}

impl ImageRecord {
    #[must_use]
    pub fn new(id: ImageId, file_path: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            id,
            uuid: None,
            album_id: None,
            album_root_id: None,
            modified: None,
            file_path: file_path.into(),
            file_name: file_name.into(),
        }
    }

    #[must_use]
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    #[must_use]
    pub const fn in_album(mut self, album_root_id: i64, album_id: i64) -> Self {
        self.album_root_id = Some(album_root_id);
        self.album_id = Some(album_id);
        self
    }

    #[must_use]
    pub const fn modified_at(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Identity key describing this record, as a history would store it.
    #[must_use]
    pub fn identity(&self) -> IdentityKey {
        let mut key = IdentityKey::default().with_location(&self.file_path, &self.file_name);
        key.uuid.clone_from(&self.uuid);
        key
    }
}

impl PartialEq for ImageRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ImageRecord {}

impl Hash for ImageRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for ImageRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ImageRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

/// "`subject` is derived from `object`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationPair {
    pub subject: ImageId,
    pub object: ImageId,
}

impl RelationPair {
    #[must_use]
    pub const fn derived_from(subject: ImageId, object: ImageId) -> Self {
        Self { subject, object }
    }

    #[must_use]
    pub fn is_self_reference(&self) -> bool {
        self.subject == self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_id() {
        let a = ImageRecord::new(ImageId(1), "/x", "a.jpg");
        let b = ImageRecord::new(ImageId(1), "/y", "b.jpg").in_album(1, 2);
        assert_eq!(a, b);
        assert_ne!(a, ImageRecord::new(ImageId(2), "/x", "a.jpg"));
    }

    #[test]
    fn identity_carries_uuid_and_location() {
        let key = ImageRecord::new(ImageId(1), "/x", "a.jpg")
            .with_uuid("u")
            .identity();
        assert_eq!(key.uuid.as_deref(), Some("u"));
        assert_eq!(key.full_path().as_deref(), Some("/x/a.jpg"));
    }

    #[test]
    fn self_reference() {
        assert!(RelationPair::derived_from(ImageId(3), ImageId(3)).is_self_reference());
        assert!(!RelationPair::derived_from(ImageId(3), ImageId(4)).is_self_reference());
    }
}
