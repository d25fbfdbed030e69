//! Image identity records and the rules for deciding two refer to the same
//! image state.
//!
//! # Overview
//!
//! An [`IdentityKey`] is what a stored history remembers about an image it
//! was derived from: a UUID, a content hash, a file name and creation date,
//! a location. Any subset may be missing, because histories come from file
//! metadata written by many tools.
//!
//! ## Match priority
//!
//! Two keys are compared criterion by criterion, in the fixed order of
//! [`MatchCriterion::PRIORITY`]:
//!
//! 1. [`MatchCriterion::Uuid`]: both have a UUID and they are equal.
//! 2. [`MatchCriterion::ContentHash`]: equal unique hash *and* file size.
//! 3. [`MatchCriterion::NameAndDate`]: equal file name and creation date.
//! 4. [`MatchCriterion::FullPath`]: equal directory and file name.
//!
//! A criterion only applies when both keys carry all of its fields. The
//! first applicable criterion that matches wins; later criteria are not
//! consulted and there is no voting.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ImageId
// ---------------------------------------------------------------------------

/// Id of an image record owned by the surrounding application's database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub i64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// IdentityKind
// ---------------------------------------------------------------------------

/// Role the writer of a history assigned to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityKind {
    /// The untouched camera/scanner output.
    Original,
    /// An input that was merged into a result but is not its original.
    Source,
    /// A saved in-between version.
    Intermediate,
    /// The latest version.
    Current,
}

// ---------------------------------------------------------------------------
// MatchCriterion
// ---------------------------------------------------------------------------

/// One way two identity keys can denote the same image state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchCriterion {
    Uuid,
    ContentHash,
    NameAndDate,
    FullPath,
}

impl MatchCriterion {
    /// Criteria in the order they are tried.
    pub const PRIORITY: [Self; 4] = [
        Self::Uuid,
        Self::ContentHash,
        Self::NameAndDate,
        Self::FullPath,
    ];
}

// ---------------------------------------------------------------------------
// IdentityKey
// ---------------------------------------------------------------------------

/// Everything a history entry knows about the identity of an image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// UUID of the original this image was ultimately derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    /// Directory containing the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<IdentityKind>,
}

impl IdentityKey {
    #[must_use]
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    #[must_use]
    pub fn with_hash(mut self, unique_hash: impl Into<String>, file_size: u64) -> Self {
        self.unique_hash = Some(unique_hash.into());
        self.file_size = Some(file_size);
        self
    }

    #[must_use]
    pub fn with_name(mut self, file_name: impl Into<String>, creation_date: DateTime<Utc>) -> Self {
        self.file_name = Some(file_name.into());
        self.creation_date = Some(creation_date);
        self
    }

    #[must_use]
    pub fn with_location(mut self, dir: impl Into<String>, file_name: impl Into<String>) -> Self {
        self.file_path = Some(dir.into());
        self.file_name = Some(file_name.into());
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: IdentityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// `true` if at least one match criterion can ever apply to this key.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.uuid.is_some()
            || (self.unique_hash.is_some() && self.file_size.is_some())
            || (self.file_name.is_some() && self.creation_date.is_some())
            || self.full_path().is_some()
    }

    #[must_use]
    pub fn is_original(&self) -> bool {
        self.kind == Some(IdentityKind::Original)
    }

    #[must_use]
    pub fn is_source(&self) -> bool {
        self.kind == Some(IdentityKind::Source)
    }

    /// Directory and file name joined with `/`.
    #[must_use]
    pub fn full_path(&self) -> Option<String> {
        match (&self.file_path, &self.file_name) {
            (Some(dir), Some(name)) => Some(format!("{}/{}", dir.trim_end_matches('/'), name)),
            _ => None,
        }
    }

    /// What `criterion` says about the two keys: `None` when either key
    /// lacks its fields, otherwise whether they agree.
    #[must_use]
    pub fn compare_by(&self, other: &Self, criterion: MatchCriterion) -> Option<bool> {
        fn both<T: PartialEq>(a: Option<&T>, b: Option<&T>) -> Option<bool> {
            Some(a? == b?)
        }
        match criterion {
            MatchCriterion::Uuid => both(self.uuid.as_ref(), other.uuid.as_ref()),
            MatchCriterion::ContentHash => {
                let hash = both(self.unique_hash.as_ref(), other.unique_hash.as_ref())?;
                let size = both(self.file_size.as_ref(), other.file_size.as_ref())?;
                Some(hash && size)
            }
            MatchCriterion::NameAndDate => {
                let name = both(self.file_name.as_ref(), other.file_name.as_ref())?;
                let date = both(self.creation_date.as_ref(), other.creation_date.as_ref())?;
                Some(name && date)
            }
            MatchCriterion::FullPath => both(self.full_path().as_ref(), other.full_path().as_ref()),
        }
    }

    /// `true` if both keys carry the fields of `criterion` and they agree.
    #[must_use]
    pub fn matches_by(&self, other: &Self, criterion: MatchCriterion) -> bool {
        self.compare_by(other, criterion) == Some(true)
    }

    /// The criterion under which the keys denote the same image.
    ///
    /// The first criterion both keys carry decides: agreement returns it,
    /// disagreement returns `None` without consulting later criteria.
    #[must_use]
    pub fn matches(&self, other: &Self) -> Option<MatchCriterion> {
        MatchCriterion::PRIORITY
            .into_iter()
            .find_map(|c| self.compare_by(other, c).map(|same| (c, same)))
            .and_then(|(c, same)| same.then_some(c))
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(uuid) = &self.uuid {
            return write!(f, "uuid:{uuid}");
        }
        if let Some(path) = self.full_path() {
            return write!(f, "{path}");
        }
        if let Some(name) = &self.file_name {
            return write!(f, "{name}");
        }
        if let Some(hash) = &self.unique_hash {
            return write!(f, "hash:{hash}");
        }
        write!(f, "<invalid>")
    }
}
