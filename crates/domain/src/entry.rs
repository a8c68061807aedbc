//! Entry snapshots: one path's recorded kind, fingerprint, and metadata.

use crate::{Fingerprint, PathKey, PrimitiveError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse kind of a tracked entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    /// Regular file with a content digest.
    RegularFile,
    /// Directory.
    Directory,
    /// Known absent or unreadable.
    Missing,
}

impl EntryKind {
    /// Stable tag, identical to the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RegularFile => "regularFile",
            Self::Directory => "directory",
            Self::Missing => "missing",
        }
    }

    fn accepts(self, fingerprint: &Fingerprint) -> bool {
        match self {
            Self::RegularFile => fingerprint.digest().is_some(),
            Self::Directory => fingerprint.is_directory(),
            Self::Missing => fingerprint.is_missing(),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Non-content bookkeeping recorded alongside a fingerprint.
///
/// Metadata never takes part in change detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryMetadata {
    /// File length in bytes, when observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    /// Last-modified time (epoch ms), when observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_ms: Option<u64>,
    /// When the entry was last observed (epoch ms).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at_ms: Option<u64>,
}

impl EntryMetadata {
    /// Metadata for a file observed with the given length and mtime.
    #[must_use]
    pub const fn file(length: u64, last_modified_ms: u64) -> Self {
        Self {
            length: Some(length),
            last_modified_ms: Some(last_modified_ms),
            observed_at_ms: None,
        }
    }

    /// Set the observation timestamp.
    #[must_use]
    pub const fn observed_at(mut self, observed_at_ms: u64) -> Self {
        self.observed_at_ms = Some(observed_at_ms);
        self
    }

    /// True when both records know length and mtime and agree on them.
    ///
    /// This is the cheap "content probably unchanged" check used to reuse a
    /// recorded fingerprint without rehashing.
    #[must_use]
    pub fn matches_file_stat(&self, observed: &Self) -> bool {
        match (
            self.length,
            self.last_modified_ms,
            observed.length,
            observed.last_modified_ms,
        ) {
            (Some(length), Some(modified), Some(observed_length), Some(observed_modified)) => {
                length == observed_length && modified == observed_modified
            },
            _ => false,
        }
    }
}

/// Recorded state of one path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "EntrySnapshotRecord", into = "EntrySnapshotRecord")]
pub struct EntrySnapshot {
    path: PathKey,
    kind: EntryKind,
    fingerprint: Fingerprint,
    metadata: EntryMetadata,
}

impl EntrySnapshot {
    /// Build an entry, checking that the fingerprint shape matches the kind.
    pub fn new(
        path: PathKey,
        kind: EntryKind,
        fingerprint: Fingerprint,
    ) -> Result<Self, PrimitiveError> {
        if !kind.accepts(&fingerprint) {
            return Err(PrimitiveError::KindFingerprintMismatch {
                path: path.to_string(),
                kind,
                fingerprint: fingerprint.to_text(),
            });
        }
        Ok(Self {
            path,
            kind,
            fingerprint,
            metadata: EntryMetadata::default(),
        })
    }

    /// Regular file with a content digest.
    pub fn regular_file(path: PathKey, fingerprint: Fingerprint) -> Result<Self, PrimitiveError> {
        Self::new(path, EntryKind::RegularFile, fingerprint)
    }

    /// Directory entry.
    #[must_use]
    pub const fn directory(path: PathKey) -> Self {
        Self {
            path,
            kind: EntryKind::Directory,
            fingerprint: Fingerprint::directory(),
            metadata: EntryMetadata {
                length: None,
                last_modified_ms: None,
                observed_at_ms: None,
            },
        }
    }

    /// Entry that was tracked but is now absent or unreadable.
    #[must_use]
    pub const fn missing(path: PathKey) -> Self {
        Self {
            path,
            kind: EntryKind::Missing,
            fingerprint: Fingerprint::missing(),
            metadata: EntryMetadata {
                length: None,
                last_modified_ms: None,
                observed_at_ms: None,
            },
        }
    }

    /// Replace the metadata, keeping content identity.
    #[must_use]
    pub const fn with_metadata(mut self, metadata: EntryMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Path key.
    #[must_use]
    pub const fn path(&self) -> &PathKey {
        &self.path
    }

    /// Entry kind.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Content fingerprint.
    #[must_use]
    pub const fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Non-content metadata.
    #[must_use]
    pub const fn metadata(&self) -> &EntryMetadata {
        &self.metadata
    }

    /// True for regular files.
    #[must_use]
    pub const fn is_regular_file(&self) -> bool {
        matches!(self.kind, EntryKind::RegularFile)
    }

    /// Content identity comparison: kind and fingerprint, never metadata.
    #[must_use]
    pub fn has_same_content(&self, other: &Self) -> bool {
        self.kind == other.kind && self.fingerprint == other.fingerprint
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntrySnapshotRecord {
    path: PathKey,
    kind: EntryKind,
    fingerprint: Fingerprint,
    #[serde(default)]
    metadata: EntryMetadata,
}

impl TryFrom<EntrySnapshotRecord> for EntrySnapshot {
    type Error = PrimitiveError;

    fn try_from(record: EntrySnapshotRecord) -> Result<Self, Self::Error> {
        Ok(Self::new(record.path, record.kind, record.fingerprint)?.with_metadata(record.metadata))
    }
}

impl From<EntrySnapshot> for EntrySnapshotRecord {
    fn from(entry: EntrySnapshot) -> Self {
        Self {
            path: entry.path,
            kind: entry.kind,
            fingerprint: entry.fingerprint,
            metadata: entry.metadata,
        }
    }
}
