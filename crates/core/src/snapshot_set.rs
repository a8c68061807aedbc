//! Flattened path/fingerprint view of a snapshot.

use crate::snapshot::EntryMap;
use sha2::{Digest, Sha256};
use snapdiff_domain::{EntryKind, Fingerprint, PathKey};

/// Read-only projection of a snapshot onto `(path, fingerprint)` pairs.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotSet<'a> {
    entries: &'a EntryMap,
}

impl<'a> SnapshotSet<'a> {
    pub(crate) const fn new(entries: &'a EntryMap) -> Self {
        Self { entries }
    }

    /// Number of paths in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &'a PathKey> + use<'a> {
        self.entries.keys()
    }

    /// Fingerprint recorded for `path`.
    #[must_use]
    pub fn fingerprint(&self, path: &str) -> Option<&'a Fingerprint> {
        self.entries.get(path).map(|entry| entry.fingerprint())
    }

    /// `(path, fingerprint)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a PathKey, &'a Fingerprint)> + use<'a> {
        self.entries
            .iter()
            .map(|(path, entry)| (path, entry.fingerprint()))
    }

    /// Single fingerprint identifying the whole collection's content.
    ///
    /// Hashes every path, kind and fingerprint in order; metadata is excluded,
    /// so two snapshots with equal content always aggregate to the same value.
    #[must_use]
    pub fn aggregate_fingerprint(&self) -> Fingerprint {
        let mut hasher = Sha256::new();
        for (path, entry) in self.entries {
            let text = entry.fingerprint().to_text();
            hasher.update(length_prefix(path.as_str().len()));
            hasher.update(path.as_str().as_bytes());
            hasher.update([kind_tag(entry.kind())]);
            hasher.update(length_prefix(text.len()));
            hasher.update(text.as_bytes());
        }
        Fingerprint::from_sha256(hasher.finalize().into())
    }
}

fn length_prefix(len: usize) -> [u8; 8] {
    u64::try_from(len).unwrap_or(u64::MAX).to_le_bytes()
}

const fn kind_tag(kind: EntryKind) -> u8 {
    match kind {
        EntryKind::RegularFile => 0,
        EntryKind::Directory => 1,
        EntryKind::Missing => 2,
    }
}
