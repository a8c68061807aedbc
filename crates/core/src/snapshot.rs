//! Immutable snapshot of a file collection.

use crate::differ::ChangeIterator;
use crate::{Diff, SnapshotError, SnapshotSet};
use serde::{Deserialize, Serialize};
use snapdiff_domain::{EntryMetadata, EntrySnapshot, Fingerprint, PathKey};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

pub(crate) type EntryMap = BTreeMap<PathKey, EntrySnapshot>;

/// The state of a set of files at one instant.
///
/// Entries are keyed by [`PathKey`] and kept in lexicographic order, which is
/// also the order every diff visits them in. The mapping is shared, so cloning
/// a snapshot is cheap and no operation ever mutates a published instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<EntrySnapshot>", into = "Vec<EntrySnapshot>")]
pub struct Snapshot {
    entries: Arc<EntryMap>,
}

impl Snapshot {
    /// Snapshot tracking nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from entries, failing on duplicate paths.
    pub fn from_entries<I>(entries: I) -> Result<Self, SnapshotError>
    where
        I: IntoIterator<Item = EntrySnapshot>,
    {
        let mut builder = SnapshotBuilder::new();
        for entry in entries {
            builder.insert(entry)?;
        }
        Ok(builder.build())
    }

    pub(crate) fn from_map(entries: EntryMap) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }

    pub(crate) fn map(&self) -> &EntryMap {
        &self.entries
    }

    /// Number of tracked paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the entry recorded for a path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&EntrySnapshot> {
        self.entries.get(path)
    }

    /// True when the path is tracked (including as a missing entry).
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// All tracked paths in order.
    pub fn paths(&self) -> impl ExactSizeIterator<Item = &PathKey> + DoubleEndedIterator {
        self.entries.keys()
    }

    /// All entries in path order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &EntrySnapshot> + DoubleEndedIterator {
        self.entries.values()
    }

    /// Paths of regular-file entries only.
    pub fn files(&self) -> impl Iterator<Item = &PathKey> {
        self.entries
            .values()
            .filter(|entry| entry.is_regular_file())
            .map(EntrySnapshot::path)
    }

    /// Flattened path/fingerprint view.
    #[must_use]
    pub fn snapshot_set(&self) -> SnapshotSet<'_> {
        SnapshotSet::new(&self.entries)
    }

    /// Fingerprint that may be reused for `path` without rehashing.
    ///
    /// Returns the recorded digest of a regular file when the freshly observed
    /// length and mtime are both known and equal to the recorded ones.
    #[must_use]
    pub fn reusable_fingerprint(&self, path: &str, observed: &EntryMetadata) -> Option<&Fingerprint> {
        self.entries
            .get(path)
            .filter(|entry| entry.is_regular_file() && entry.metadata().matches_file_stat(observed))
            .map(EntrySnapshot::fingerprint)
    }

    /// True when both snapshots share the same underlying mapping.
    #[must_use]
    pub fn shares_entries_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Lazily iterate content changes from `old` to `self`.
    ///
    /// Paths are visited in lexicographic order; stop pulling (or return
    /// `false` from [`ChangeIterator::visit`]) to cancel the comparison.
    #[must_use]
    pub fn iterate_changes_since<'a>(&'a self, old: &'a Self) -> ChangeIterator<'a> {
        ChangeIterator::new(old, self)
    }

    /// True when at least one path changed since `old`. Stops at the first change.
    #[must_use]
    pub fn has_changes_since(&self, old: &Self) -> bool {
        self.iterate_changes_since(old).next().is_some()
    }

    /// Materialize every change from `old` to `self`.
    #[must_use]
    pub fn changes_since(&self, old: &Self) -> Diff {
        let diff = Diff::from_changes(self.iterate_changes_since(old));
        tracing::debug!(
            added = diff.added().len(),
            removed = diff.removed().len(),
            changed = diff.changed().len(),
            "materialized snapshot diff"
        );
        diff
    }
}

impl TryFrom<Vec<EntrySnapshot>> for Snapshot {
    type Error = SnapshotError;

    fn try_from(entries: Vec<EntrySnapshot>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<Snapshot> for Vec<EntrySnapshot> {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.entries.values().cloned().collect()
    }
}

/// Incremental snapshot construction for snapshotting collaborators.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    entries: EntryMap,
    max_entries: Option<usize>,
}

impl SnapshotBuilder {
    /// Create an unbounded builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject collections larger than `max_entries`.
    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Add one entry. Fails fast on a repeated path or when the limit is hit.
    pub fn insert(&mut self, entry: EntrySnapshot) -> Result<(), SnapshotError> {
        if let Some(max) = self.max_entries {
            if self.entries.len() >= max {
                return Err(SnapshotError::TooManyEntries { max });
            }
        }
        match self.entries.entry(entry.path().clone()) {
            Entry::Occupied(occupied) => Err(SnapshotError::DuplicatePath {
                path: occupied.key().clone(),
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
                Ok(())
            },
        }
    }

    /// Number of entries added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entry was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the entries into an immutable snapshot.
    #[must_use]
    pub fn build(self) -> Snapshot {
        Snapshot::from_map(self.entries)
    }
}
