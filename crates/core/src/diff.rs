//! Materialized, replayable change set.

use crate::differ::{Change, Delta};
use crate::snapshot::EntryMap;
use crate::{Snapshot, SnapshotError};
use serde::{Deserialize, Serialize};
use snapdiff_domain::{ChangeKind, EntrySnapshot, PathKey};
use std::collections::BTreeSet;

/// Added, removed, and changed paths between two snapshots.
///
/// The three sets are pairwise disjoint over path keys. Instances are
/// immutable; [`Diff::apply_to`] produces a new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DiffRecord", into = "DiffRecord")]
pub struct Diff {
    added: Vec<EntrySnapshot>,
    removed: Vec<PathKey>,
    changed: Vec<EntrySnapshot>,
}

impl Diff {
    /// Build a diff, rejecting a path that appears more than once.
    pub fn new(
        added: Vec<EntrySnapshot>,
        removed: Vec<PathKey>,
        changed: Vec<EntrySnapshot>,
    ) -> Result<Self, SnapshotError> {
        let mut seen = BTreeSet::new();
        let paths = added
            .iter()
            .map(EntrySnapshot::path)
            .chain(removed.iter())
            .chain(changed.iter().map(EntrySnapshot::path));
        for path in paths {
            if !seen.insert(path) {
                return Err(SnapshotError::OverlappingDiff { path: path.clone() });
            }
        }
        Ok(Self {
            added,
            removed,
            changed,
        })
    }

    /// Collect change events; paths are distinct because the differ visits each once.
    pub(crate) fn from_changes<'a>(changes: impl Iterator<Item = Change<'a>>) -> Self {
        let mut diff = Self::default();
        for change in changes {
            match change.delta() {
                Delta::Added(current) => diff.added.push(current.clone()),
                Delta::Modified { current, .. } => diff.changed.push(current.clone()),
                Delta::Removed(_) => diff.removed.push(change.path().clone()),
            }
        }
        diff
    }

    /// Entries present only in the newer snapshot.
    #[must_use]
    pub fn added(&self) -> &[EntrySnapshot] {
        &self.added
    }

    /// Paths present only in the older snapshot.
    #[must_use]
    pub fn removed(&self) -> &[PathKey] {
        &self.removed
    }

    /// Newer entries for paths whose content changed.
    #[must_use]
    pub fn changed(&self) -> &[EntrySnapshot] {
        &self.changed
    }

    /// True when the diff carries no change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Total number of changed paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }

    /// `(path, kind)` pairs: added first, then removed, then changed.
    pub fn iter(&self) -> impl Iterator<Item = (&PathKey, ChangeKind)> {
        let added = self
            .added
            .iter()
            .map(|entry| (entry.path(), ChangeKind::Added));
        let removed = self.removed.iter().map(|path| (path, ChangeKind::Removed));
        let changed = self
            .changed
            .iter()
            .map(|entry| (entry.path(), ChangeKind::Modified));
        added.chain(removed).chain(changed)
    }

    /// Replay this diff on top of `base`, returning a new snapshot.
    ///
    /// Removing a path `base` does not track is a no-op. Adding a path that
    /// `base` already records with different content means the diff was
    /// computed against another baseline and fails.
    pub fn apply_to(&self, base: &Snapshot) -> Result<Snapshot, SnapshotError> {
        if self.is_empty() {
            return Ok(base.clone());
        }

        for entry in &self.added {
            if let Some(existing) = base.get(entry.path().as_str()) {
                if !existing.has_same_content(entry) {
                    return Err(SnapshotError::InvalidDiffApplication {
                        path: entry.path().clone(),
                        recorded: entry.fingerprint().clone(),
                        found: existing.fingerprint().clone(),
                    });
                }
            }
        }

        let mut entries: EntryMap = base.map().clone();
        for path in &self.removed {
            entries.remove(path.as_str());
        }
        for entry in self.added.iter().chain(&self.changed) {
            entries.insert(entry.path().clone(), entry.clone());
        }

        tracing::debug!(
            base_entries = base.len(),
            result_entries = entries.len(),
            added = self.added.len(),
            removed = self.removed.len(),
            changed = self.changed.len(),
            "applied diff"
        );
        Ok(Snapshot::from_map(entries))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiffRecord {
    #[serde(default)]
    added: Vec<EntrySnapshot>,
    #[serde(default)]
    removed: Vec<PathKey>,
    #[serde(default)]
    changed: Vec<EntrySnapshot>,
}

impl TryFrom<DiffRecord> for Diff {
    type Error = SnapshotError;

    fn try_from(record: DiffRecord) -> Result<Self, Self::Error> {
        Self::new(record.added, record.removed, record.changed)
    }
}

impl From<Diff> for DiffRecord {
    fn from(diff: Diff) -> Self {
        Self {
            added: diff.added,
            removed: diff.removed,
            changed: diff.changed,
        }
    }
}
