//! Decide whether a tracked collection changed since the last run.

use snapdiff_core::{Snapshot, SnapshotError};
use snapdiff_domain::{ChangeKind, CollectionId, PathKey};
use snapdiff_ports::{SnapshotStorePort, SnapshotterPort};
use snapdiff_shared::{Result, ResultExt};
use std::sync::Arc;

/// How much of the change set the caller needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChangeMode {
    /// Stop at the first change; enough for an up-to-date verdict.
    #[default]
    FirstChange,
    /// Report every added, removed, and modified path.
    Full,
}

/// Input payload for check-for-changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckForChangesInput {
    /// Collection whose previous snapshot is compared.
    pub collection: CollectionId,
    /// Reporting depth.
    pub mode: ChangeMode,
}

/// Output returned by check-for-changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckForChangesOutput {
    /// True when nothing changed since the stored snapshot.
    pub up_to_date: bool,
    /// Paths tracked now but not before.
    pub added: Vec<PathKey>,
    /// Paths tracked before but not now.
    pub removed: Vec<PathKey>,
    /// Paths whose content identity changed.
    pub modified: Vec<PathKey>,
}

impl CheckForChangesOutput {
    /// Total number of reported paths.
    #[must_use]
    pub fn total_changes(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    fn record(&mut self, kind: ChangeKind, path: PathKey) {
        match kind {
            ChangeKind::Added => self.added.push(path),
            ChangeKind::Removed => self.removed.push(path),
            ChangeKind::Modified => self.modified.push(path),
        }
    }
}

/// Dependencies required by check-for-changes.
#[derive(Clone)]
pub struct CheckForChangesDeps {
    /// Produces the fresh snapshot.
    pub snapshotter: Arc<dyn SnapshotterPort>,
    /// Holds the snapshot recorded by the previous run.
    pub store: Arc<dyn SnapshotStorePort>,
}

/// Compare the collection against its stored snapshot and persist the result.
#[tracing::instrument(
    name = "check_for_changes",
    skip_all,
    fields(collection = %input.collection, mode = ?input.mode)
)]
pub fn check_for_changes(
    deps: &CheckForChangesDeps,
    input: &CheckForChangesInput,
) -> Result<CheckForChangesOutput> {
    let previous = deps
        .store
        .load(&input.collection)
        .with_metadata("collection", input.collection.as_str())?;
    let current = deps
        .snapshotter
        .snapshot(previous.as_ref())
        .with_metadata("collection", input.collection.as_str())?;

    let (output, next) = match previous {
        None => (first_run(&current, input.mode), current),
        Some(previous) => match input.mode {
            ChangeMode::FirstChange => first_change(&previous, current),
            ChangeMode::Full => full_report(&previous, current)?,
        },
    };

    tracing::debug!(
        up_to_date = output.up_to_date,
        changes = output.total_changes(),
        stored_entries = next.len(),
        "change check finished"
    );
    deps.store.store(&input.collection, next)?;
    Ok(output)
}

fn first_run(current: &Snapshot, mode: ChangeMode) -> CheckForChangesOutput {
    let paths = current.paths().cloned();
    let added = match mode {
        ChangeMode::FirstChange => paths.take(1).collect(),
        ChangeMode::Full => paths.collect(),
    };
    CheckForChangesOutput {
        up_to_date: false,
        added,
        ..CheckForChangesOutput::default()
    }
}

fn first_change(previous: &Snapshot, current: Snapshot) -> (CheckForChangesOutput, Snapshot) {
    let first = current
        .iterate_changes_since(previous)
        .next()
        .map(|change| (change.kind(), change.path().clone()));

    let mut output = CheckForChangesOutput::default();
    match first {
        None => {
            output.up_to_date = true;
            (output, previous.update_from(&current))
        },
        Some((kind, path)) => {
            output.record(kind, path);
            (output, current)
        },
    }
}

fn full_report(previous: &Snapshot, current: Snapshot) -> Result<(CheckForChangesOutput, Snapshot)> {
    let diff = current.changes_since(previous);
    let mut output = CheckForChangesOutput {
        up_to_date: diff.is_empty(),
        ..CheckForChangesOutput::default()
    };
    for (path, kind) in diff.iter() {
        output.record(kind, path.clone());
    }

    if diff.is_empty() {
        return Ok((output, previous.update_from(&current)));
    }

    let next = match diff.apply_to(previous) {
        Ok(applied) => applied.update_from(&current),
        Err(error @ SnapshotError::InvalidDiffApplication { .. }) => {
            tracing::warn!(%error, "diff no longer applies, storing fresh snapshot");
            current
        },
        Err(error) => return Err(error.into()),
    };
    Ok((output, next))
}
