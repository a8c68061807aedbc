//! Lazy, ordered comparison of two snapshots.

use crate::Snapshot;
use snapdiff_domain::{ChangeKind, EntrySnapshot, PathKey};
use std::cmp::Ordering;
use std::collections::btree_map;
use std::iter::{FusedIterator, Peekable};

/// Entries on each side of a change; a side exists exactly when the kind needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delta<'a> {
    Added(&'a EntrySnapshot),
    Removed(&'a EntrySnapshot),
    Modified {
        previous: &'a EntrySnapshot,
        current: &'a EntrySnapshot,
    },
}

/// One content change between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change<'a> {
    path: &'a PathKey,
    delta: Delta<'a>,
}

impl<'a> Change<'a> {
    /// Path that changed.
    #[must_use]
    pub const fn path(&self) -> &'a PathKey {
        self.path
    }

    /// Added, removed, or modified.
    #[must_use]
    pub const fn kind(&self) -> ChangeKind {
        match self.delta {
            Delta::Added(_) => ChangeKind::Added,
            Delta::Removed(_) => ChangeKind::Removed,
            Delta::Modified { .. } => ChangeKind::Modified,
        }
    }

    /// Entry in the older snapshot (`None` when added).
    #[must_use]
    pub const fn previous(&self) -> Option<&'a EntrySnapshot> {
        match self.delta {
            Delta::Added(_) => None,
            Delta::Removed(previous) | Delta::Modified { previous, .. } => Some(previous),
        }
    }

    /// Entry in the newer snapshot (`None` when removed).
    #[must_use]
    pub const fn current(&self) -> Option<&'a EntrySnapshot> {
        match self.delta {
            Delta::Removed(_) => None,
            Delta::Added(current) | Delta::Modified { current, .. } => Some(current),
        }
    }

    pub(crate) const fn delta(&self) -> Delta<'a> {
        self.delta
    }
}

/// How a listener-driven walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOutcome {
    /// Every change was delivered.
    Completed,
    /// The listener asked to stop.
    Stopped,
}

type Entries<'a> = Peekable<btree_map::Iter<'a, PathKey, EntrySnapshot>>;

/// Pull-based sequence of [`Change`] events in path order.
///
/// Each call to `next` advances both snapshots only as far as the next
/// difference, so dropping the iterator early skips the remaining comparison.
#[derive(Debug)]
pub struct ChangeIterator<'a> {
    old: Entries<'a>,
    new: Entries<'a>,
    done: bool,
}

impl<'a> ChangeIterator<'a> {
    pub(crate) fn new(old: &'a Snapshot, new: &'a Snapshot) -> Self {
        Self {
            done: old.shares_entries_with(new),
            old: old.map().iter().peekable(),
            new: new.map().iter().peekable(),
        }
    }

    /// Deliver changes to `listener` until it returns `false` or none remain.
    ///
    /// No event is delivered after the listener asks to stop, and the
    /// iterator stays exhausted afterwards.
    pub fn visit<F>(&mut self, mut listener: F) -> IterationOutcome
    where
        F: FnMut(&Change<'a>) -> bool,
    {
        while let Some(change) = self.next() {
            if !listener(&change) {
                self.done = true;
                return IterationOutcome::Stopped;
            }
        }
        IterationOutcome::Completed
    }
}

impl<'a> Iterator for ChangeIterator<'a> {
    type Item = Change<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let order = match (self.old.peek(), self.new.peek()) {
                (None, None) => {
                    self.done = true;
                    return None;
                },
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some((old_path, _)), Some((new_path, _))) => old_path.cmp(new_path),
            };
            match order {
                Ordering::Less => {
                    let (path, previous) = self.old.next()?;
                    return Some(Change {
                        path,
                        delta: Delta::Removed(previous),
                    });
                },
                Ordering::Greater => {
                    let (path, current) = self.new.next()?;
                    return Some(Change {
                        path,
                        delta: Delta::Added(current),
                    });
                },
                Ordering::Equal => {
                    let (_, previous) = self.old.next()?;
                    let (path, current) = self.new.next()?;
                    if !previous.has_same_content(current) {
                        return Some(Change {
                            path,
                            delta: Delta::Modified { previous, current },
                        });
                    }
                },
            }
        }
    }
}

impl FusedIterator for ChangeIterator<'_> {}
