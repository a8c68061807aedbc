//! Property tests for diff and merge laws.

use proptest::prelude::*;
use snapdiff_core::Snapshot;
use snapdiff_domain::{ChangeKind, EntryMetadata, EntrySnapshot, Fingerprint, PathKey};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Shape {
    File(u8),
    Directory,
    Missing,
}

fn shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        6 => any::<u8>().prop_map(Shape::File),
        1 => Just(Shape::Directory),
        1 => Just(Shape::Missing),
    ]
}

fn layout() -> impl Strategy<Value = BTreeMap<String, (Shape, u64)>> {
    prop::collection::btree_map("[a-d]{1,3}", (shape(), 0_u64..4), 0..24)
}

fn build(layout: &BTreeMap<String, (Shape, u64)>) -> Option<Snapshot> {
    let entries = layout
        .iter()
        .map(|(path, (shape, mtime))| {
            let path = PathKey::new(path).ok()?;
            let entry = match shape {
                Shape::File(byte) => EntrySnapshot::regular_file(
                    path,
                    Fingerprint::from_digest(vec![*byte]).ok()?,
                )
                .ok()?,
                Shape::Directory => EntrySnapshot::directory(path),
                Shape::Missing => EntrySnapshot::missing(path),
            };
            Some(entry.with_metadata(EntryMetadata::file(1, *mtime)))
        })
        .collect::<Option<Vec<_>>>()?;
    Snapshot::from_entries(entries).ok()
}

proptest! {
    #[test]
    fn snapshot_has_no_changes_against_itself(layout in layout()) {
        let snapshot = build(&layout);
        prop_assert!(snapshot.is_some());
        if let Some(snapshot) = snapshot {
            let copy = Snapshot::from_entries(snapshot.entries().cloned());
            prop_assert!(copy.is_ok());
            if let Ok(copy) = copy {
                prop_assert_eq!(copy.iterate_changes_since(&snapshot).count(), 0);
            }
        }
    }

    #[test]
    fn applying_diff_reaches_new_content(old in layout(), new in layout()) {
        let (Some(old), Some(new)) = (build(&old), build(&new)) else {
            return Err(TestCaseError::fail("layout did not build"));
        };
        let applied = new.changes_since(&old).apply_to(&old);
        prop_assert!(applied.is_ok());
        if let Ok(applied) = applied {
            prop_assert!(!applied.has_changes_since(&new));
            prop_assert!(!new.has_changes_since(&applied));
        }
    }

    #[test]
    fn added_and_removed_are_symmetric(old in layout(), new in layout()) {
        let (Some(old), Some(new)) = (build(&old), build(&new)) else {
            return Err(TestCaseError::fail("layout did not build"));
        };
        let forward = new.changes_since(&old);
        let backward = old.changes_since(&new);

        let forward_added: Vec<&PathKey> = forward.added().iter().map(EntrySnapshot::path).collect();
        let backward_removed: Vec<&PathKey> = backward.removed().iter().collect();
        prop_assert_eq!(forward_added, backward_removed);

        let forward_changed: Vec<&PathKey> = forward.changed().iter().map(EntrySnapshot::path).collect();
        let backward_changed: Vec<&PathKey> = backward.changed().iter().map(EntrySnapshot::path).collect();
        prop_assert_eq!(forward_changed, backward_changed);
    }

    #[test]
    fn events_are_ordered_and_unique(old in layout(), new in layout()) {
        let (Some(old), Some(new)) = (build(&old), build(&new)) else {
            return Err(TestCaseError::fail("layout did not build"));
        };
        let paths: Vec<&PathKey> = new.iterate_changes_since(&old).map(|change| change.path()).collect();
        prop_assert!(paths.windows(2).all(|pair| pair[0] < pair[1]));
        for change in new.iterate_changes_since(&old) {
            match change.kind() {
                ChangeKind::Added => prop_assert!(!old.contains(change.path().as_str())),
                ChangeKind::Removed => prop_assert!(!new.contains(change.path().as_str())),
                ChangeKind::Modified => {
                    prop_assert!(old.contains(change.path().as_str()) && new.contains(change.path().as_str()));
                },
            }
        }
    }

    #[test]
    fn metadata_merge_preserves_content(stored in layout(), fresh in layout()) {
        let (Some(stored), Some(fresh)) = (build(&stored), build(&fresh)) else {
            return Err(TestCaseError::fail("layout did not build"));
        };
        let merged = stored.update_from(&fresh);

        prop_assert_eq!(merged.len(), stored.len());
        prop_assert!(!merged.has_changes_since(&stored));
        for entry in stored.entries() {
            let merged_entry = merged.get(entry.path().as_str());
            prop_assert_eq!(merged_entry.map(EntrySnapshot::fingerprint), Some(entry.fingerprint()));
        }
    }

    #[test]
    fn aggregate_fingerprint_ignores_metadata(layout in layout(), shift in 1_u64..100) {
        let touched: BTreeMap<String, (Shape, u64)> = layout
            .iter()
            .map(|(path, (shape, mtime))| (path.clone(), (shape.clone(), mtime + shift)))
            .collect();
        let (Some(base), Some(touched)) = (build(&layout), build(&touched)) else {
            return Err(TestCaseError::fail("layout did not build"));
        };
        prop_assert!(!touched.has_changes_since(&base));
        prop_assert_eq!(
            base.snapshot_set().aggregate_fingerprint(),
            touched.snapshot_set().aggregate_fingerprint()
        );
    }
}
