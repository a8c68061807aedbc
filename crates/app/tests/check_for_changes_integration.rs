//! End-to-end change checks over the reference adapters.

use snapdiff_adapters::{
    InMemorySnapshotStore, InMemorySnapshotter, Sha256Fingerprinter, SnapshotterSettings,
};
use snapdiff_app::{ChangeMode, CheckForChangesDeps, CheckForChangesInput, check_for_changes};
use snapdiff_config::{EngineEnv, load_engine_config_from_sources};
use snapdiff_domain::{CollectionId, PathKey};
use std::error::Error;
use std::sync::Arc;

struct Harness {
    tree: Arc<InMemorySnapshotter>,
    deps: CheckForChangesDeps,
    collection: CollectionId,
}

impl Harness {
    fn new(settings: SnapshotterSettings) -> Result<Self, Box<dyn Error>> {
        let tree = Arc::new(InMemorySnapshotter::new(Arc::new(Sha256Fingerprinter), settings));
        let deps = CheckForChangesDeps {
            snapshotter: Arc::clone(&tree) as _,
            store: Arc::new(InMemorySnapshotStore::new()),
        };
        Ok(Self {
            tree,
            deps,
            collection: CollectionId::parse("task:test-inputs")?,
        })
    }

    fn check(&self, mode: ChangeMode) -> snapdiff_shared::Result<snapdiff_app::CheckForChangesOutput> {
        check_for_changes(&self.deps, &CheckForChangesInput {
            collection: self.collection.clone(),
            mode,
        })
    }
}

fn names(paths: &[PathKey]) -> Vec<&str> {
    paths.iter().map(PathKey::as_str).collect()
}

#[test]
fn consecutive_runs_track_edits() -> Result<(), Box<dyn Error>> {
    let harness = Harness::new(SnapshotterSettings::default())?;
    harness.tree.write_file("a", "A", 1)?;
    harness.tree.write_file("b", "B", 1)?;

    let first = harness.check(ChangeMode::Full)?;
    assert!(!first.up_to_date);
    assert_eq!(names(&first.added), ["a", "b"]);

    assert!(harness.check(ChangeMode::Full)?.up_to_date);

    harness.tree.write_file("b", "B2", 2)?;
    harness.tree.write_file("c", "C", 2)?;
    let third = harness.check(ChangeMode::Full)?;
    assert_eq!(names(&third.modified), ["b"]);
    assert_eq!(names(&third.added), ["c"]);
    assert!(third.removed.is_empty());

    harness.tree.remove("b")?;
    harness.tree.remove("c")?;
    let fourth = harness.check(ChangeMode::Full)?;
    assert_eq!(names(&fourth.removed), ["b", "c"]);
    assert_eq!(fourth.total_changes(), 2);
    Ok(())
}

#[test]
fn touching_files_keeps_collection_up_to_date() -> Result<(), Box<dyn Error>> {
    let harness = Harness::new(SnapshotterSettings::default())?;
    harness.tree.write_file("a", "A", 1)?;
    harness.check(ChangeMode::FirstChange)?;

    harness.tree.write_file("a", "A", 50)?;
    assert!(harness.check(ChangeMode::FirstChange)?.up_to_date);

    // The stored mtime was refreshed, so the next run reuses the digest.
    let reused_before = harness.tree.stats().reused;
    assert!(harness.check(ChangeMode::FirstChange)?.up_to_date);
    assert_eq!(harness.tree.stats().reused, reused_before + 1);
    Ok(())
}

#[test]
fn first_change_mode_stops_early() -> Result<(), Box<dyn Error>> {
    let harness = Harness::new(SnapshotterSettings::default())?;
    for name in ["a", "b", "c", "d"] {
        harness.tree.write_file(name, name, 1)?;
    }
    harness.check(ChangeMode::Full)?;

    harness.tree.write_file("b", "changed", 2)?;
    harness.tree.remove("c")?;
    harness.tree.write_file("e", "new", 2)?;

    let output = harness.check(ChangeMode::FirstChange)?;
    assert!(!output.up_to_date);
    assert_eq!(output.total_changes(), 1);
    assert_eq!(names(&output.modified), ["b"]);

    // The fresh snapshot was stored, so the same tree is now up to date.
    assert!(harness.check(ChangeMode::Full)?.up_to_date);
    Ok(())
}

#[test]
fn configured_limit_surfaces_as_error() -> Result<(), Box<dyn Error>> {
    let config = load_engine_config_from_sources(
        Some(r#"{ "version": 1, "snapshot": { "maxEntries": 2 } }"#),
        None,
        &EngineEnv::default(),
    )?;
    let harness = Harness::new(SnapshotterSettings::from_config(&config))?;
    for name in ["a", "b", "c"] {
        harness.tree.write_file(name, name, 1)?;
    }

    let error = harness
        .check(ChangeMode::Full)
        .err()
        .ok_or("limit should be enforced")?;
    assert!(error.has_code("snapshot", "too_many_entries"));
    Ok(())
}
