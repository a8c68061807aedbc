//! In-memory tree snapshotter.
//!
//! Holds a mutable tree of files and directories and turns it into immutable
//! [`Snapshot`]s on demand. Used by tests and by embedders that already keep
//! their inputs in memory; it never touches the real filesystem.

use snapdiff_config::ValidatedEngineConfig;
use snapdiff_core::{Snapshot, SnapshotBuilder};
use snapdiff_domain::{EntryMetadata, EntrySnapshot, PathKey};
use snapdiff_ports::{FingerprintPort, SnapshotterPort};
use snapdiff_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_MAX_ENTRIES: usize = 1_000_000;

/// Snapshot construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotterSettings {
    /// Reject trees with more entries than this.
    pub max_entries: usize,
    /// Reuse a recorded digest when length and mtime are unchanged.
    pub reuse_fingerprints: bool,
}

impl SnapshotterSettings {
    /// Derive settings from a validated engine config.
    #[must_use]
    pub fn from_config(config: &ValidatedEngineConfig) -> Self {
        Self {
            max_entries: config.limits().snapshot_max_entries.as_usize(),
            reuse_fingerprints: config.snapshot.reuse_fingerprints,
        }
    }
}

impl Default for SnapshotterSettings {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            reuse_fingerprints: true,
        }
    }
}

/// Cumulative hashing counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotterStats {
    /// Contents actually hashed.
    pub hashed: u64,
    /// Fingerprints reused from the previous snapshot.
    pub reused: u64,
}

#[derive(Debug, Clone)]
enum TreeNode {
    File { content: Arc<[u8]>, modified_ms: u64 },
    Directory,
    Unreadable,
}

/// Snapshotter over an in-memory tree.
pub struct InMemorySnapshotter {
    fingerprinter: Arc<dyn FingerprintPort>,
    settings: SnapshotterSettings,
    tree: RwLock<BTreeMap<PathKey, TreeNode>>,
    hashed: AtomicU64,
    reused: AtomicU64,
}

impl InMemorySnapshotter {
    /// Create an empty tree.
    #[must_use]
    pub fn new(fingerprinter: Arc<dyn FingerprintPort>, settings: SnapshotterSettings) -> Self {
        Self {
            fingerprinter,
            settings,
            tree: RwLock::new(BTreeMap::new()),
            hashed: AtomicU64::new(0),
            reused: AtomicU64::new(0),
        }
    }

    /// Settings in effect.
    #[must_use]
    pub const fn settings(&self) -> SnapshotterSettings {
        self.settings
    }

    /// Create or overwrite a file.
    pub fn write_file(&self, path: &str, content: impl Into<Vec<u8>>, modified_ms: u64) -> Result<()> {
        let content: Vec<u8> = content.into();
        self.put(
            path,
            TreeNode::File {
                content: content.into(),
                modified_ms,
            },
        )
    }

    /// Create or replace a directory entry.
    pub fn create_dir(&self, path: &str) -> Result<()> {
        self.put(path, TreeNode::Directory)
    }

    /// Keep `path` tracked but make its content unreadable.
    pub fn mark_unreadable(&self, path: &str) -> Result<()> {
        self.put(path, TreeNode::Unreadable)
    }

    /// Drop `path` from the tree. Returns whether it was present.
    pub fn remove(&self, path: &str) -> Result<bool> {
        let mut tree = self.tree.write().map_err(|_| lock_poisoned())?;
        Ok(tree.remove(path).is_some())
    }

    /// Hashing counters since construction.
    #[must_use]
    pub fn stats(&self) -> SnapshotterStats {
        SnapshotterStats {
            hashed: self.hashed.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
        }
    }

    fn put(&self, path: &str, node: TreeNode) -> Result<()> {
        let key = PathKey::new(path)?;
        let mut tree = self.tree.write().map_err(|_| lock_poisoned())?;
        tree.insert(key, node);
        Ok(())
    }

    fn file_entry(
        &self,
        path: &PathKey,
        content: &[u8],
        modified_ms: u64,
        observed_at_ms: u64,
        previous: Option<&Snapshot>,
        run: &mut SnapshotterStats,
    ) -> Result<EntrySnapshot> {
        let length = u64::try_from(content.len()).unwrap_or(u64::MAX);
        let metadata = EntryMetadata::file(length, modified_ms).observed_at(observed_at_ms);

        let reusable = previous
            .filter(|_| self.settings.reuse_fingerprints)
            .and_then(|snapshot| snapshot.reusable_fingerprint(path.as_str(), &metadata));
        if let Some(fingerprint) = reusable {
            run.reused += 1;
            return Ok(EntrySnapshot::regular_file(path.clone(), fingerprint.clone())?
                .with_metadata(metadata));
        }

        match self.fingerprinter.fingerprint_reader(&mut Cursor::new(content)) {
            Ok(fingerprint) => {
                run.hashed += 1;
                Ok(EntrySnapshot::regular_file(path.clone(), fingerprint)?.with_metadata(metadata))
            },
            Err(error) => {
                tracing::warn!(path = %path, code = %error.code, "content unreadable, recording as missing");
                Ok(unreadable_entry(path, observed_at_ms))
            },
        }
    }
}

impl SnapshotterPort for InMemorySnapshotter {
    fn snapshot(&self, previous: Option<&Snapshot>) -> Result<Snapshot> {
        let observed_at_ms = now_epoch_ms();
        let tree = self.tree.read().map_err(|_| lock_poisoned())?;
        let mut builder = SnapshotBuilder::new().with_max_entries(self.settings.max_entries);
        let mut run = SnapshotterStats::default();

        for (path, node) in tree.iter() {
            let entry = match node {
                TreeNode::File {
                    content,
                    modified_ms,
                } => {
                    self.file_entry(path, content, *modified_ms, observed_at_ms, previous, &mut run)?
                },
                TreeNode::Directory => EntrySnapshot::directory(path.clone())
                    .with_metadata(EntryMetadata::default().observed_at(observed_at_ms)),
                TreeNode::Unreadable => {
                    tracing::warn!(path = %path, "content unreadable, recording as missing");
                    unreadable_entry(path, observed_at_ms)
                },
            };
            builder.insert(entry)?;
        }

        self.hashed.fetch_add(run.hashed, Ordering::Relaxed);
        self.reused.fetch_add(run.reused, Ordering::Relaxed);
        tracing::debug!(
            entries = builder.len(),
            hashed = run.hashed,
            reused = run.reused,
            "snapshot taken"
        );
        Ok(builder.build())
    }
}

fn unreadable_entry(path: &PathKey, observed_at_ms: u64) -> EntrySnapshot {
    EntrySnapshot::missing(path.clone())
        .with_metadata(EntryMetadata::default().observed_at(observed_at_ms))
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

fn lock_poisoned() -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("snapshotter", "lock_poisoned"),
        "snapshotter tree lock poisoned",
        ErrorClass::NonRetriable,
    )
}
