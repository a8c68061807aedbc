//! In-memory snapshot persistence.
//!
//! Snapshots are kept as their JSON wire form, so every load exercises the
//! same decode path a durable store would.

use snapdiff_core::Snapshot;
use snapdiff_domain::CollectionId;
use snapdiff_ports::SnapshotStorePort;
use snapdiff_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Snapshot store backed by a map of encoded snapshots.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    records: RwLock<BTreeMap<CollectionId, Box<str>>>,
}

impl InMemorySnapshotStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored collections.
    pub fn len(&self) -> Result<usize> {
        Ok(self.records.read().map_err(|_| lock_poisoned())?.len())
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Store a raw record without validation.
    pub fn put_raw(&self, collection: &CollectionId, record: impl Into<Box<str>>) -> Result<()> {
        let mut records = self.records.write().map_err(|_| lock_poisoned())?;
        records.insert(collection.clone(), record.into());
        Ok(())
    }
}

impl SnapshotStorePort for InMemorySnapshotStore {
    fn load(&self, collection: &CollectionId) -> Result<Option<Snapshot>> {
        let records = self.records.read().map_err(|_| lock_poisoned())?;
        let Some(record) = records.get(collection) else {
            return Ok(None);
        };

        let snapshot: Snapshot = serde_json::from_str(record).map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::new("store", "corrupt_snapshot"),
                format!("failed to decode stored snapshot: {error}"),
                ErrorClass::NonRetriable,
            )
            .with_metadata("collection", collection.as_str())
        })?;
        tracing::debug!(collection = %collection, entries = snapshot.len(), "snapshot loaded");
        Ok(Some(snapshot))
    }

    fn store(&self, collection: &CollectionId, snapshot: Snapshot) -> Result<()> {
        let record = serde_json::to_string(&snapshot).map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::new("store", "encode_snapshot"),
                format!("failed to encode snapshot: {error}"),
                ErrorClass::NonRetriable,
            )
            .with_metadata("collection", collection.as_str())
        })?;

        let mut records = self.records.write().map_err(|_| lock_poisoned())?;
        records.insert(collection.clone(), record.into_boxed_str());
        tracing::debug!(collection = %collection, entries = snapshot.len(), "snapshot stored");
        Ok(())
    }

    fn remove(&self, collection: &CollectionId) -> Result<()> {
        let mut records = self.records.write().map_err(|_| lock_poisoned())?;
        records.remove(collection);
        Ok(())
    }
}

fn lock_poisoned() -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("store", "lock_poisoned"),
        "snapshot store lock poisoned",
        ErrorClass::NonRetriable,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapdiff_domain::{EntryMetadata, EntrySnapshot, Fingerprint, PathKey};
    use std::error::Error;

    fn sample() -> Result<Snapshot, Box<dyn Error>> {
        Ok(Snapshot::from_entries([
            EntrySnapshot::regular_file(PathKey::new("a.txt")?, Fingerprint::from_sha256([1; 32]))?
                .with_metadata(EntryMetadata::file(3, 100).observed_at(200)),
            EntrySnapshot::directory(PathKey::new("dir")?),
            EntrySnapshot::missing(PathKey::new("gone")?),
        ])?)
    }

    #[test]
    fn store_then_load_preserves_entries() -> Result<(), Box<dyn Error>> {
        let store = InMemorySnapshotStore::new();
        let collection = CollectionId::parse("compile-inputs")?;
        let snapshot = sample()?;

        store.store(&collection, snapshot.clone())?;
        let loaded = store.load(&collection)?.ok_or("snapshot should be stored")?;

        assert!(!loaded.has_changes_since(&snapshot));
        assert_eq!(loaded.get("a.txt"), snapshot.get("a.txt"));
        assert_eq!(store.len()?, 1);
        Ok(())
    }

    #[test]
    fn unknown_collection_loads_none() -> Result<(), Box<dyn Error>> {
        let store = InMemorySnapshotStore::new();
        assert!(store.load(&CollectionId::parse("nothing")?)?.is_none());
        assert!(store.is_empty()?);
        Ok(())
    }

    #[test]
    fn remove_forgets_collection() -> Result<(), Box<dyn Error>> {
        let store = InMemorySnapshotStore::new();
        let collection = CollectionId::parse("outputs")?;
        store.store(&collection, sample()?)?;
        store.remove(&collection)?;
        store.remove(&collection)?;
        assert!(store.load(&collection)?.is_none());
        Ok(())
    }

    #[test]
    fn corrupt_record_is_reported() -> Result<(), Box<dyn Error>> {
        let store = InMemorySnapshotStore::new();
        let collection = CollectionId::parse("broken")?;
        store.put_raw(&collection, "{not json")?;

        let error = store.load(&collection).err().ok_or("decode should fail")?;
        assert!(error.has_code("store", "corrupt_snapshot"));
        assert_eq!(
            error.metadata.get("collection").map(String::as_str),
            Some("broken")
        );
        Ok(())
    }

    #[test]
    fn duplicate_paths_in_record_are_rejected() -> Result<(), Box<dyn Error>> {
        let store = InMemorySnapshotStore::new();
        let collection = CollectionId::parse("dupes")?;
        let entry = serde_json::to_string(&EntrySnapshot::directory(PathKey::new("d")?))?;
        store.put_raw(&collection, format!("[{entry},{entry}]"))?;

        assert!(store.load(&collection).is_err());
        Ok(())
    }
}
