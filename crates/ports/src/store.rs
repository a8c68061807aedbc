//! Snapshot persistence boundary contract.

use snapdiff_core::Snapshot;
use snapdiff_domain::CollectionId;
use snapdiff_shared::Result;

/// Boundary contract for persisting snapshots between runs.
///
/// Snapshots are opaque values here; encoding is the implementation's concern.
pub trait SnapshotStorePort: Send + Sync {
    /// Load the last stored snapshot for a collection, if any.
    fn load(&self, collection: &CollectionId) -> Result<Option<Snapshot>>;

    /// Replace the stored snapshot for a collection.
    fn store(&self, collection: &CollectionId, snapshot: Snapshot) -> Result<()>;

    /// Forget a collection. Removing an unknown collection is not an error.
    fn remove(&self, collection: &CollectionId) -> Result<()>;
}
