//! Tree walking + hashing boundary contract.

use snapdiff_core::Snapshot;
use snapdiff_shared::Result;

/// Boundary contract for producing a fresh snapshot of a file collection.
///
/// The returned snapshot is fully populated. Entries that are tracked but
/// cannot be read MUST be recorded as `Missing`, never left out.
pub trait SnapshotterPort: Send + Sync {
    /// Snapshot the collection now.
    ///
    /// `previous` lets the implementation skip rehashing files whose recorded
    /// metadata still matches (see [`Snapshot::reusable_fingerprint`]).
    fn snapshot(&self, previous: Option<&Snapshot>) -> Result<Snapshot>;
}
