//! Content hashing boundary contract.

use snapdiff_domain::Fingerprint;
use snapdiff_shared::Result;
use std::io::Read;

/// Boundary contract for the content-hashing capability.
///
/// Equal content MUST yield equal fingerprints and distinct content MUST NOT
/// collide. Implementations never return the `missing` or `directory`
/// sentinels; those are assigned by the snapshotter.
pub trait FingerprintPort: Send + Sync {
    /// Fingerprint an in-memory buffer.
    fn fingerprint_bytes(&self, content: &[u8]) -> Fingerprint;

    /// Fingerprint a stream, propagating read failures.
    fn fingerprint_reader(&self, reader: &mut dyn Read) -> Result<Fingerprint>;
}
