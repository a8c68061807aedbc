//! # snapdiff-core
//!
//! Snapshot and diff engine for build change detection.
//!
//! A [`Snapshot`] is the immutable state of a file collection at one point in
//! time. Comparing two snapshots yields a lazy [`ChangeIterator`] that callers
//! may stop at the first change, or a materialized [`Diff`] that can be
//! replayed onto a snapshot. [`Snapshot::update_from`] refreshes bookkeeping
//! metadata between runs without touching content identity.
//!
//! ```
//! use snapdiff_core::Snapshot;
//! use snapdiff_domain::{EntrySnapshot, Fingerprint, PathKey};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = |path: &str, byte: u8| -> Result<EntrySnapshot, Box<dyn std::error::Error>> {
//!     Ok(EntrySnapshot::regular_file(PathKey::new(path)?, Fingerprint::from_digest(vec![byte])?)?)
//! };
//! let old = Snapshot::from_entries([file("a", 1)?, file("b", 2)?])?;
//! let new = Snapshot::from_entries([file("a", 1)?, file("b", 3)?, file("c", 4)?])?;
//!
//! let changed: Vec<String> = new
//!     .iterate_changes_since(&old)
//!     .map(|change| format!("{} {}", change.kind(), change.path()))
//!     .collect();
//! assert_eq!(changed, ["modified b", "added c"]);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod diff;
mod differ;
mod error;
mod merge;
mod snapshot;
mod snapshot_set;

pub use diff::Diff;
pub use differ::{Change, ChangeIterator, IterationOutcome};
pub use error::SnapshotError;
pub use snapshot::{Snapshot, SnapshotBuilder};
pub use snapshot_set::SnapshotSet;

/// Returns the crate version.
#[must_use]
pub const fn core_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
