//! # snapdiff-ports
//!
//! Boundary traits between the snapshot engine and its collaborators:
//! content hashing, tree snapshotting, and snapshot persistence.
//!
//! This crate defines interfaces only. It depends on `core`, `domain`, and
//! `shared`; adapters implement the traits.

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod fingerprint;
pub mod snapshotter;
pub mod store;

pub use fingerprint::*;
pub use snapshotter::*;
pub use store::*;

// Re-export the types used in port signatures, so adapter crates can
// implement ports without naming every engine crate.
pub use snapdiff_core::Snapshot;
pub use snapdiff_domain::{CollectionId, Fingerprint};
