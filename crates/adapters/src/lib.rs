//! # snapdiff-adapters
//!
//! Reference implementations of the snapdiff ports: SHA-256 content hashing,
//! an in-memory tree snapshotter, an in-memory snapshot store, and tracing
//! subscriber setup. This crate depends on `ports`, `core`, `domain`,
//! `shared`, and `config`.

pub mod fingerprint;
pub mod snapshotter;
pub mod store;
pub mod telemetry;

pub use fingerprint::Sha256Fingerprinter;
pub use snapshotter::{InMemorySnapshotter, SnapshotterSettings, SnapshotterStats};
pub use store::InMemorySnapshotStore;
pub use telemetry::init_tracing;

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
