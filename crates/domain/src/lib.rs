//! # snapdiff-domain
//!
//! Domain value types for file-collection snapshots:
//!
//! - **Primitives** - `PathKey`, `CollectionId`
//! - **Fingerprint** - opaque content identity with `missing`/`directory` sentinels
//! - **Entry** - `EntryKind`, `EntryMetadata`, `EntrySnapshot`
//! - **Change** - `ChangeKind`
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - Pure value types with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use snapdiff_shared::shared_crate_version;

pub mod change;
pub mod entry;
pub mod fingerprint;
pub mod primitives;

pub use change::ChangeKind;
pub use entry::{EntryKind, EntryMetadata, EntrySnapshot};
pub use fingerprint::Fingerprint;
pub use primitives::{CollectionId, PathKey, PrimitiveError};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
