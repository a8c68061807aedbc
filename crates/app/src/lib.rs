//! # snapdiff-app
//!
//! Application use cases for build change detection.
//! This crate depends on `ports`, `core`, `domain`, and `shared`.

pub mod check_for_changes;

pub use check_for_changes::{
    ChangeMode, CheckForChangesDeps, CheckForChangesInput, CheckForChangesOutput,
    check_for_changes,
};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
