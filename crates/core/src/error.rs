//! Snapshot engine error taxonomy.

use snapdiff_domain::{Fingerprint, PathKey};
use snapdiff_shared::{ErrorCode, ErrorEnvelope};

/// Failures raised by snapshot construction and diff application.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// A snapshot was handed the same path twice.
    #[error("path `{path}` appears more than once in snapshot input")]
    DuplicatePath {
        /// Repeated path.
        path: PathKey,
    },
    /// A snapshot grew past its configured bound.
    #[error("snapshot exceeds the limit of {max} entries")]
    TooManyEntries {
        /// Configured maximum.
        max: usize,
    },
    /// A diff lists the same path in more than one set, or twice in one set.
    #[error("path `{path}` appears more than once across diff sets")]
    OverlappingDiff {
        /// Offending path.
        path: PathKey,
    },
    /// The diff was computed against a different baseline than the target.
    #[error("diff adds `{path}` but the target already records {found} instead of {recorded}")]
    InvalidDiffApplication {
        /// Path whose recorded prior state contradicts the target.
        path: PathKey,
        /// Fingerprint the diff wants to add.
        recorded: Fingerprint,
        /// Fingerprint already present in the target.
        found: Fingerprint,
    },
}

impl SnapshotError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::DuplicatePath { .. } => ErrorCode::new("snapshot", "duplicate_path"),
            Self::TooManyEntries { .. } => ErrorCode::new("snapshot", "too_many_entries"),
            Self::OverlappingDiff { .. } => ErrorCode::new("snapshot", "overlapping_diff"),
            Self::InvalidDiffApplication { .. } => {
                ErrorCode::new("snapshot", "invalid_diff_application")
            },
        }
    }

    /// True when the failure means the caller handed over inconsistent state.
    #[must_use]
    pub const fn is_invariant(&self) -> bool {
        !matches!(self, Self::TooManyEntries { .. })
    }
}

impl From<SnapshotError> for ErrorEnvelope {
    fn from(error: SnapshotError) -> Self {
        let envelope = if error.is_invariant() {
            Self::invariant(error.error_code(), error.to_string())
        } else {
            Self::expected(error.error_code(), error.to_string())
        };

        match error {
            SnapshotError::DuplicatePath { path } | SnapshotError::OverlappingDiff { path } => {
                envelope.with_metadata("path", path.to_string())
            },
            SnapshotError::TooManyEntries { max } => envelope.with_metadata("max", max.to_string()),
            SnapshotError::InvalidDiffApplication {
                path,
                recorded,
                found,
            } => envelope
                .with_metadata("path", path.to_string())
                .with_metadata("recorded", recorded.to_text())
                .with_metadata("found", found.to_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapdiff_domain::PrimitiveError;
    use snapdiff_shared::ErrorKind;

    #[test]
    fn stale_diff_maps_to_invariant_envelope() -> Result<(), PrimitiveError> {
        let error = SnapshotError::InvalidDiffApplication {
            path: PathKey::new("a.txt")?,
            recorded: Fingerprint::from_digest(vec![1_u8])?,
            found: Fingerprint::missing(),
        };
        let envelope = ErrorEnvelope::from(error);

        assert_eq!(envelope.kind, ErrorKind::Invariant);
        assert!(envelope.has_code("snapshot", "invalid_diff_application"));
        assert_eq!(envelope.metadata.get("recorded").map(String::as_str), Some("01"));
        assert_eq!(envelope.metadata.get("found").map(String::as_str), Some("missing"));
        Ok(())
    }

    #[test]
    fn entry_limit_is_an_expected_failure() {
        let envelope = ErrorEnvelope::from(SnapshotError::TooManyEntries { max: 2 });
        assert_eq!(envelope.kind, ErrorKind::Expected);
        assert_eq!(envelope.metadata.get("max").map(String::as_str), Some("2"));
    }
}
