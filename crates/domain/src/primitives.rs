//! Domain primitives with validated constructors.

use crate::EntryKind;
use snapdiff_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Validation failures for domain primitives and entry snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `PathKey` is empty.
    EmptyPathKey,
    /// `CollectionId` is empty after trimming.
    InvalidCollectionId {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// Content digest has no bytes.
    EmptyDigest,
    /// Fingerprint text is neither a sentinel nor an even-length hex digest.
    InvalidFingerprintText {
        /// Rejected input.
        input: String,
    },
    /// Entry kind and fingerprint shape disagree.
    KindFingerprintMismatch {
        /// Path of the rejected entry.
        path: String,
        /// Declared entry kind.
        kind: EntryKind,
        /// Text form of the supplied fingerprint.
        fingerprint: String,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyPathKey => ErrorCode::new("domain", "invalid_path_key"),
            Self::InvalidCollectionId { .. } => ErrorCode::new("domain", "invalid_collection_id"),
            Self::EmptyDigest | Self::InvalidFingerprintText { .. } => {
                ErrorCode::new("domain", "invalid_fingerprint")
            },
            Self::KindFingerprintMismatch { .. } => ErrorCode::new("domain", "invalid_entry"),
        }
    }

    const fn is_invariant(&self) -> bool {
        matches!(self, Self::KindFingerprintMismatch { .. })
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPathKey => formatter.write_str("PathKey must be non-empty"),
            Self::InvalidCollectionId { .. } => {
                formatter.write_str("CollectionId must be non-empty")
            },
            Self::EmptyDigest => formatter.write_str("content digest must be non-empty"),
            Self::InvalidFingerprintText { .. } => formatter
                .write_str("fingerprint must be `missing`, `directory`, or an even-length hex digest"),
            Self::KindFingerprintMismatch { kind, .. } => {
                write!(formatter, "fingerprint does not match entry kind `{kind}`")
            },
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let mut envelope = if error.is_invariant() {
            Self::invariant(error.error_code(), error.to_string())
        } else {
            Self::expected(error.error_code(), error.to_string())
        };

        match error {
            PrimitiveError::EmptyPathKey | PrimitiveError::EmptyDigest => {},
            PrimitiveError::InvalidCollectionId { input_length } => {
                envelope = envelope.with_metadata("input_length", input_length.to_string());
            },
            PrimitiveError::InvalidFingerprintText { input } => {
                envelope = envelope.with_metadata("input", input);
            },
            PrimitiveError::KindFingerprintMismatch {
                path,
                kind,
                fingerprint,
            } => {
                envelope = envelope
                    .with_metadata("path", path)
                    .with_metadata("kind", kind.to_string())
                    .with_metadata("fingerprint", fingerprint);
            },
        }

        envelope
    }
}

/// Normalized path key of a tracked entry.
///
/// Keys are supplied already normalized by the snapshotting collaborator and
/// are compared byte-for-byte; no case folding or separator rewriting ever
/// happens here. Clones share the underlying string.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathKey(Arc<str>);

impl PathKey {
    /// Create a `PathKey` from a normalized path string.
    pub fn new(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        if raw.is_empty() {
            return Err(PrimitiveError::EmptyPathKey);
        }
        Ok(Self(Arc::from(raw)))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PathKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for PathKey {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Debug for PathKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), formatter)
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<String> for PathKey {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PathKey {
    type Error = PrimitiveError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PathKey> for String {
    fn from(value: PathKey) -> Self {
        value.as_str().to_owned()
    }
}

/// Identifier of a tracked file collection (for example the inputs of one task).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(Box<str>);

impl CollectionId {
    /// Parse a `CollectionId` from user input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PrimitiveError::InvalidCollectionId {
                input_length: raw.len(),
            });
        }

        Ok(Self(trimmed.to_owned().into_boxed_str()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CollectionId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
