//! Content identity of one filesystem entry.

use crate::PrimitiveError;
use serde::{Deserialize, Serialize};
use std::fmt;

const MISSING_TEXT: &str = "missing";
const DIRECTORY_TEXT: &str = "directory";

/// Opaque content identity of a file, directory, or absent entry.
///
/// Equal fingerprints mean the content is identical for build purposes. The
/// value is produced by a hashing collaborator; this crate only compares it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(Repr);

#[derive(Clone, PartialEq, Eq, Hash)]
enum Repr {
    Missing,
    Directory,
    Digest(Box<[u8]>),
}

impl Fingerprint {
    /// Sentinel for an entry that is known to be absent or unreadable.
    #[must_use]
    pub const fn missing() -> Self {
        Self(Repr::Missing)
    }

    /// Sentinel shared by all directory entries.
    #[must_use]
    pub const fn directory() -> Self {
        Self(Repr::Directory)
    }

    /// Wrap a content digest computed by the hashing collaborator.
    pub fn from_digest(digest: impl Into<Box<[u8]>>) -> Result<Self, PrimitiveError> {
        let digest = digest.into();
        if digest.is_empty() {
            return Err(PrimitiveError::EmptyDigest);
        }
        Ok(Self(Repr::Digest(digest)))
    }

    /// Wrap a 256-bit digest.
    #[must_use]
    pub fn from_sha256(digest: [u8; 32]) -> Self {
        Self(Repr::Digest(Box::new(digest)))
    }

    /// Parse the text form produced by [`Fingerprint::to_text`].
    pub fn parse(input: &str) -> Result<Self, PrimitiveError> {
        match input {
            MISSING_TEXT => Ok(Self::missing()),
            DIRECTORY_TEXT => Ok(Self::directory()),
            _ => decode_hex(input)
                .map(|bytes| Self(Repr::Digest(bytes.into_boxed_slice())))
                .ok_or_else(|| PrimitiveError::InvalidFingerprintText {
                    input: input.to_owned(),
                }),
        }
    }

    /// Returns true for the missing sentinel.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self.0, Repr::Missing)
    }

    /// Returns true for the directory sentinel.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        matches!(self.0, Repr::Directory)
    }

    /// Raw digest bytes for content fingerprints.
    #[must_use]
    pub fn digest(&self) -> Option<&[u8]> {
        match &self.0 {
            Repr::Digest(bytes) => Some(&**bytes),
            Repr::Missing | Repr::Directory => None,
        }
    }

    /// Stable text form: `missing`, `directory`, or the lowercase hex digest.
    #[must_use]
    pub fn to_text(&self) -> String {
        match &self.0 {
            Repr::Missing => MISSING_TEXT.to_owned(),
            Repr::Directory => DIRECTORY_TEXT.to_owned(),
            Repr::Digest(bytes) => hex::encode(bytes),
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.to_text())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Fingerprint({self})")
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.to_text()
    }
}

fn decode_hex(input: &str) -> Option<Vec<u8>> {
    hex::decode(input).ok().filter(|bytes| !bytes.is_empty())
}
