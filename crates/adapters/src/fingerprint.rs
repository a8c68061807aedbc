//! SHA-256 content hashing adapter.

use sha2::{Digest, Sha256};
use snapdiff_domain::Fingerprint;
use snapdiff_ports::FingerprintPort;
use snapdiff_shared::{ErrorEnvelope, Result};
use std::io::Read;

/// Fingerprints content with SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Fingerprinter;

impl Sha256Fingerprinter {
    /// Create the fingerprinter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FingerprintPort for Sha256Fingerprinter {
    fn fingerprint_bytes(&self, content: &[u8]) -> Fingerprint {
        Fingerprint::from_sha256(Sha256::digest(content).into())
    }

    fn fingerprint_reader(&self, reader: &mut dyn Read) -> Result<Fingerprint> {
        let mut hasher = Sha256::new();
        std::io::copy(reader, &mut hasher).map_err(ErrorEnvelope::from)?;
        Ok(Fingerprint::from_sha256(hasher.finalize().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
        }
    }

    #[test]
    fn known_digest() {
        let fingerprint = Sha256Fingerprinter.fingerprint_bytes(b"abc");
        assert_eq!(
            fingerprint.to_text(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn reader_matches_bytes() -> Result<()> {
        let content = vec![7_u8; 64 * 1024 + 3];
        let from_reader = Sha256Fingerprinter.fingerprint_reader(&mut Cursor::new(&content))?;
        assert_eq!(from_reader, Sha256Fingerprinter.fingerprint_bytes(&content));
        Ok(())
    }

    #[test]
    fn distinct_content_distinct_fingerprint() {
        let fingerprinter = Sha256Fingerprinter::new();
        assert_ne!(
            fingerprinter.fingerprint_bytes(b"one"),
            fingerprinter.fingerprint_bytes(b"two")
        );
        assert!(!fingerprinter.fingerprint_bytes(b"").is_missing());
    }

    #[test]
    fn read_failure_propagates() {
        let error = Sha256Fingerprinter.fingerprint_reader(&mut FailingReader).err();
        assert!(error.is_some());
    }
}
