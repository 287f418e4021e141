//! Checksum engine for release artefacts.
//!
//! Computes digests over the exact artefact bytes, with no line-ending or
//! encoding normalisation, and compares digests case-insensitively. The
//! algorithm is a configuration value rather than a runtime guess; Homebrew
//! formulae only carry `sha256` stanzas, so that is the sole supported
//! choice today.

use crate::artefact::download::ArtifactBytes;
use crate::artefact::sha256_digest::{DIGEST_HEX_LEN, Sha256Digest};
use crate::template::placeholder::Placeholder;
use log::trace;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Hash algorithms a manifest can declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256, rendered as 64 lowercase hex characters.
    #[default]
    Sha256,
}

impl HashAlgorithm {
    /// Return the configuration name of the algorithm.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }

    /// Return the number of hex characters in a digest.
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => DIGEST_HEX_LEN,
        }
    }

    /// Return the manifest stanza that declares the digest.
    #[must_use]
    pub const fn manifest_keyword(self) -> &'static str {
        self.name()
    }

    /// Return the template placeholder carrying the digest.
    #[must_use]
    pub const fn placeholder(self) -> Placeholder {
        match self {
            Self::Sha256 => Placeholder::Sha256,
        }
    }

    /// Hash `bytes` exactly as given.
    ///
    /// # Examples
    ///
    /// ```
    /// use formula_publisher::checksum::HashAlgorithm;
    ///
    /// let digest = HashAlgorithm::Sha256.digest_bytes(b"hello");
    /// assert_eq!(
    ///     digest.as_str(),
    ///     "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    /// );
    /// ```
    #[must_use]
    pub fn digest_bytes(self, bytes: &[u8]) -> Sha256Digest {
        match self {
            Self::Sha256 => {
                Sha256Digest::from_hasher_output(format!("{:x}", Sha256::digest(bytes)))
            }
        }
    }

    /// Hash the contents of the file at `path`, reading it in chunks.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened or read.
    pub fn digest_file(self, path: &Path) -> io::Result<Sha256Digest> {
        let mut file = fs::File::open(path)?;
        match self {
            Self::Sha256 => {
                let mut hasher = Sha256::new();
                let mut buffer = [0u8; 8192];
                loop {
                    let bytes_read = file.read(&mut buffer)?;
                    let Some(chunk) = buffer.get(..bytes_read).filter(|c| !c.is_empty()) else {
                        break;
                    };
                    hasher.update(chunk);
                }
                Ok(Sha256Digest::from_hasher_output(format!(
                    "{:x}",
                    hasher.finalize()
                )))
            }
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compute the digest of fetched artefact bytes.
///
/// The bytes are consumed so that the buffer is released as soon as the
/// digest exists.
#[must_use]
pub fn digest(algorithm: HashAlgorithm, bytes: ArtifactBytes) -> Sha256Digest {
    trace!("hashing {} artefact bytes with {algorithm}", bytes.len());
    algorithm.digest_bytes(bytes.as_slice())
}

/// Compare a freshly computed digest against a declared one.
///
/// Comparison ignores ASCII case. A mismatch is reported as `false`; the
/// caller decides whether that is fatal.
///
/// # Examples
///
/// ```
/// use formula_publisher::checksum::verify;
///
/// assert!(verify(&"AB".repeat(32), &"ab".repeat(32)));
/// assert!(!verify(&"ab".repeat(32), &"0".repeat(64)));
/// ```
#[must_use]
pub fn verify(computed: &str, declared: &str) -> bool {
    computed.eq_ignore_ascii_case(declared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[rstest]
    #[case::empty(b"".as_slice(), EMPTY_SHA256)]
    #[case::hello(b"hello".as_slice(), HELLO_SHA256)]
    fn digest_matches_known_vectors(#[case] bytes: &[u8], #[case] expected: &str) {
        let computed = digest(HashAlgorithm::Sha256, ArtifactBytes::from(bytes.to_vec()));
        assert_eq!(computed.as_str(), expected);
    }

    #[test]
    fn digest_is_deterministic() {
        let first = HashAlgorithm::Sha256.digest_bytes(b"release payload");
        let second = HashAlgorithm::Sha256.digest_bytes(b"release payload");
        assert_eq!(first, second);
    }

    #[test]
    fn line_endings_are_not_normalised() {
        let unix = HashAlgorithm::Sha256.digest_bytes(b"line\n");
        let windows = HashAlgorithm::Sha256.digest_bytes(b"line\r\n");
        assert_ne!(unix, windows);
    }

    #[test]
    fn file_digest_matches_in_memory_digest() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let payload = vec![7u8; 20_000];
        file.write_all(&payload).expect("write payload");

        let from_file = HashAlgorithm::Sha256
            .digest_file(file.path())
            .expect("hash file");
        assert_eq!(from_file, HashAlgorithm::Sha256.digest_bytes(&payload));
    }

    #[test]
    fn file_digest_reports_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = HashAlgorithm::Sha256.digest_file(&dir.path().join("absent.tar.gz"));
        assert!(result.is_err());
    }

    #[rstest]
    #[case::same_case(HELLO_SHA256, HELLO_SHA256, true)]
    #[case::mixed_case(HELLO_SHA256, "2CF24DBA5FB0A30E26E83B2AC5B9E29E1B161E5C1FA7425E73043362938B9824", true)]
    #[case::different(HELLO_SHA256, EMPTY_SHA256, false)]
    fn verify_ignores_case_only(#[case] computed: &str, #[case] declared: &str, #[case] same: bool) {
        assert_eq!(verify(computed, declared), same);
    }

    #[test]
    fn sha256_properties_line_up() {
        let algorithm = HashAlgorithm::Sha256;
        assert_eq!(algorithm.hex_len(), 64);
        assert_eq!(algorithm.manifest_keyword(), "sha256");
        assert_eq!(algorithm.placeholder(), Placeholder::Sha256);
    }
}
