//! SHA-256 digest newtype for artefact verification.
//!
//! Holds a 64-character hexadecimal string. Input is accepted in either
//! case and canonicalised to lowercase, so a digest always renders the way
//! Homebrew expects it.

use super::error::{ArtefactError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expected length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// A validated, lowercase hex-encoded SHA-256 digest string.
///
/// # Examples
///
/// ```
/// use formula_publisher::artefact::sha256_digest::Sha256Digest;
///
/// let hex = "A".repeat(64);
/// let digest: Sha256Digest = hex.as_str().try_into().expect("valid digest");
/// assert_eq!(digest.as_str(), "a".repeat(64));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Return the digest as a lowercase hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap the lowercase hex rendering of a finished SHA-256 hasher.
    ///
    /// `sha2` formats its 32-byte output as 64 lowercase hex characters.
    pub(crate) fn from_hasher_output(hex: String) -> Self {
        debug_assert!(validate_sha256(&hex).is_ok(), "sha2 emitted {hex:?}");
        Self(hex)
    }
}

impl TryFrom<&str> for Sha256Digest {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        validate_sha256(value)?;
        Ok(Self(value.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for Sha256Digest {
    type Error = ArtefactError;

    fn try_from(mut value: String) -> Result<Self> {
        validate_sha256(&value)?;
        value.make_ascii_lowercase();
        Ok(Self(value))
    }
}

impl From<Sha256Digest> for String {
    fn from(value: Sha256Digest) -> Self {
        value.0
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate that `value` is a well-formed hex-encoded SHA-256 digest.
pub(crate) fn validate_sha256(value: &str) -> Result<()> {
    if value.len() != DIGEST_HEX_LEN {
        return Err(ArtefactError::InvalidSha256Digest {
            reason: format!(
                "expected {DIGEST_HEX_LEN} hex characters, got {}",
                value.chars().count()
            ),
        });
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ArtefactError::InvalidSha256Digest {
            reason: format!("non-hex character '{bad}'"),
        });
    }
    Ok(())
}
