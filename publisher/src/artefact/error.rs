//! Error types for release tags, platform tags, digests, and URL patterns.
//!
//! Each variant names the rejected input and the constraint it violated so
//! that a failed publication can be diagnosed without re-running it.

use thiserror::Error;

/// Errors arising from invalid artefact-related values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtefactError {
    /// A release tag is empty or contains forbidden characters.
    #[error("invalid release tag \"{value}\": {reason}")]
    InvalidReleaseTag {
        /// The rejected tag string.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A platform tag does not follow the `<os>-<arch>` grammar.
    #[error("invalid platform tag \"{value}\": {reason}")]
    InvalidPlatform {
        /// The rejected platform string.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A SHA-256 digest is not a valid 64-character hex string.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidSha256Digest {
        /// Description of the validation failure.
        reason: String,
    },

    /// A download URL pattern does not reference the required placeholders.
    #[error("invalid URL pattern \"{pattern}\": {reason}")]
    InvalidUrlPattern {
        /// The rejected pattern.
        pattern: String,
        /// Description of the validation failure.
        reason: String,
    },
}

/// Result type alias using [`ArtefactError`].
pub type Result<T> = std::result::Result<T, ArtefactError>;
