//! Platform tag validation for release artefacts.
//!
//! Release assets are published per `<os>-<arch>` pair, for example
//! `darwin-amd64`. The tag is substituted into the download URL pattern, so
//! only lowercase ASCII letters, digits, and `_` are accepted on either side
//! of a single `-`.

use super::error::{ArtefactError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The platform the bundled template was written for.
pub const DEFAULT_PLATFORM: &str = "darwin-amd64";

/// A validated `<os>-<arch>` platform tag.
///
/// # Examples
///
/// ```
/// use formula_publisher::artefact::platform::PlatformTag;
///
/// let platform: PlatformTag = "darwin-amd64".try_into().expect("valid platform");
/// assert_eq!(platform.os(), "darwin");
/// assert_eq!(platform.arch(), "amd64");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlatformTag {
    value: String,
    split: usize,
}

impl PlatformTag {
    /// Return the full tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Return the operating-system component.
    #[must_use]
    pub fn os(&self) -> &str {
        self.value.get(..self.split).unwrap_or_default()
    }

    /// Return the architecture component.
    #[must_use]
    pub fn arch(&self) -> &str {
        self.value.get(self.split + 1..).unwrap_or_default()
    }
}

impl Default for PlatformTag {
    fn default() -> Self {
        Self {
            value: DEFAULT_PLATFORM.to_owned(),
            split: DEFAULT_PLATFORM.find('-').unwrap_or_default(),
        }
    }
}

impl TryFrom<&str> for PlatformTag {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        let split = validate_platform(value)?;
        Ok(Self {
            value: value.to_owned(),
            split,
        })
    }
}

impl TryFrom<String> for PlatformTag {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        let split = validate_platform(&value)?;
        Ok(Self { value, split })
    }
}

impl From<PlatformTag> for String {
    fn from(value: PlatformTag) -> Self {
        value.value
    }
}

impl AsRef<str> for PlatformTag {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Validate `value` and return the byte offset of the `-` separator.
fn validate_platform(value: &str) -> Result<usize> {
    let reject = |reason: &str| ArtefactError::InvalidPlatform {
        value: value.to_owned(),
        reason: reason.to_owned(),
    };

    let Some((os, arch)) = value.split_once('-') else {
        return Err(reject("expected <os>-<arch>"));
    };
    if os.is_empty() || arch.is_empty() {
        return Err(reject("os and arch must both be non-empty"));
    }
    if arch.contains('-') {
        return Err(reject("expected exactly one '-' separator"));
    }
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_';
    if !os.chars().chain(arch.chars()).all(allowed) {
        return Err(reject(
            "only lowercase letters, digits, and '_' are allowed",
        ));
    }
    Ok(os.len())
}
