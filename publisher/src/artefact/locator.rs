//! Download URL resolution for release artefacts.
//!
//! A [`UrlPattern`] holds `{TAG}` and `{PLATFORM}` tokens. Locating an
//! artefact substitutes a release tag and platform tag into the pattern;
//! no network access happens here.

use super::error::{ArtefactError, Result};
use super::platform::PlatformTag;
use super::release_tag::ReleaseTag;
use crate::template::scan::{Token, scan};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token replaced with the release tag.
pub const TAG_TOKEN: &str = "TAG";

/// Token replaced with the platform tag.
pub const PLATFORM_TOKEN: &str = "PLATFORM";

/// Download pattern for the netlify credential helper release assets.
pub const DEFAULT_URL_PATTERN: &str = concat!(
    "https://github.com/netlify/netlify-credential-helper/releases/download/",
    "v{TAG}/git-credential-netlify-{PLATFORM}.tar.gz",
);

/// A validated download URL pattern.
///
/// # Examples
///
/// ```
/// use formula_publisher::artefact::locator::UrlPattern;
///
/// let pattern = UrlPattern::try_from("https://example.test/{TAG}/tool-{PLATFORM}.tgz")
///     .expect("valid pattern");
/// assert!(pattern.as_str().contains("{TAG}"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UrlPattern(String);

impl UrlPattern {
    /// Return the pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve the artefact reference for `release` on `platform`.
    ///
    /// # Examples
    ///
    /// ```
    /// use formula_publisher::artefact::locator::UrlPattern;
    ///
    /// let pattern = UrlPattern::default();
    /// let reference = pattern.locate(
    ///     &"1.0.0".try_into().expect("valid tag"),
    ///     &"darwin-amd64".try_into().expect("valid platform"),
    /// );
    /// assert!(reference.url().ends_with("v1.0.0/git-credential-netlify-darwin-amd64.tar.gz"));
    /// ```
    #[must_use]
    pub fn locate(&self, release: &ReleaseTag, platform: &PlatformTag) -> ArtifactReference {
        let url = scan(&self.0)
            .map(|token| match token {
                Token::Text(text) => text,
                Token::Placeholder(TAG_TOKEN) => release.as_str(),
                Token::Placeholder(_) => platform.as_str(),
            })
            .collect();
        ArtifactReference {
            url,
            platform: platform.clone(),
        }
    }
}

impl Default for UrlPattern {
    fn default() -> Self {
        Self(DEFAULT_URL_PATTERN.to_owned())
    }
}

impl TryFrom<&str> for UrlPattern {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        validate_pattern(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for UrlPattern {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        validate_pattern(&value)?;
        Ok(Self(value))
    }
}

impl From<UrlPattern> for String {
    fn from(value: UrlPattern) -> Self {
        value.0
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Check that `value` holds exactly one `{TAG}`, exactly one `{PLATFORM}`,
/// and nothing else in placeholder position.
fn validate_pattern(value: &str) -> Result<()> {
    let reject = |reason: String| ArtefactError::InvalidUrlPattern {
        pattern: value.to_owned(),
        reason,
    };

    let mut tags = 0usize;
    let mut platforms = 0usize;
    for token in scan(value) {
        match token {
            Token::Text(_) => {}
            Token::Placeholder(TAG_TOKEN) => tags += 1,
            Token::Placeholder(PLATFORM_TOKEN) => platforms += 1,
            Token::Placeholder(other) => {
                return Err(reject(format!("unknown placeholder {{{other}}}")));
            }
        }
    }
    if tags != 1 {
        return Err(reject(format!(
            "expected exactly one {{{TAG_TOKEN}}}, found {tags}"
        )));
    }
    if platforms != 1 {
        return Err(reject(format!(
            "expected exactly one {{{PLATFORM_TOKEN}}}, found {platforms}"
        )));
    }
    if !(value.starts_with("https://") || value.starts_with("http://")) {
        return Err(reject("pattern must be an http(s) URL".to_owned()));
    }
    Ok(())
}

/// The resolved location of one release artefact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReference {
    url: String,
    platform: PlatformTag,
}

impl ArtifactReference {
    /// Build a reference to an already known URL, such as the one declared
    /// in an existing manifest.
    #[must_use]
    pub fn new(url: impl Into<String>, platform: PlatformTag) -> Self {
        Self {
            url: url.into(),
            platform,
        }
    }

    /// Return the download URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Return the platform the artefact targets.
    #[must_use]
    pub fn platform(&self) -> &PlatformTag {
        &self.platform
    }

    /// Return the final path segment of the URL, ignoring any query string.
    #[must_use]
    pub fn file_name(&self) -> &str {
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/').next().unwrap_or_default()
    }
}

impl fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.url, self.platform)
    }
}
