//! Release tag newtype threaded through every publication step.
//!
//! A release tag names exactly one published version. It is used verbatim
//! as a git tag and inside a download URL path segment, so only ASCII
//! letters, digits, `.`, `_`, `+` and `-` are accepted. The tag starts with
//! a letter or digit, does not end with `.`, and never contains `..`.

use super::error::{ArtefactError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated release identifier such as `1.0.0`.
///
/// # Examples
///
/// ```
/// use formula_publisher::artefact::release_tag::ReleaseTag;
///
/// let tag: ReleaseTag = "1.0.0".try_into().expect("valid release tag");
/// assert_eq!(tag.as_str(), "1.0.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReleaseTag(String);

impl ReleaseTag {
    /// Return the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ReleaseTag {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        validate_release_tag(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for ReleaseTag {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        validate_release_tag(&value)?;
        Ok(Self(value))
    }
}

impl From<ReleaseTag> for String {
    fn from(value: ReleaseTag) -> Self {
        value.0
    }
}

impl AsRef<str> for ReleaseTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate that `value` is a well-formed release tag.
fn validate_release_tag(value: &str) -> Result<()> {
    let reject = |reason: String| ArtefactError::InvalidReleaseTag {
        value: value.to_owned(),
        reason,
    };

    let Some(first) = value.chars().next() else {
        return Err(reject("tag must not be empty".to_owned()));
    };
    if let Some(bad) = value.chars().find(|c| !is_tag_char(*c)) {
        return Err(reject(format!("character {bad:?} is not allowed")));
    }
    if !first.is_ascii_alphanumeric() {
        return Err(reject(format!("tag must start with a letter or digit, not '{first}'")));
    }
    if value.ends_with('.') {
        return Err(reject("tag must not end with '.'".to_owned()));
    }
    if value.contains("..") {
        return Err(reject("tag must not contain '..'".to_owned()));
    }
    Ok(())
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::semver("1.0.0")]
    #[case::prefixed("v1.2.3")]
    #[case::prerelease("2.0.0-rc.1+build.5")]
    #[case::underscore("nightly_2024")]
    fn accepts_version_tags(#[case] tag: &str) {
        let parsed = ReleaseTag::try_from(tag).expect("valid tag");
        assert_eq!(parsed.as_str(), tag);
    }

    #[rstest]
    #[case::empty("")]
    #[case::space("1.0 .0")]
    #[case::tab("1.0.0\t")]
    #[case::slash("releases/1.0.0")]
    #[case::backslash("1.0\\0")]
    #[case::brace("{TAG}")]
    #[case::quote("1.0.0\"")]
    #[case::fragment("1.0.0#x")]
    #[case::query("1.0.0?x")]
    #[case::percent("1.0%200")]
    #[case::colon("v1:0")]
    #[case::tilde("1.0~1")]
    #[case::caret("1.0^")]
    #[case::non_ascii("1.0.0é")]
    #[case::double_dot("1..0")]
    #[case::leading_dot(".1.0")]
    #[case::leading_dash("-1.0")]
    #[case::trailing_dot("1.0.")]
    fn rejects_malformed_tags(#[case] tag: &str) {
        let err = ReleaseTag::try_from(tag).expect_err("tag should be rejected");
        assert!(
            matches!(err, ArtefactError::InvalidReleaseTag { .. }),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn display_shows_inner_value() {
        let tag = ReleaseTag::try_from("0.9.1").expect("known good");
        assert_eq!(format!("{tag}"), "0.9.1");
    }

    #[test]
    fn from_owned_string_accepts_valid() {
        assert!(ReleaseTag::try_from(String::from("3.1.4")).is_ok());
    }

    #[test]
    fn deserialisation_runs_validation() {
        let rejected = serde_json::from_str::<ReleaseTag>("\"bad tag\"");
        assert!(rejected.is_err());

        let accepted = serde_json::from_str::<ReleaseTag>("\"1.0.0\"").expect("valid tag");
        assert_eq!(accepted.as_str(), "1.0.0");
    }
}
