//! Structural and integrity checks for rendered manifests.
//!
//! The validator parses a [`RenderedManifest`] and compares it against an
//! [`Expectation`] describing the release being published and the digest
//! freshly computed from its artefact. Every violation is collected, so a
//! single run reports all defects at once. No network or filesystem access
//! happens here.

use super::RenderedManifest;
use super::parser::{FormulaFields, Stanza, parse_formula};
use crate::artefact::release_tag::ReleaseTag;
use crate::artefact::sha256_digest::Sha256Digest;
use crate::checksum::{HashAlgorithm, verify};
use log::{debug, warn};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use ureq::http::Uri;

const CLASS: &str = "class";
const DESC: &str = "desc";
const HOMEPAGE: &str = "homepage";
const URL: &str = "url";
const VERSION: &str = "version";
const INSTALL: &str = "install";
const TEST: &str = "test";
const TEST_ARGUMENT: &str = "test argument";

/// One defect found in a rendered manifest.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// A required field is absent or empty.
    #[error("missing required field: {field}")]
    MissingField {
        /// The field name.
        field: String,
    },

    /// A stanza that must appear once appears more than once.
    #[error("field {field} declared more than once (line {line})")]
    DuplicateField {
        /// The field name.
        field: String,
        /// Line of the repeated declaration.
        line: usize,
    },

    /// A URL field is not an absolute http(s) URL.
    #[error("malformed {field} URL \"{url}\": {reason}")]
    MalformedUrl {
        /// The field name.
        field: String,
        /// The offending value.
        url: String,
        /// Why the URL was rejected.
        reason: String,
    },

    /// A field does not carry the release being published.
    #[error("{field} \"{found}\" does not match release {expected}")]
    ReleaseMismatch {
        /// The field name.
        field: String,
        /// The release tag being published.
        expected: String,
        /// The value found in the manifest.
        found: String,
    },

    /// The digest has the wrong number of characters.
    #[error("digest has {actual} characters; expected {expected}")]
    WrongDigestLength {
        /// Characters required by the hash algorithm.
        expected: usize,
        /// Characters found.
        actual: usize,
    },

    /// The digest has the right length but is not hexadecimal.
    #[error("malformed digest: {reason}")]
    MalformedDigest {
        /// Why the digest was rejected.
        reason: String,
    },

    /// The declared digest differs from the digest of the artefact bytes.
    #[error("digest mismatch: declared {declared}, computed {computed}")]
    DigestMismatch {
        /// The digest found in the manifest or supplied by the caller.
        declared: String,
        /// The digest computed from the fetched artefact.
        computed: String,
    },

    /// The manifest URL is not the URL whose bytes were hashed.
    #[error("manifest url {declared} differs from fetched artefact {fetched}")]
    ArtifactUrlMismatch {
        /// The URL in the manifest.
        declared: String,
        /// The URL that was fetched and hashed.
        fetched: String,
    },

    /// The test step does not invoke an installed executable.
    #[error("test invokes \"{invoked}\" but install provides \"{installed}\"")]
    InconsistentTest {
        /// Executables named by the install step.
        installed: String,
        /// The executable the test step runs.
        invoked: String,
    },
}

/// The outcome of validating one manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    ok: bool,
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Build a result from collected errors.
    #[must_use]
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
        }
    }

    /// Return whether no defect was found.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Return the defects in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Consume the result and return its defects.
    #[must_use]
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ok {
            return write!(f, "manifest is valid");
        }
        write!(f, "{} validation error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

/// What a manifest is expected to declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    release: ReleaseTag,
    computed: Sha256Digest,
    algorithm: HashAlgorithm,
    fetched_url: Option<String>,
    declared: Option<Sha256Digest>,
}

impl Expectation {
    /// Expect `release`, with `computed` freshly hashed from its artefact.
    #[must_use]
    pub fn new(release: ReleaseTag, computed: Sha256Digest) -> Self {
        Self {
            release,
            computed,
            algorithm: HashAlgorithm::default(),
            fetched_url: None,
            declared: None,
        }
    }

    /// Require the manifest `url` to equal the URL that was hashed.
    #[must_use]
    pub fn with_fetched_url(mut self, url: impl Into<String>) -> Self {
        self.fetched_url = Some(url.into());
        self
    }

    /// Also compare an externally declared digest with the computed one.
    #[must_use]
    pub fn with_declared_digest(mut self, declared: Option<Sha256Digest>) -> Self {
        self.declared = declared;
        self
    }

    /// Use `algorithm` for the digest stanza.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/// Validates rendered manifests against an [`Expectation`].
#[derive(Debug, Clone)]
pub struct ManifestValidator {
    expectation: Expectation,
}

impl ManifestValidator {
    /// Create a validator for `expectation`.
    #[must_use]
    pub fn new(expectation: Expectation) -> Self {
        Self { expectation }
    }

    /// Check every field of `manifest`, collecting all defects.
    #[must_use]
    pub fn validate(&self, manifest: &RenderedManifest) -> ValidationResult {
        let fields = parse_formula(manifest.as_str());
        let mut errors = Vec::new();

        if fields.class_name.as_deref().is_none_or(str::is_empty) {
            errors.push(missing(CLASS));
        }
        let keywords = [
            DESC,
            HOMEPAGE,
            URL,
            VERSION,
            self.expectation.algorithm.manifest_keyword(),
        ];
        for keyword in keywords {
            check_unique(&fields, keyword, &mut errors);
        }

        if let Some(desc) = required(&fields, DESC, &mut errors) {
            debug!("manifest desc: {}", desc.value);
        }
        if let Some(homepage) = required(&fields, HOMEPAGE, &mut errors) {
            errors.extend(check_url(HOMEPAGE, &homepage.value));
        }
        if let Some(url) = required(&fields, URL, &mut errors) {
            self.check_download_url(&url.value, &mut errors);
        }
        if let Some(version) = required(&fields, VERSION, &mut errors) {
            if version.value != self.expectation.release.as_str() {
                errors.push(ValidationError::ReleaseMismatch {
                    field: VERSION.to_owned(),
                    expected: self.expectation.release.to_string(),
                    found: version.value.clone(),
                });
            }
        }
        let keyword = self.expectation.algorithm.manifest_keyword();
        if let Some(digest) = required(&fields, keyword, &mut errors) {
            self.check_digest(&digest.value, &mut errors);
        }
        self.check_declared_digest(&mut errors);
        check_install_and_test(&fields, &mut errors);

        for error in &errors {
            warn!("manifest validation: {error}");
        }
        ValidationResult::from_errors(errors)
    }

    /// Check shape, release, and provenance of the download URL.
    fn check_download_url(&self, url: &str, errors: &mut Vec<ValidationError>) {
        if let Some(malformed) = check_url(URL, url) {
            errors.push(malformed);
            return;
        }
        if url.contains('#') {
            errors.push(ValidationError::MalformedUrl {
                field: URL.to_owned(),
                url: url.to_owned(),
                reason: "download URL must not carry a fragment".to_owned(),
            });
            return;
        }
        let release = self.expectation.release.as_str();
        let path = url
            .parse::<Uri>()
            .map(|uri| uri.path().to_owned())
            .unwrap_or_default();
        if !path.contains(release) {
            errors.push(ValidationError::ReleaseMismatch {
                field: URL.to_owned(),
                expected: release.to_owned(),
                found: url.to_owned(),
            });
        }
        if let Some(fetched) = self.expectation.fetched_url.as_deref() {
            if fetched != url {
                errors.push(ValidationError::ArtifactUrlMismatch {
                    declared: url.to_owned(),
                    fetched: fetched.to_owned(),
                });
            }
        }
    }

    /// Check the digest stanza against the algorithm and computed digest.
    fn check_digest(&self, declared: &str, errors: &mut Vec<ValidationError>) {
        let expected = self.expectation.algorithm.hex_len();
        let actual = declared.chars().count();
        if actual != expected {
            errors.push(ValidationError::WrongDigestLength { expected, actual });
            return;
        }
        if let Some(bad) = declared.chars().find(|c| !c.is_ascii_hexdigit()) {
            errors.push(ValidationError::MalformedDigest {
                reason: format!("non-hex character '{bad}'"),
            });
            return;
        }
        let computed = self.expectation.computed.as_str();
        if !verify(computed, declared) {
            errors.push(ValidationError::DigestMismatch {
                declared: declared.to_owned(),
                computed: computed.to_owned(),
            });
        }
    }

    /// Compare a digest supplied alongside the release with the computed one.
    fn check_declared_digest(&self, errors: &mut Vec<ValidationError>) {
        let Some(declared) = self.expectation.declared.as_ref() else {
            return;
        };
        let computed = self.expectation.computed.as_str();
        if !verify(computed, declared.as_str()) {
            errors.push(ValidationError::DigestMismatch {
                declared: declared.to_string(),
                computed: computed.to_owned(),
            });
        }
    }
}

fn missing(field: &str) -> ValidationError {
    ValidationError::MissingField {
        field: field.to_owned(),
    }
}

/// Return the non-empty stanza for `keyword`, recording it as missing
/// otherwise.
fn required<'a>(
    fields: &'a FormulaFields,
    keyword: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a Stanza> {
    let stanza = fields
        .stanza(keyword)
        .filter(|stanza| !stanza.value.trim().is_empty());
    if stanza.is_none() {
        errors.push(missing(keyword));
    }
    stanza
}

/// Record each repeat of a single-valued stanza.
fn check_unique(fields: &FormulaFields, keyword: &str, errors: &mut Vec<ValidationError>) {
    errors.extend(
        fields
            .stanzas_named(keyword)
            .skip(1)
            .map(|stanza| ValidationError::DuplicateField {
                field: keyword.to_owned(),
                line: stanza.line,
            }),
    );
}

/// Return an error when `value` is not an absolute http(s) URL with a host.
fn check_url(field: &str, value: &str) -> Option<ValidationError> {
    let malformed = |reason: &str| {
        Some(ValidationError::MalformedUrl {
            field: field.to_owned(),
            url: value.to_owned(),
            reason: reason.to_owned(),
        })
    };

    if value.contains(['{', '}']) {
        return malformed("contains an unresolved placeholder");
    }
    let uri = match value.parse::<Uri>() {
        Ok(uri) => uri,
        Err(err) => return malformed(&err.to_string()),
    };
    if !matches!(uri.scheme_str(), Some("http" | "https")) {
        return malformed("scheme must be http or https");
    }
    if uri.host().is_none_or(str::is_empty) {
        return malformed("missing host");
    }
    None
}

/// Check that an executable is installed and that the test runs it.
fn check_install_and_test(fields: &FormulaFields, errors: &mut Vec<ValidationError>) {
    if fields.installs.iter().all(|name| name.trim().is_empty()) {
        errors.push(missing(INSTALL));
    }
    let Some(test) = fields.test.as_ref() else {
        errors.push(missing(TEST));
        return;
    };
    if test.args.is_empty() {
        errors.push(missing(TEST_ARGUMENT));
    }
    if fields.installs.is_empty() {
        return;
    }
    let invoked = test.executable_name();
    if !fields.installs.iter().any(|name| name == invoked) {
        errors.push(ValidationError::InconsistentTest {
            installed: fields.installs.join(", "),
            invoked: test.program.clone(),
        });
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
