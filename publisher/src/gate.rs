//! Publication gate: verify a release, then emit its manifest.
//!
//! The gate runs the whole pipeline for one release: locate the artefact,
//! fetch it, hash the fetched bytes, render the template with the release
//! tag and the fresh digest, and validate the result. A manifest is
//! returned only when every stage passes. The digest is always computed
//! from the bytes fetched in this run and is never taken from a previous
//! one.
//!
//! The fetch happens before rendering, so a template defect is reported
//! only after the artefact has been downloaded.

use std::io::{self, Write};

use log::{debug, warn};

use crate::artefact::download::{ArtefactFetcher, FetchError, HttpFetcher};
use crate::artefact::locator::{ArtifactReference, UrlPattern};
use crate::artefact::platform::PlatformTag;
use crate::artefact::release_tag::ReleaseTag;
use crate::artefact::sha256_digest::Sha256Digest;
use crate::checksum::{HashAlgorithm, digest};
use crate::manifest::RenderedManifest;
use crate::manifest::parser::parse_formula;
use crate::manifest::validation::{Expectation, ManifestValidator, ValidationError};
use crate::output::write_stderr_line;
use crate::template::error::TemplateError;
use crate::template::placeholder::{Placeholder, PlaceholderSet};
use crate::template::{ManifestTemplate, render};

/// Errors that stop a publication attempt.
#[derive(Debug, thiserror::Error)]
pub enum PublicationError {
    /// The artefact could not be fetched.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The template and the supplied values do not match.
    #[error("template rendering failed: {0}")]
    Template(#[from] TemplateError),

    /// The rendered manifest failed validation.
    #[error("manifest validation failed with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),
}

impl PublicationError {
    /// Return the validation errors, if validation was the failing stage.
    #[must_use]
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(errors) => errors,
            Self::Fetch(_) | Self::Template(_) => &[],
        }
    }
}

/// The release being published.
#[derive(Debug, Clone)]
pub struct PublishRequest<'a> {
    /// The release tag substituted into the URL and manifest.
    pub release: &'a ReleaseTag,
    /// The platform whose artefact the manifest points at.
    pub platform: &'a PlatformTag,
    /// A digest published alongside the release, checked against the
    /// freshly computed one when present.
    pub declared_digest: Option<&'a Sha256Digest>,
}

/// Settings shared by every publication attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateSettings {
    /// Pattern that turns a release and platform into a download URL.
    pub url_pattern: UrlPattern,
    /// Algorithm used to hash artefacts.
    pub algorithm: HashAlgorithm,
}

/// Publish `release` for `platform` with the default settings over HTTP.
///
/// # Errors
///
/// Returns [`PublicationError`] for the first stage that fails.
pub fn publish(
    release: &ReleaseTag,
    platform: &PlatformTag,
    template: &ManifestTemplate,
) -> Result<RenderedManifest, PublicationError> {
    let request = PublishRequest {
        release,
        platform,
        declared_digest: None,
    };
    publish_with(
        &GateSettings::default(),
        &request,
        template,
        &HttpFetcher::default(),
        &mut io::sink(),
    )
}

/// Testable publication entry point with injected dependencies.
///
/// Progress lines are written to `progress`; pass [`io::sink`] to silence
/// them.
///
/// # Errors
///
/// Returns [`PublicationError::Fetch`] when the artefact cannot be
/// retrieved, [`PublicationError::Template`] when the template and values
/// disagree, and [`PublicationError::Validation`] with every defect when
/// the rendered manifest fails validation.
pub fn publish_with(
    settings: &GateSettings,
    request: &PublishRequest<'_>,
    template: &ManifestTemplate,
    fetcher: &dyn ArtefactFetcher,
    progress: &mut dyn Write,
) -> Result<RenderedManifest, PublicationError> {
    // Step 1: Locate and fetch.
    let reference = settings
        .url_pattern
        .locate(request.release, request.platform);
    write_stderr_line(progress, format!("Fetching {}...", reference.url()));
    let bytes = fetcher.fetch(&reference)?;

    // Step 2: Hash the fetched bytes.
    let computed = digest(settings.algorithm, bytes);
    debug!("computed {} {computed} for {reference}", settings.algorithm);
    write_stderr_line(progress, format!("{}: {computed}", settings.algorithm));

    // Step 3: Render with the release tag and the fresh digest.
    let values = PlaceholderSet::new()
        .with(Placeholder::Tag, request.release.as_str())
        .with(settings.algorithm.placeholder(), computed.as_str());
    let manifest = render(template, &values)?;

    // Step 4: Validate against what was actually fetched.
    let expectation = Expectation::new(request.release.clone(), computed)
        .with_algorithm(settings.algorithm)
        .with_fetched_url(reference.url())
        .with_declared_digest(request.declared_digest.cloned());
    check(&expectation, &manifest)?;

    write_stderr_line(
        progress,
        format!("Manifest for {} verified.", request.release),
    );
    Ok(manifest)
}

/// Re-verify an existing manifest against the artefact its `url` names.
///
/// The manifest's `url` stanza is fetched, hashed, and the whole manifest
/// is validated against `release` and the resulting digest. Returns the
/// computed digest on success.
///
/// # Errors
///
/// Returns [`PublicationError::Validation`] when the manifest has no `url`
/// or fails validation, and [`PublicationError::Fetch`] when the artefact
/// cannot be retrieved.
pub fn verify_manifest(
    settings: &GateSettings,
    manifest: &RenderedManifest,
    release: &ReleaseTag,
    platform: &PlatformTag,
    fetcher: &dyn ArtefactFetcher,
    progress: &mut dyn Write,
) -> Result<Sha256Digest, PublicationError> {
    let fields = parse_formula(manifest.as_str());
    let Some(url) = fields.stanza("url").map(|stanza| stanza.value.clone()) else {
        warn!("manifest declares no url; nothing to verify");
        return Err(PublicationError::Validation(vec![
            ValidationError::MissingField {
                field: "url".to_owned(),
            },
        ]));
    };

    let reference = ArtifactReference::new(url, platform.clone());
    write_stderr_line(progress, format!("Fetching {}...", reference.url()));
    let bytes = fetcher.fetch(&reference)?;
    let computed = digest(settings.algorithm, bytes);
    write_stderr_line(progress, format!("{}: {computed}", settings.algorithm));

    let expectation = Expectation::new(release.clone(), computed.clone())
        .with_algorithm(settings.algorithm)
        .with_fetched_url(reference.url());
    check(&expectation, manifest)?;

    write_stderr_line(progress, format!("Manifest for {release} verified."));
    Ok(computed)
}

/// Validate `manifest` and turn any defect into a publication error.
fn check(expectation: &Expectation, manifest: &RenderedManifest) -> Result<(), PublicationError> {
    let result = ManifestValidator::new(expectation.clone()).validate(manifest);
    if result.is_ok() {
        Ok(())
    } else {
        Err(PublicationError::Validation(result.into_errors()))
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
