//! Shared test utilities for the publisher crate.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use sha2::{Digest, Sha256};

use crate::artefact::download::{ArtefactFetcher, ArtifactBytes, FetchError};
use crate::artefact::locator::ArtifactReference;
use crate::artefact::release_tag::ReleaseTag;
use crate::artefact::sha256_digest::Sha256Digest;
use crate::error::Result;
use crate::manifest::RenderedManifest;
use crate::template::placeholder::PlaceholderSet;
use crate::template::{ManifestTemplate, render};

/// Computes the lowercase hex SHA-256 of `bytes` independently of the
/// checksum engine.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Renders the bundled template for `tag` and `sha256`.
///
/// # Errors
///
/// Returns an error if `tag` or `sha256` is invalid or the bundled template
/// fails to render.
pub fn bundled_formula(tag: &str, sha256: &str) -> Result<RenderedManifest> {
    let release = ReleaseTag::try_from(tag)?;
    let digest = Sha256Digest::try_from(sha256)?;
    let manifest = render(
        &ManifestTemplate::bundled(),
        &PlaceholderSet::for_release(&release, &digest),
    )?;
    Ok(manifest)
}

/// A canned response served by [`StubFetcher`].
#[derive(Debug, Clone)]
pub enum StubResponse {
    /// Serve these bytes.
    Bytes(Vec<u8>),
    /// Fail with HTTP 404.
    NotFound,
    /// Fail as if the host could not be reached.
    Unreachable(String),
}

/// A stub implementation of [`ArtefactFetcher`] for testing.
///
/// Responses are keyed by URL; any other URL is reported as not found.
/// Every requested URL is recorded, so tests can assert on fetch order and
/// count.
#[derive(Debug, Default)]
pub struct StubFetcher {
    responses: HashMap<String, StubResponse>,
    requested: Mutex<Vec<String>>,
}

impl StubFetcher {
    /// Creates a fetcher with no canned responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `response` for `url`.
    pub fn with(mut self, url: impl Into<String>, response: StubResponse) -> Self {
        self.responses.insert(url.into(), response);
        self
    }

    /// Returns every URL requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.request_log().clone()
    }

    /// A panicking test thread leaves the log intact, so poisoning is
    /// ignored.
    fn request_log(&self) -> MutexGuard<'_, Vec<String>> {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ArtefactFetcher for StubFetcher {
    fn fetch(&self, reference: &ArtifactReference) -> std::result::Result<ArtifactBytes, FetchError> {
        let url = reference.url().to_owned();
        self.request_log().push(url.clone());
        match self.responses.get(&url) {
            Some(StubResponse::Bytes(bytes)) => Ok(ArtifactBytes::from(bytes.clone())),
            Some(StubResponse::Unreachable(reason)) => Err(FetchError::Unreachable {
                url,
                reason: reason.clone(),
            }),
            Some(StubResponse::NotFound) | None => Err(FetchError::NotFound { url }),
        }
    }
}
