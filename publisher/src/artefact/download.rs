//! Artefact retrieval for release assets.
//!
//! Provides a trait-based abstraction over fetching the bytes behind an
//! [`ArtifactReference`], with an HTTP implementation for published
//! releases. Fetching is single-shot: there are no retries at this layer,
//! and every request is bounded by the agent's global timeout.

use super::locator::ArtifactReference;
use log::debug;
use std::io::{self, Read};
use std::time::Duration;

/// Network timeout applied when no other value is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw bytes of one downloaded artefact.
///
/// Owned by a single verification pass and consumed by the checksum engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactBytes(Vec<u8>);

impl ArtifactBytes {
    /// Return the bytes as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Return the number of bytes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return whether the artefact is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for ArtifactBytes {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

/// Trait for fetching artefact bytes.
///
/// Abstractions allow tests to stub retrieval without network access.
///
/// # Examples
///
/// ```
/// use formula_publisher::artefact::download::{ArtefactFetcher, HttpFetcher};
///
/// let fetcher = HttpFetcher::default();
/// // Use fetcher.fetch(&reference) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactFetcher {
    /// Fetch the bytes behind `reference`.
    ///
    /// # Errors
    ///
    /// Returns an error if the artefact cannot be reached, does not exist,
    /// the transfer fails, or the request times out.
    fn fetch(&self, reference: &ArtifactReference) -> Result<ArtifactBytes, FetchError>;
}

/// Errors arising from artefact retrieval.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The host could not be resolved or connected to.
    #[error("artefact host unreachable for {url}: {reason}")]
    Unreachable {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested artefact does not exist (HTTP 404 or missing file).
    #[error("artefact not found: {url}")]
    NotFound {
        /// The URL that was requested.
        url: String,
    },

    /// The request reached the host but failed in transit or with an error
    /// status.
    #[error("download failed for {url}: {reason}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("download timed out after {timeout:?}: {url}")]
    Timeout {
        /// The URL that was requested.
        url: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },
}

impl FetchError {
    /// Return the URL the failed fetch was for.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Unreachable { url, .. }
            | Self::NotFound { url }
            | Self::Transport { url, .. }
            | Self::Timeout { url, .. } => url,
        }
    }
}

/// HTTP-based fetcher using `ureq`.
#[derive(Debug)]
pub struct HttpFetcher {
    agent: ureq::Agent,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher whose requests are bounded by `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            timeout,
        }
    }

    /// Return the timeout applied to each request.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl ArtefactFetcher for HttpFetcher {
    fn fetch(&self, reference: &ArtifactReference) -> Result<ArtifactBytes, FetchError> {
        let url = reference.url();
        debug!("fetching {url}");
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, self.timeout, &e))?;

        let mut bytes = Vec::new();
        response
            .into_body()
            .as_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| map_io_error(url, self.timeout, &e))?;
        debug!("fetched {} bytes from {url}", bytes.len());
        Ok(ArtifactBytes(bytes))
    }
}

/// Map a ureq error to a [`FetchError`].
fn map_ureq_error(url: &str, timeout: Duration, err: &ureq::Error) -> FetchError {
    match err {
        ureq::Error::StatusCode(404) => FetchError::NotFound {
            url: url.to_owned(),
        },
        ureq::Error::Timeout(_) => FetchError::Timeout {
            url: url.to_owned(),
            timeout,
        },
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => FetchError::Unreachable {
            url: url.to_owned(),
            reason: err.to_string(),
        },
        ureq::Error::Io(io_err) => map_io_error(url, timeout, io_err),
        other => FetchError::Transport {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

/// Map an I/O failure during connect or body transfer to a [`FetchError`].
fn map_io_error(url: &str, timeout: Duration, err: &io::Error) -> FetchError {
    match err.kind() {
        io::ErrorKind::TimedOut => FetchError::Timeout {
            url: url.to_owned(),
            timeout,
        },
        io::ErrorKind::ConnectionRefused | io::ErrorKind::HostUnreachable => {
            FetchError::Unreachable {
                url: url.to_owned(),
                reason: err.to_string(),
            }
        }
        _ => FetchError::Transport {
            url: url.to_owned(),
            reason: err.to_string(),
        },
    }
}
