//! Error types for the formula publisher CLI.
//!
//! [`PublisherError`] wraps the failures of each pipeline stage together with
//! the file-handling errors the CLI adds around them. Validation failures
//! keep their full error list so the binary can print one line per defect.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::artefact::error::ArtefactError;
use crate::config::ConfigError;
use crate::gate::PublicationError;
use crate::manifest::validation::ValidationError;

/// Errors that can occur while running a publisher command.
#[derive(Debug, Error)]
pub enum PublisherError {
    /// A release tag, platform, digest, or URL pattern was invalid.
    #[error(transparent)]
    Artefact(#[from] ArtefactError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The publication gate rejected the release.
    #[error(transparent)]
    Publication(#[from] PublicationError),

    /// A file given on the command line could not be read.
    #[error("failed to read {path}: {source}")]
    ReadFile {
        /// Path of the file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest could not be written to its destination.
    #[error("failed to write {destination}: {source}")]
    Write {
        /// Output path, or `stdout`.
        destination: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl PublisherError {
    /// Return the validation errors carried by this failure, if any.
    #[must_use]
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Publication(err) => err.validation_errors(),
            Self::Artefact(_) | Self::Config(_) | Self::ReadFile { .. } | Self::Write { .. } => {
                &[]
            }
        }
    }
}

impl From<crate::template::error::TemplateError> for PublisherError {
    fn from(err: crate::template::error::TemplateError) -> Self {
        Self::Publication(PublicationError::Template(err))
    }
}

/// Result type alias using [`PublisherError`].
pub type Result<T> = std::result::Result<T, PublisherError>;
