//! Publisher configuration loaded from `formula-publisher.toml`.
//!
//! Every setting has a default, so the file is optional. When no path is
//! given explicitly the loader looks for [`DEFAULT_CONFIG_FILE`] in the
//! working directory and silently falls back to the defaults when it is
//! absent. An explicitly named file must exist. Unknown keys are rejected so
//! that a typo cannot silently fall back to a default URL pattern.

use std::fs;
use std::io;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::artefact::download::DEFAULT_TIMEOUT;
use crate::artefact::locator::UrlPattern;
use crate::artefact::platform::PlatformTag;
use crate::checksum::HashAlgorithm;
use crate::gate::GateSettings;

/// File name searched for in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "formula-publisher.toml";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path of the file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid TOML or holds invalid values.
    #[error("invalid configuration in {path}: {reason}")]
    Parse {
        /// Path of the file.
        path: Utf8PathBuf,
        /// Parser message, including the offending key when known.
        reason: String,
    },

    /// `timeout_secs` was zero.
    #[error("timeout_secs in {path} must be greater than zero")]
    ZeroTimeout {
        /// Path of the file.
        path: Utf8PathBuf,
    },
}

/// Settings shared by every subcommand.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PublisherConfig {
    /// Download URL pattern with `{TAG}` and `{PLATFORM}` tokens.
    pub url_pattern: UrlPattern,
    /// Platform whose artefact the manifest points at.
    pub platform: PlatformTag,
    /// Digest algorithm declared by the manifest.
    pub hash_algorithm: HashAlgorithm,
    /// Global timeout for one artefact download, in seconds.
    #[serde(default = "PublisherConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl PublisherConfig {
    const fn default_timeout_secs() -> u64 {
        DEFAULT_TIMEOUT.as_secs()
    }

    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] when
    /// `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when an explicit file is missing or any
    /// file is unreadable, and [`ConfigError::Parse`] or
    /// [`ConfigError::ZeroTimeout`] when its contents are invalid.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |candidate| fs::read_to_string(candidate))
    }

    /// Load configuration using the supplied reader.
    ///
    /// The reader is called with the resolved path. A `NotFound` error for
    /// the default file yields the defaults; for an explicit path it is an
    /// error.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    /// use formula_publisher::config::PublisherConfig;
    ///
    /// let config = PublisherConfig::load_with(None, |_| {
    ///     Err(io::Error::from(io::ErrorKind::NotFound))
    /// })
    /// .expect("defaults apply");
    /// assert_eq!(config, PublisherConfig::default());
    /// ```
    pub fn load_with<F>(path: Option<&Utf8Path>, reader: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&Utf8Path) -> io::Result<String>,
    {
        let resolved = path.unwrap_or_else(|| Utf8Path::new(DEFAULT_CONFIG_FILE));
        let source = match reader(resolved) {
            Ok(source) => source,
            Err(err) if path.is_none() && err.kind() == io::ErrorKind::NotFound => {
                debug!("no {DEFAULT_CONFIG_FILE}; using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: resolved.to_owned(),
                    source,
                });
            }
        };
        debug!("loading configuration from {resolved}");
        Self::from_toml(resolved, &source)
    }

    /// Parse configuration text; `path` is used only in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, unknown keys, or
    /// invalid values, and [`ConfigError::ZeroTimeout`] for a zero timeout.
    pub fn from_toml(path: &Utf8Path, source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|err| ConfigError::Parse {
            path: path.to_owned(),
            reason: err.message().to_owned(),
        })?;
        if config.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout {
                path: path.to_owned(),
            });
        }
        Ok(config)
    }

    /// Return the download timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Return the settings the publication gate needs.
    #[must_use]
    pub fn gate_settings(&self) -> GateSettings {
        GateSettings {
            url_pattern: self.url_pattern.clone(),
            algorithm: self.hash_algorithm,
        }
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            url_pattern: UrlPattern::default(),
            platform: PlatformTag::default(),
            hash_algorithm: HashAlgorithm::default(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}
