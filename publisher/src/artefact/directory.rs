//! Offline artefact retrieval from a local release directory.
//!
//! Release pipelines usually build their assets before uploading them. A
//! [`DirectoryFetcher`] serves those files by the final path segment of the
//! artefact URL, so a manifest can be verified before the release is public.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

use super::download::{ArtefactFetcher, ArtifactBytes, FetchError};
use super::locator::ArtifactReference;

/// Fetcher resolving artefacts inside a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryFetcher {
    root: Utf8PathBuf,
}

impl DirectoryFetcher {
    /// Create a fetcher serving files from `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Return the directory artefacts are read from.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Return the local path standing in for `reference`, if its URL names
    /// a plain file.
    #[must_use]
    pub fn path_for(&self, reference: &ArtifactReference) -> Option<Utf8PathBuf> {
        match reference.file_name() {
            "" | "." | ".." => None,
            name => Some(self.root.join(name)),
        }
    }
}

impl ArtefactFetcher for DirectoryFetcher {
    fn fetch(&self, reference: &ArtifactReference) -> Result<ArtifactBytes, FetchError> {
        let url = reference.url();
        let path = self.path_for(reference).ok_or_else(|| FetchError::NotFound {
            url: url.to_owned(),
        })?;
        debug!("reading {url} from {path}");

        match fs::read(&path) {
            Ok(bytes) => Ok(ArtifactBytes::from(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(FetchError::NotFound {
                url: url.to_owned(),
            }),
            Err(err) => Err(FetchError::Transport {
                url: url.to_owned(),
                reason: format!("{path}: {err}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artefact::platform::PlatformTag;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    const ARCHIVE: &str = "git-credential-netlify-darwin-amd64.tar.gz";

    fn reference(url: &str) -> ArtifactReference {
        ArtifactReference::new(url, PlatformTag::default())
    }

    #[fixture]
    fn release_dir() -> (TempDir, DirectoryFetcher) {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join(ARCHIVE), b"hello").expect("write artefact");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 temp dir");
        (dir, DirectoryFetcher::new(root))
    }

    #[rstest]
    fn serves_file_named_by_url(release_dir: (TempDir, DirectoryFetcher)) {
        let (_dir, fetcher) = release_dir;
        let url = format!("https://example.test/download/v1.0.0/{ARCHIVE}");
        let bytes = fetcher.fetch(&reference(&url)).expect("artefact present");
        assert_eq!(bytes.as_slice(), b"hello");
    }

    #[rstest]
    fn query_string_is_ignored(release_dir: (TempDir, DirectoryFetcher)) {
        let (_dir, fetcher) = release_dir;
        let url = format!("https://example.test/{ARCHIVE}?raw=true");
        assert!(fetcher.fetch(&reference(&url)).is_ok());
    }

    #[rstest]
    #[case::absent("https://example.test/other.tar.gz")]
    #[case::trailing_slash("https://example.test/download/")]
    #[case::parent("https://example.test/..")]
    fn missing_files_are_not_found(
        release_dir: (TempDir, DirectoryFetcher),
        #[case] url: &str,
    ) {
        let (_dir, fetcher) = release_dir;
        let err = fetcher.fetch(&reference(url)).expect_err("no such file");
        assert!(matches!(err, FetchError::NotFound { .. }));
        assert_eq!(err.url(), url);
    }

    #[rstest]
    fn directories_are_transport_errors(release_dir: (TempDir, DirectoryFetcher)) {
        let (_dir, fetcher) = release_dir;
        fs::create_dir(fetcher.root().join("nested")).expect("create dir");
        let err = fetcher
            .fetch(&reference("https://example.test/nested"))
            .expect_err("directory is not an artefact");
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
