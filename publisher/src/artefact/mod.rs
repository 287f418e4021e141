//! Release artefact location, identity, and retrieval.
//!
//! # Sub-modules
//!
//! - [`directory`]: offline fetcher serving files from a release directory.
//! - [`download`]: fetcher trait and the HTTP implementation.
//! - [`error`]: validation errors for the newtypes below.
//! - [`locator`]: URL pattern and artefact references.
//! - [`platform`]: platform tag newtype (`PlatformTag`).
//! - [`release_tag`]: release identifier newtype (`ReleaseTag`).
//! - [`sha256_digest`]: SHA-256 digest newtype (`Sha256Digest`).

pub mod directory;
pub mod download;
pub mod error;
pub mod locator;
pub mod platform;
pub mod release_tag;
pub mod sha256_digest;
