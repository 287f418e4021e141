//! Formula publisher library.
//!
//! This crate renders and verifies Homebrew formulae for prebuilt binary
//! releases. A release tag and the bytes of the released artefact go in; a
//! formula whose `sha256` stanza matches those bytes comes out. It is used
//! by the `formula-publisher` CLI binary and can be consumed
//! programmatically for testing or custom release workflows.
//!
//! # Modules
//!
//! - [`artefact`] - Release identity, URL resolution, and fetching
//! - [`checksum`] - Digest computation and comparison
//! - [`cli`] - Command-line argument definitions
//! - [`commands`] - Subcommand implementations
//! - [`config`] - Optional TOML configuration
//! - [`error`] - CLI-level error type
//! - [`gate`] - The publication gate tying the pipeline together
//! - [`manifest`] - Rendered formulae, parsing, and validation
//! - [`output`] - Progress lines and reports
//! - [`template`] - Template scanning and rendering

pub mod artefact;
pub mod checksum;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod gate;
pub mod manifest;
pub mod output;
pub mod template;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
