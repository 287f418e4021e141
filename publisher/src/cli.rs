//! CLI argument definitions for the formula publisher.
//!
//! Release tags, platforms, and digests are validated while parsing, so the
//! command implementations only ever see well-formed values.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

use crate::artefact::error::ArtefactError;
use crate::artefact::platform::PlatformTag;
use crate::artefact::release_tag::ReleaseTag;
use crate::artefact::sha256_digest::Sha256Digest;

/// Render and verify Homebrew formulae for binary releases.
#[derive(Parser, Debug)]
#[command(name = "formula-publisher")]
#[command(version, about)]
#[command(long_about = concat!(
    "Render and verify Homebrew formulae for binary releases.\n\n",
    "The publisher downloads the release artefact, hashes the exact bytes, ",
    "renders the formula template with the release tag and fresh digest, and ",
    "validates the result before writing it. Nothing is written when any ",
    "check fails.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Publish a release over HTTPS:\n",
    "    $ formula-publisher publish --tag 1.0.0 --output Formula/git-credential-netlify.rb\n\n",
    "  Publish from locally built assets before uploading them:\n",
    "    $ formula-publisher publish --tag 1.0.0 --artifact-dir dist\n\n",
    "  Re-verify an existing formula:\n",
    "    $ formula-publisher verify --manifest Formula/git-credential-netlify.rb --tag 1.0.0\n",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file [default: formula-publisher.toml if present].
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render a formula from a known digest without downloading anything.
    Render(RenderArgs),

    /// Fetch, hash, render, and validate a release formula.
    Publish(PublishArgs),

    /// Re-verify an existing formula against its artefact.
    Verify(VerifyArgs),

    /// Print the digest of a local file.
    Digest(DigestArgs),
}

/// Arguments for the render command.
#[derive(Parser, Debug, Clone)]
pub struct RenderArgs {
    /// Release tag substituted for `{TAG}`.
    #[arg(long, value_name = "TAG", value_parser = parse_release_tag)]
    pub tag: ReleaseTag,

    /// Artefact digest substituted for `{SHA256}`.
    #[arg(long, value_name = "HEX", value_parser = parse_digest)]
    pub sha256: Sha256Digest,

    /// Template file [default: bundled Homebrew template].
    #[arg(long, value_name = "FILE")]
    pub template: Option<Utf8PathBuf>,

    /// Write the formula here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,
}

/// Arguments for the publish command.
#[derive(Parser, Debug, Clone)]
pub struct PublishArgs {
    /// Release tag to publish.
    #[arg(long, value_name = "TAG", value_parser = parse_release_tag)]
    pub tag: ReleaseTag,

    /// Platform of the artefact [default: from configuration].
    #[arg(long, value_name = "OS-ARCH", value_parser = parse_platform)]
    pub platform: Option<PlatformTag>,

    /// Template file [default: bundled Homebrew template].
    #[arg(long, value_name = "FILE")]
    pub template: Option<Utf8PathBuf>,

    /// Digest published alongside the release; publication fails when the
    /// artefact does not match it.
    #[arg(long = "expect-sha256", value_name = "HEX", value_parser = parse_digest)]
    pub expected_sha256: Option<Sha256Digest>,

    /// Read artefacts from this directory instead of downloading them.
    #[arg(long, value_name = "DIR")]
    pub artifact_dir: Option<Utf8PathBuf>,

    /// Write the formula here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,
}

/// Arguments for the verify command.
#[derive(Parser, Debug, Clone)]
pub struct VerifyArgs {
    /// Formula file to verify.
    #[arg(long, value_name = "FILE")]
    pub manifest: Utf8PathBuf,

    /// Release tag the formula must describe.
    #[arg(long, value_name = "TAG", value_parser = parse_release_tag)]
    pub tag: ReleaseTag,

    /// Platform of the artefact [default: from configuration].
    #[arg(long, value_name = "OS-ARCH", value_parser = parse_platform)]
    pub platform: Option<PlatformTag>,

    /// Read artefacts from this directory instead of downloading them.
    #[arg(long, value_name = "DIR")]
    pub artifact_dir: Option<Utf8PathBuf>,

    /// Print a JSON report on stdout.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the digest command.
#[derive(Parser, Debug, Clone)]
pub struct DigestArgs {
    /// File to hash.
    #[arg(long, value_name = "FILE")]
    pub file: Utf8PathBuf,
}

fn parse_release_tag(value: &str) -> Result<ReleaseTag, ArtefactError> {
    ReleaseTag::try_from(value)
}

fn parse_platform(value: &str) -> Result<PlatformTag, ArtefactError> {
    PlatformTag::try_from(value)
}

fn parse_digest(value: &str) -> Result<Sha256Digest, ArtefactError> {
    Sha256Digest::try_from(value)
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
