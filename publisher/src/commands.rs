//! Subcommand implementations behind the `formula-publisher` binary.
//!
//! Each command takes its output streams as `&mut dyn Write` so that tests
//! can capture them. Progress goes to `stderr` unless `--quiet` is set;
//! manifests, digests, and JSON reports go to `stdout` or the requested
//! output file. Nothing is written to an output file unless every check
//! passed.

use std::fs;
use std::io::{self, Write};

use camino::Utf8Path;
use log::debug;

use crate::artefact::directory::DirectoryFetcher;
use crate::artefact::download::{ArtefactFetcher, HttpFetcher};
use crate::cli::{Cli, Command, DigestArgs, PublishArgs, RenderArgs, VerifyArgs};
use crate::config::PublisherConfig;
use crate::error::{PublisherError, Result};
use crate::gate::{PublicationError, PublishRequest, publish_with, verify_manifest};
use crate::manifest::RenderedManifest;
use crate::manifest::validation::{Expectation, ManifestValidator};
use crate::output::{VerifyReport, success_message, write_stderr_line};
use crate::template::placeholder::PlaceholderSet;
use crate::template::{ManifestTemplate, render};

/// Run the command selected on the command line.
///
/// # Errors
///
/// Returns the first failure of the selected command. Validation failures
/// carry every defect found.
pub fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    let config = PublisherConfig::load(cli.config.as_deref())?;
    let mut sink = io::sink();
    let progress: &mut dyn Write = if cli.quiet { &mut sink } else { stderr };

    match &cli.command {
        Command::Render(args) => render_command(&config, args, stdout, progress),
        Command::Publish(args) => publish_command(&config, args, stdout, progress),
        Command::Verify(args) => verify_command(&config, args, stdout, progress),
        Command::Digest(args) => digest_command(&config, args, stdout),
    }
}

/// Render from a known digest and check the result structurally.
fn render_command(
    config: &PublisherConfig,
    args: &RenderArgs,
    stdout: &mut dyn Write,
    progress: &mut dyn Write,
) -> Result<()> {
    let template = load_template(args.template.as_deref())?;
    let values = PlaceholderSet::for_release(&args.tag, &args.sha256);
    let manifest = render(&template, &values)?;

    let expectation = Expectation::new(args.tag.clone(), args.sha256.clone())
        .with_algorithm(config.hash_algorithm);
    let result = ManifestValidator::new(expectation).validate(&manifest);
    if !result.is_ok() {
        return Err(PublicationError::Validation(result.into_errors()).into());
    }

    write_manifest(&manifest, args.output.as_deref(), stdout)?;
    write_stderr_line(
        progress,
        success_message(&args.tag, args.output.as_deref()),
    );
    Ok(())
}

fn publish_command(
    config: &PublisherConfig,
    args: &PublishArgs,
    stdout: &mut dyn Write,
    progress: &mut dyn Write,
) -> Result<()> {
    let template = load_template(args.template.as_deref())?;
    let platform = args.platform.as_ref().unwrap_or(&config.platform);
    let request = PublishRequest {
        release: &args.tag,
        platform,
        declared_digest: args.expected_sha256.as_ref(),
    };
    let fetcher = fetcher_for(config, args.artifact_dir.as_deref());

    let manifest = publish_with(
        &config.gate_settings(),
        &request,
        &template,
        fetcher.as_ref(),
        progress,
    )?;

    write_manifest(&manifest, args.output.as_deref(), stdout)?;
    write_stderr_line(
        progress,
        success_message(&args.tag, args.output.as_deref()),
    );
    Ok(())
}

fn verify_command(
    config: &PublisherConfig,
    args: &VerifyArgs,
    stdout: &mut dyn Write,
    progress: &mut dyn Write,
) -> Result<()> {
    let text = read_file(&args.manifest)?;
    let manifest = RenderedManifest::new(text);
    let platform = args.platform.as_ref().unwrap_or(&config.platform);
    let fetcher = fetcher_for(config, args.artifact_dir.as_deref());

    let outcome = verify_manifest(
        &config.gate_settings(),
        &manifest,
        &args.tag,
        platform,
        fetcher.as_ref(),
        progress,
    );

    if args.json {
        let report = match &outcome {
            Ok(computed) => VerifyReport {
                ok: true,
                manifest: &args.manifest,
                computed: Some(computed.to_string()),
                errors: &[],
                failure: None,
            },
            Err(err) => VerifyReport {
                ok: false,
                manifest: &args.manifest,
                computed: None,
                errors: err.validation_errors(),
                failure: match err {
                    PublicationError::Validation(_) => None,
                    PublicationError::Fetch(_) | PublicationError::Template(_) => {
                        Some(err.to_string())
                    }
                },
            },
        };
        let json = report.to_json().map_err(|err| PublisherError::Write {
            destination: "stdout".to_owned(),
            source: io::Error::from(err),
        })?;
        write_stdout(stdout, format_args!("{json}\n"))?;
    }

    outcome?;
    Ok(())
}

fn digest_command(config: &PublisherConfig, args: &DigestArgs, stdout: &mut dyn Write) -> Result<()> {
    let digest = config
        .hash_algorithm
        .digest_file(args.file.as_std_path())
        .map_err(|source| PublisherError::ReadFile {
            path: args.file.clone(),
            source,
        })?;
    write_stdout(stdout, format_args!("{digest}  {}\n", args.file))
}

/// Choose the directory fetcher when an artefact directory is given.
fn fetcher_for(
    config: &PublisherConfig,
    artifact_dir: Option<&Utf8Path>,
) -> Box<dyn ArtefactFetcher> {
    match artifact_dir {
        Some(dir) => {
            debug!("serving artefacts from {dir}");
            Box::new(DirectoryFetcher::new(dir))
        }
        None => Box::new(HttpFetcher::new(config.timeout())),
    }
}

fn load_template(path: Option<&Utf8Path>) -> Result<ManifestTemplate> {
    match path {
        Some(path) => Ok(ManifestTemplate::new(read_file(path)?)),
        None => Ok(ManifestTemplate::bundled()),
    }
}

fn read_file(path: &Utf8Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| PublisherError::ReadFile {
        path: path.to_owned(),
        source,
    })
}

fn write_manifest(
    manifest: &RenderedManifest,
    output: Option<&Utf8Path>,
    stdout: &mut dyn Write,
) -> Result<()> {
    match output {
        Some(path) => fs::write(path, manifest.as_str()).map_err(|source| {
            PublisherError::Write {
                destination: path.to_string(),
                source,
            }
        }),
        None => write_stdout(stdout, format_args!("{manifest}")),
    }
}

fn write_stdout(stdout: &mut dyn Write, content: std::fmt::Arguments<'_>) -> Result<()> {
    stdout
        .write_fmt(content)
        .and_then(|()| stdout.flush())
        .map_err(|source| PublisherError::Write {
            destination: "stdout".to_owned(),
            source,
        })
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
