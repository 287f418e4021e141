//! Output formatting for the publisher CLI.
//!
//! Progress lines and diagnostics go to stderr; manifests go to stdout or
//! the requested output file. The `verify --json` report is produced here so
//! its shape stays in one place.

use std::io::Write;

use camino::Utf8Path;
use serde::Serialize;

use crate::artefact::release_tag::ReleaseTag;
use crate::manifest::validation::ValidationError;

/// Write a progress or diagnostic line, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

/// Format one line per validation error, ready for stderr.
///
/// # Example
///
/// ```
/// use formula_publisher::manifest::validation::ValidationError;
/// use formula_publisher::output::validation_lines;
///
/// let lines = validation_lines(&[ValidationError::MissingField {
///     field: "desc".to_owned(),
/// }]);
/// assert_eq!(lines, ["error: missing required field: desc"]);
/// ```
#[must_use]
pub fn validation_lines(errors: &[ValidationError]) -> Vec<String> {
    errors.iter().map(|error| format!("error: {error}")).collect()
}

/// Format a success message after a manifest has been written.
#[must_use]
pub fn success_message(release: &ReleaseTag, destination: Option<&Utf8Path>) -> String {
    match destination {
        Some(path) => format!("Wrote verified manifest for {release} to {path}"),
        None => format!("Verified manifest for {release}"),
    }
}

/// Machine-readable result of `verify --json`.
#[derive(Debug, Serialize)]
pub struct VerifyReport<'a> {
    /// Whether the manifest passed every check.
    pub ok: bool,
    /// Path of the manifest that was checked.
    pub manifest: &'a Utf8Path,
    /// The digest computed from the fetched artefact, when fetching succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed: Option<String>,
    /// Every validation error found.
    pub errors: &'a [ValidationError],
    /// A non-validation failure such as a fetch error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl VerifyReport<'_> {
    /// Render the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
