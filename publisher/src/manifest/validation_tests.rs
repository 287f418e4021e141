//! Unit tests for manifest validation.

use super::*;
use crate::template::placeholder::{Placeholder, PlaceholderSet};
use crate::template::{ManifestTemplate, render};
use rstest::{fixture, rstest};

const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
const FETCHED_URL: &str = concat!(
    "https://github.com/netlify/netlify-credential-helper/releases/download/",
    "v1.0.0/git-credential-netlify-darwin-amd64.tar.gz"
);

fn release() -> ReleaseTag {
    ReleaseTag::try_from("1.0.0").expect("valid tag")
}

fn computed() -> Sha256Digest {
    Sha256Digest::try_from(HELLO_SHA256).expect("valid digest")
}

fn render_bundled(tag: &str, digest: &str) -> RenderedManifest {
    let values = PlaceholderSet::new()
        .with(Placeholder::Tag, tag)
        .with(Placeholder::Sha256, digest);
    render(&ManifestTemplate::bundled(), &values).expect("render bundled template")
}

fn replace(manifest: &RenderedManifest, from: &str, to: &str) -> RenderedManifest {
    RenderedManifest::new(manifest.as_str().replace(from, to))
}

#[fixture]
fn validator() -> ManifestValidator {
    ManifestValidator::new(Expectation::new(release(), computed()).with_fetched_url(FETCHED_URL))
}

#[fixture]
fn manifest() -> RenderedManifest {
    render_bundled("1.0.0", HELLO_SHA256)
}

#[rstest]
fn rendered_bundled_manifest_is_valid(validator: ManifestValidator, manifest: RenderedManifest) {
    let result = validator.validate(&manifest);
    assert!(result.is_ok(), "{result}");
    assert!(result.errors().is_empty());
}

#[rstest]
#[case::semver("1.2.3")]
#[case::prefixed("v1.2.3")]
#[case::prerelease("2.0.0-rc.1")]
fn any_valid_release_round_trips(#[case] tag: &str) {
    let release = ReleaseTag::try_from(tag).expect("valid tag");
    let validator = ManifestValidator::new(Expectation::new(release, computed()));
    let result = validator.validate(&render_bundled(tag, HELLO_SHA256));
    assert!(result.is_ok(), "{result}");
}

#[rstest]
fn single_character_digest_change_is_a_mismatch(validator: ManifestValidator) {
    let mut tampered = HELLO_SHA256.to_owned();
    tampered.replace_range(..1, "3");
    let result = validator.validate(&render_bundled("1.0.0", &tampered));
    assert_eq!(
        result.errors(),
        [ValidationError::DigestMismatch {
            declared: tampered.clone(),
            computed: HELLO_SHA256.to_owned(),
        }]
    );
}

#[rstest]
fn uppercase_manifest_digest_still_matches(validator: ManifestValidator) {
    let result = validator.validate(&render_bundled("1.0.0", &HELLO_SHA256.to_uppercase()));
    assert!(result.is_ok(), "{result}");
}

#[rstest]
#[case::short("abc123".to_owned(), 6)]
#[case::long("a".repeat(65), 65)]
fn wrong_length_digest_is_reported(
    validator: ManifestValidator,
    #[case] digest: String,
    #[case] actual: usize,
) {
    let result = validator.validate(&render_bundled("1.0.0", &digest));
    assert_eq!(
        result.errors(),
        [ValidationError::WrongDigestLength {
            expected: 64,
            actual,
        }]
    );
}

#[rstest]
fn non_hex_digest_is_malformed(validator: ManifestValidator) {
    let digest = "z".repeat(64);
    let result = validator.validate(&render_bundled("1.0.0", &digest));
    assert!(matches!(
        result.errors(),
        [ValidationError::MalformedDigest { .. }]
    ));
}

#[rstest]
fn declared_digest_of_zeros_is_a_mismatch(manifest: RenderedManifest) {
    let zeros = Sha256Digest::try_from("0".repeat(64)).expect("valid digest");
    let validator = ManifestValidator::new(
        Expectation::new(release(), computed()).with_declared_digest(Some(zeros)),
    );
    let result = validator.validate(&manifest);
    assert_eq!(
        result.errors(),
        [ValidationError::DigestMismatch {
            declared: "0".repeat(64),
            computed: HELLO_SHA256.to_owned(),
        }]
    );
}

#[rstest]
fn other_release_in_manifest_is_reported(validator: ManifestValidator) {
    let result = validator.validate(&render_bundled("0.9.0", HELLO_SHA256));
    let fields: Vec<_> = result
        .errors()
        .iter()
        .filter_map(|error| match error {
            ValidationError::ReleaseMismatch { field, .. } => Some(field.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(fields, ["url", "version"]);
    assert!(
        result
            .errors()
            .iter()
            .any(|e| matches!(e, ValidationError::ArtifactUrlMismatch { .. }))
    );
}

#[rstest]
fn url_not_matching_fetched_artefact_is_reported(
    validator: ManifestValidator,
    manifest: RenderedManifest,
) {
    let moved = replace(&manifest, "darwin-amd64", "darwin-arm64");
    let result = validator.validate(&moved);
    assert!(matches!(
        result.errors(),
        [ValidationError::ArtifactUrlMismatch { .. }]
    ));
}

#[rstest]
fn hand_written_single_quoted_desc_is_accepted(
    validator: ManifestValidator,
    manifest: RenderedManifest,
) {
    let edited = replace(
        &manifest,
        "desc \"Git Credential Helper using Netlify's API for authentication\"",
        "desc 'Git credential helper #1'",
    );
    assert!(edited.as_str().contains("desc 'Git credential helper #1'"));
    let result = validator.validate(&edited);
    assert!(result.is_ok(), "{result}");
}

#[rstest]
fn fragment_in_download_url_is_malformed(manifest: RenderedManifest) {
    let validator = ManifestValidator::new(Expectation::new(release(), computed()));
    let cut = replace(&manifest, "v1.0.0/", "v1.0.0#x/");
    let result = validator.validate(&cut);
    assert!(
        matches!(
            result.errors(),
            [ValidationError::MalformedUrl { field, .. }] if field == "url"
        ),
        "{result}"
    );
}

#[rstest]
fn release_only_in_query_string_is_a_mismatch(manifest: RenderedManifest) {
    let validator = ManifestValidator::new(Expectation::new(release(), computed()));
    let moved = replace(
        &manifest,
        "download/v1.0.0/git-credential-netlify-darwin-amd64.tar.gz",
        "download/latest/git-credential-netlify-darwin-amd64.tar.gz?v=1.0.0",
    );
    let result = validator.validate(&moved);
    assert!(
        matches!(
            result.errors(),
            [ValidationError::ReleaseMismatch { field, .. }] if field == "url"
        ),
        "{result}"
    );
}

#[rstest]
#[case::homepage_no_scheme(
    "https://github.com/netlify/netlify-credential-helper\"",
    "github.com/netlify\"",
    "homepage"
)]
#[case::homepage_ftp(
    "https://github.com/netlify/netlify-credential-helper\"",
    "ftp://github.com/netlify\"",
    "homepage"
)]
#[case::url_whitespace("https://github.com/netlify/netlify-credential-helper/releases", "https://github.com/netlify/netlify credential/releases", "url")]
fn malformed_urls_are_reported(
    manifest: RenderedManifest,
    #[case] from: &str,
    #[case] to: &str,
    #[case] field: &str,
) {
    let validator = ManifestValidator::new(Expectation::new(release(), computed()));
    let result = validator.validate(&replace(&manifest, from, to));
    assert!(
        result.errors().iter().any(|error| matches!(
            error,
            ValidationError::MalformedUrl { field: f, .. } if f == field
        )),
        "{result}"
    );
}

#[test]
fn empty_manifest_reports_every_missing_field() {
    let validator = ManifestValidator::new(Expectation::new(release(), computed()));
    let result = validator.validate(&RenderedManifest::new(""));
    let fields: Vec<_> = result
        .errors()
        .iter()
        .map(|error| match error {
            ValidationError::MissingField { field } => field.as_str(),
            other => panic!("unexpected error {other:?}"),
        })
        .collect();
    assert_eq!(
        fields,
        [
            "class", "desc", "homepage", "url", "version", "sha256", "install", "test"
        ]
    );
}

#[rstest]
fn empty_description_is_missing(validator: ManifestValidator, manifest: RenderedManifest) {
    let blank = replace(
        &manifest,
        "\"Git Credential Helper using Netlify's API for authentication\"",
        "\"\"",
    );
    let result = validator.validate(&blank);
    assert_eq!(
        result.errors(),
        [ValidationError::MissingField {
            field: "desc".to_owned(),
        }]
    );
}

#[rstest]
fn test_invoking_other_binary_is_inconsistent(
    validator: ManifestValidator,
    manifest: RenderedManifest,
) {
    let renamed = replace(
        &manifest,
        "#{bin}/git-credential-netlify\"",
        "#{bin}/git-credential-other\"",
    );
    let result = validator.validate(&renamed);
    assert!(matches!(
        result.errors(),
        [ValidationError::InconsistentTest { .. }]
    ));
}

#[rstest]
fn test_without_argument_is_reported(validator: ManifestValidator, manifest: RenderedManifest) {
    let bare = replace(&manifest, ", \"version\"", "");
    let result = validator.validate(&bare);
    assert_eq!(
        result.errors(),
        [ValidationError::MissingField {
            field: "test argument".to_owned(),
        }]
    );
}

#[rstest]
fn repeated_version_stanza_is_duplicate(validator: ManifestValidator, manifest: RenderedManifest) {
    let doubled = replace(&manifest, "  version \"1.0.0\"\n", "  version \"1.0.0\"\n  version \"1.0.0\"\n");
    let result = validator.validate(&doubled);
    assert_eq!(
        result.errors(),
        [ValidationError::DuplicateField {
            field: "version".to_owned(),
            line: 6,
        }]
    );
}

#[test]
fn errors_serialise_with_snake_case_kind() {
    let error = ValidationError::DigestMismatch {
        declared: "0".repeat(64),
        computed: HELLO_SHA256.to_owned(),
    };
    let json = serde_json::to_value(&error).expect("serialise");
    assert_eq!(json["kind"], "digest_mismatch");
    assert_eq!(json["computed"], HELLO_SHA256);
}

#[test]
fn result_display_lists_each_error() {
    let result = ValidationResult::from_errors(vec![
        ValidationError::MissingField {
            field: "desc".to_owned(),
        },
        ValidationError::WrongDigestLength {
            expected: 64,
            actual: 3,
        },
    ]);
    assert!(!result.is_ok());
    assert_eq!(
        result.to_string(),
        "2 validation error(s)\n  - missing required field: desc\n  - digest has 3 characters; expected 64"
    );
}
