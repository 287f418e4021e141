//! Unit tests for template rendering.

use super::*;
use rstest::{fixture, rstest};

const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

#[fixture]
fn release_values() -> PlaceholderSet {
    PlaceholderSet::new()
        .with(Placeholder::Tag, "1.0.0")
        .with(Placeholder::Sha256, HELLO_SHA256)
}

#[rstest]
fn bundled_template_renders_release_fields(release_values: PlaceholderSet) {
    let manifest = render(&ManifestTemplate::bundled(), &release_values).expect("render");
    let text = manifest.as_str();

    assert!(text.contains("version \"1.0.0\""), "{text}");
    assert!(text.contains(&format!("sha256 \"{HELLO_SHA256}\"")), "{text}");
    assert!(text.contains("/download/v1.0.0/"), "{text}");
    assert!(!text.contains("{TAG}") && !text.contains("{SHA256}"));
}

#[rstest]
fn ruby_interpolation_survives_rendering(release_values: PlaceholderSet) {
    let manifest = render(&ManifestTemplate::bundled(), &release_values).expect("render");
    assert!(
        manifest
            .as_str()
            .contains("system \"#{bin}/git-credential-netlify\", \"version\""),
        "{}",
        manifest.as_str()
    );
}

#[rstest]
#[case::tag(Placeholder::Tag)]
#[case::sha256(Placeholder::Sha256)]
fn missing_value_is_unresolved(mut release_values: PlaceholderSet, #[case] missing: Placeholder) {
    release_values.remove(missing);
    let err = render(&ManifestTemplate::bundled(), &release_values).expect_err("incomplete");
    assert_eq!(
        err,
        TemplateError::UnresolvedPlaceholder {
            name: missing.name().to_owned(),
        }
    );
}

#[rstest]
fn extra_value_is_unused(release_values: PlaceholderSet) {
    let template = ManifestTemplate::new("version \"{TAG}\"\n");
    let err = render(&template, &release_values).expect_err("extra value");
    assert_eq!(
        err,
        TemplateError::UnusedValue {
            name: "SHA256".to_owned(),
        }
    );
}

#[rstest]
fn unknown_placeholder_is_unresolved(release_values: PlaceholderSet) {
    let template = ManifestTemplate::new("{TAG} {SHA256} {HOMEPAGE}");
    let err = render(&template, &release_values).expect_err("unknown placeholder");
    assert_eq!(err.name(), "HOMEPAGE");
    assert!(matches!(err, TemplateError::UnresolvedPlaceholder { .. }));
}

#[test]
fn unresolved_is_reported_before_unused() {
    let template = ManifestTemplate::new("{SHA256}");
    let values = PlaceholderSet::new().with(Placeholder::Tag, "1.0.0");
    let err = render(&template, &values).expect_err("mismatched values");
    assert_eq!(
        err,
        TemplateError::UnresolvedPlaceholder {
            name: "SHA256".to_owned(),
        }
    );
}

#[test]
fn substituted_values_are_not_rescanned() {
    let template = ManifestTemplate::new("[{TAG}]");
    let values = PlaceholderSet::new().with(Placeholder::Tag, "{SHA256}");
    let manifest = render(&template, &values).expect("render");
    assert_eq!(manifest.as_str(), "[{SHA256}]");
}

#[rstest]
fn repeated_placeholders_all_substituted(release_values: PlaceholderSet) {
    let template = ManifestTemplate::new("{TAG}-{TAG} {SHA256}");
    assert_eq!(template.referenced(), ["TAG", "SHA256"]);
    let manifest = render(&template, &release_values).expect("render");
    assert_eq!(manifest.as_str(), format!("1.0.0-1.0.0 {HELLO_SHA256}"));
}

#[rstest]
fn rendering_is_idempotent(release_values: PlaceholderSet) {
    let template = ManifestTemplate::bundled();
    let first = render(&template, &release_values).expect("first render");
    let second = render(&template, &release_values).expect("second render");
    assert_eq!(first, second);
}

#[test]
fn template_without_placeholders_needs_no_values() {
    let template = ManifestTemplate::new("class Empty < Formula\nend\n");
    assert!(template.referenced().is_empty());
    let manifest = render(&template, &PlaceholderSet::new()).expect("render");
    assert_eq!(manifest.as_str(), template.text());
}
