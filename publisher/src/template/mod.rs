//! Manifest templates and placeholder rendering.
//!
//! A [`ManifestTemplate`] is scanned once when it is created, recording the
//! placeholders it references. [`render`] then checks that the supplied
//! [`PlaceholderSet`] covers exactly those placeholders before substituting
//! them in a single pass.
//!
//! # Sub-modules
//!
//! - [`error`] - Rendering errors (`TemplateError`).
//! - [`placeholder`] - The closed placeholder set and its values.
//! - [`scan`] - Placeholder tokenisation.

pub mod error;
pub mod placeholder;
pub mod scan;

use crate::manifest::RenderedManifest;
use error::TemplateError;
use log::debug;
use placeholder::{Placeholder, PlaceholderSet};
use scan::{Token, placeholder_names, scan};

/// The Homebrew formula template shipped with the publisher.
pub const BUNDLED_TEMPLATE: &str = include_str!("../../resources/homebrew-template.rb");

/// Immutable template text and the placeholder names it references.
///
/// # Examples
///
/// ```
/// use formula_publisher::template::ManifestTemplate;
///
/// let template = ManifestTemplate::bundled();
/// assert_eq!(template.referenced(), ["TAG", "SHA256"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestTemplate {
    text: String,
    referenced: Vec<String>,
}

impl ManifestTemplate {
    /// Scan `text` and build a template from it.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut referenced: Vec<String> = Vec::new();
        for name in placeholder_names(&text) {
            if !referenced.iter().any(|seen| seen == name) {
                referenced.push(name.to_owned());
            }
        }
        debug!("template references {referenced:?}");
        Self { text, referenced }
    }

    /// Return the bundled Homebrew formula template.
    #[must_use]
    pub fn bundled() -> Self {
        Self::new(BUNDLED_TEMPLATE)
    }

    /// Return the raw template text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Return the distinct placeholder names, in order of first appearance.
    #[must_use]
    pub fn referenced(&self) -> &[String] {
        &self.referenced
    }

    /// Return whether the template references `placeholder`.
    #[must_use]
    pub fn references(&self, placeholder: Placeholder) -> bool {
        self.referenced.iter().any(|name| name == placeholder.name())
    }
}

/// Substitute `values` into `template`.
///
/// Every referenced placeholder must have a value and every value must be
/// referenced. Substituted values are never rescanned, so a value that
/// itself looks like `{TAG}` is emitted verbatim.
///
/// # Errors
///
/// Returns [`TemplateError::UnresolvedPlaceholder`] for the first referenced
/// placeholder without a value, or [`TemplateError::UnusedValue`] for the
/// first supplied value the template does not reference.
///
/// # Examples
///
/// ```
/// use formula_publisher::template::{ManifestTemplate, render};
/// use formula_publisher::template::placeholder::{Placeholder, PlaceholderSet};
///
/// let template = ManifestTemplate::new("version \"{TAG}\"");
/// let values = PlaceholderSet::new().with(Placeholder::Tag, "1.0.0");
/// let manifest = render(&template, &values).expect("complete values");
/// assert_eq!(manifest.as_str(), "version \"1.0.0\"");
/// ```
pub fn render(
    template: &ManifestTemplate,
    values: &PlaceholderSet,
) -> Result<RenderedManifest, TemplateError> {
    check_completeness(template, values)?;

    let text: String = scan(template.text())
        .map(|token| match token {
            Token::Text(text) => text,
            Token::Placeholder(name) => Placeholder::from_name(name)
                .and_then(|placeholder| values.get(placeholder))
                .unwrap_or_default(),
        })
        .collect();
    Ok(RenderedManifest::new(text))
}

/// Ensure the referenced names and the supplied values match exactly.
fn check_completeness(
    template: &ManifestTemplate,
    values: &PlaceholderSet,
) -> Result<(), TemplateError> {
    let unresolved = template.referenced().iter().find(|name| {
        Placeholder::from_name(name).is_none_or(|placeholder| values.get(placeholder).is_none())
    });
    if let Some(name) = unresolved {
        return Err(TemplateError::UnresolvedPlaceholder { name: name.clone() });
    }

    if let Some(unused) = values
        .placeholders()
        .find(|placeholder| !template.references(*placeholder))
    {
        return Err(TemplateError::UnusedValue {
            name: unused.name().to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
