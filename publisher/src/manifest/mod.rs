//! Rendered manifests and their validation.
//!
//! # Sub-modules
//!
//! - [`parser`] - Line-oriented formula parsing into [`parser::FormulaFields`].
//! - [`validation`] - Field checks accumulated into a [`validation::ValidationResult`].

pub mod parser;
pub mod validation;

use std::fmt;

/// A manifest template with every placeholder substituted.
///
/// Instances are never mutated; rendering again produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedManifest(String);

impl RenderedManifest {
    /// Wrap already rendered text, such as a formula read back from disk.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Return the manifest text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RenderedManifest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderedManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
