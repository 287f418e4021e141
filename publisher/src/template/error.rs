//! Errors raised while rendering a manifest template.

use thiserror::Error;

/// A mismatch between the placeholders a template references and the
/// values supplied for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template references a placeholder with no supplied value.
    #[error("template placeholder {{{name}}} has no value")]
    UnresolvedPlaceholder {
        /// The placeholder name, without braces.
        name: String,
    },

    /// A value was supplied for a placeholder the template never references.
    #[error("value supplied for {{{name}}} but the template does not reference it")]
    UnusedValue {
        /// The placeholder name, without braces.
        name: String,
    },
}

impl TemplateError {
    /// Return the placeholder name the error concerns.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::UnresolvedPlaceholder { name } | Self::UnusedValue { name } => name,
        }
    }
}
