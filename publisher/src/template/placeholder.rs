//! The closed set of template placeholders and their substitution values.

use crate::artefact::release_tag::ReleaseTag;
use crate::artefact::sha256_digest::Sha256Digest;
use std::collections::BTreeMap;
use std::fmt;

/// A named field a manifest template may reference.
///
/// The set is closed: a template token outside it is never resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    /// The release tag, written `{TAG}`.
    Tag,
    /// The artefact SHA-256 digest, written `{SHA256}`.
    Sha256,
}

impl Placeholder {
    /// Every placeholder, in canonical order.
    pub const ALL: [Self; 2] = [Self::Tag, Self::Sha256];

    /// Return the token name written between the braces.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tag => "TAG",
            Self::Sha256 => "SHA256",
        }
    }

    /// Look up a placeholder by its token name.
    ///
    /// # Examples
    ///
    /// ```
    /// use formula_publisher::template::placeholder::Placeholder;
    ///
    /// assert_eq!(Placeholder::from_name("SHA256"), Some(Placeholder::Sha256));
    /// assert_eq!(Placeholder::from_name("sha256"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|placeholder| placeholder.name() == name)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.name())
    }
}

/// Substitution values keyed by placeholder.
///
/// # Examples
///
/// ```
/// use formula_publisher::template::placeholder::{Placeholder, PlaceholderSet};
///
/// let values = PlaceholderSet::new().with(Placeholder::Tag, "1.0.0");
/// assert_eq!(values.get(Placeholder::Tag), Some("1.0.0"));
/// assert_eq!(values.get(Placeholder::Sha256), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderSet {
    values: BTreeMap<Placeholder, String>,
}

impl PlaceholderSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the standard value set for one release.
    #[must_use]
    pub fn for_release(release: &ReleaseTag, digest: &Sha256Digest) -> Self {
        Self::new()
            .with(Placeholder::Tag, release.as_str())
            .with(Placeholder::Sha256, digest.as_str())
    }

    /// Return the set with `placeholder` bound to `value`.
    #[must_use]
    pub fn with(mut self, placeholder: Placeholder, value: impl Into<String>) -> Self {
        self.insert(placeholder, value);
        self
    }

    /// Bind `placeholder` to `value`, returning any previous value.
    pub fn insert(&mut self, placeholder: Placeholder, value: impl Into<String>) -> Option<String> {
        self.values.insert(placeholder, value.into())
    }

    /// Remove the binding for `placeholder`.
    pub fn remove(&mut self, placeholder: Placeholder) -> Option<String> {
        self.values.remove(&placeholder)
    }

    /// Return the value bound to `placeholder`.
    #[must_use]
    pub fn get(&self, placeholder: Placeholder) -> Option<&str> {
        self.values.get(&placeholder).map(String::as_str)
    }

    /// Iterate over the bound placeholders in canonical order.
    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.values.keys().copied()
    }
}
