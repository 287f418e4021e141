//! Placeholder tokenisation.
//!
//! A placeholder is `{NAME}` where `NAME` starts with an uppercase ASCII
//! letter followed by uppercase letters, digits, or `_`. A brace preceded by
//! `#` opens Ruby string interpolation (`#{bin}`) and is kept as text, as is
//! any brace group that does not match the name grammar.

/// One piece of scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text copied through unchanged.
    Text(&'a str),
    /// The name inside a `{NAME}` placeholder, without braces.
    Placeholder(&'a str),
}

/// Iterator over the tokens of a template string.
#[derive(Debug, Clone)]
pub struct Scan<'a> {
    rest: &'a str,
    pending: Option<&'a str>,
}

/// Split `text` into literal runs and placeholders.
///
/// # Examples
///
/// ```
/// use formula_publisher::template::scan::{Token, scan};
///
/// let tokens: Vec<_> = scan("v{TAG} #{bin}").collect();
/// assert_eq!(
///     tokens,
///     vec![
///         Token::Text("v"),
///         Token::Placeholder("TAG"),
///         Token::Text(" #{bin}"),
///     ]
/// );
/// ```
#[must_use]
pub fn scan(text: &str) -> Scan<'_> {
    Scan {
        rest: text,
        pending: None,
    }
}

/// Return the names of every placeholder in `text`, in order of appearance.
pub fn placeholder_names(text: &str) -> impl Iterator<Item = &str> {
    scan(text).filter_map(|token| match token {
        Token::Placeholder(name) => Some(name),
        Token::Text(_) => None,
    })
}

impl<'a> Iterator for Scan<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(name) = self.pending.take() {
            return Some(Token::Placeholder(name));
        }
        if self.rest.is_empty() {
            return None;
        }

        let mut search_from = 0;
        while let Some(offset) = self.rest.get(search_from..).and_then(|s| s.find('{')) {
            let open = search_from + offset;
            if let Some(name) = placeholder_at(self.rest, open) {
                let text = self.rest.get(..open).unwrap_or_default();
                let close = open + name.len() + 2;
                self.rest = self.rest.get(close..).unwrap_or_default();
                if text.is_empty() {
                    return Some(Token::Placeholder(name));
                }
                self.pending = Some(name);
                return Some(Token::Text(text));
            }
            search_from = open + 1;
        }

        let text = self.rest;
        self.rest = "";
        Some(Token::Text(text))
    }
}

/// Return the placeholder name when a valid token opens at byte `open`.
fn placeholder_at(text: &str, open: usize) -> Option<&str> {
    let preceded_by_hash = open
        .checked_sub(1)
        .and_then(|hash| text.as_bytes().get(hash))
        .is_some_and(|byte| *byte == b'#');
    if preceded_by_hash {
        return None;
    }

    let after = text.get(open + 1..)?;
    let close = after.find('}')?;
    let name = after.get(..close)?;
    is_placeholder_name(name).then_some(name)
}

/// Whether `name` matches `[A-Z][A-Z0-9_]*`.
fn is_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
